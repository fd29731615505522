//! Shared request pipeline for the backend and management clients.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tokio_util::sync::CancellationToken;
use url::Url;

use tenantgate_session::AccessToken;

use crate::{RequestError, RequestOptions, TransportError};

pub(crate) struct Received {
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Append `path` to `base`, keeping whatever path prefix `base` carries.
pub(crate) fn resolve(base: &Url, path: &str) -> Result<Url, RequestError> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| RequestError::InvalidRequest(format!("{path}: {e}")))
}

fn bearer(token: &AccessToken) -> Result<HeaderValue, RequestError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
        .map_err(|_| RequestError::InvalidRequest("access token is not a valid header value".into()))?;
    value.set_sensitive(true);
    Ok(value)
}

/// One attempt: no retry, no substitution.
pub(crate) async fn send(
    http: &reqwest::Client,
    url: Url,
    token: &AccessToken,
    options: RequestOptions,
    cancel: &CancellationToken,
) -> Result<Received, RequestError> {
    let RequestOptions {
        method,
        mut headers,
        body,
        timeout,
    } = options;

    headers.insert(AUTHORIZATION, bearer(token)?);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    tracing::debug!(method = %method, path = url.path(), "dispatching authenticated request");

    let mut builder = http.request(method, url.clone()).headers(headers);
    if let Some(body) = body {
        builder = builder.body(body.to_string());
    }
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(RequestError::Cancelled),
        result = builder.send() => result.map_err(TransportError::from)?,
    };

    let status = response.status();
    if let Err(err) = RequestError::check_status(status) {
        tracing::warn!(status = status.as_u16(), path = url.path(), "request rejected");
        return Err(err);
    }

    let headers = response.headers().clone();
    let body = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(RequestError::Cancelled),
        result = response.bytes() => result.map_err(TransportError::from)?,
    };

    Ok(Received {
        headers,
        body: body.to_vec(),
    })
}
