use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use url::Url;

use tenantgate_auth::ProtectedResource;
use tenantgate_session::AccessToken;

use crate::demo::{DataSource, FallbackMode, Fetched, demo_payload};
use crate::transport;
use crate::{ApiResponse, RequestError, RequestOptions, TenantInfo, UserAnalytics};

/// Backend paths, relative to the configured base URL.
pub mod endpoints {
    pub const PROTECTED_RESOURCES: &str = "/protected-resources";
    pub const TENANT_INFO: &str = "/tenant-info";
    pub const USER_ANALYTICS: &str = "/user-analytics";
}

/// Authenticated request gateway for the application backend.
///
/// Every call carries `Authorization: Bearer <token>` and a JSON content
/// type, is attempted once, and reports failures as [`RequestError`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    fallback: FallbackMode,
}

impl ApiClient {
    pub fn new(base_url: Url) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    pub fn with_http(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            fallback: FallbackMode::Disabled,
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackMode) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn fallback(&self) -> FallbackMode {
        self.fallback
    }

    /// Issue one request to `path` and decode the response envelope.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &AccessToken,
        options: RequestOptions,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse<T>, RequestError> {
        let url = transport::resolve(&self.base_url, path)?;
        let received = transport::send(&self.http, url, token, options, cancel).await?;

        ApiResponse::<Value>::from_slice(&received.body)?.decode()
    }

    /// `GET path`, substituting canned data on failure when the client is in
    /// [`FallbackMode::Demo`]. Cancellation is never masked.
    pub async fn fetch_or_demo<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &AccessToken,
        cancel: &CancellationToken,
    ) -> Result<Fetched<T>, RequestError> {
        match self.request::<T>(path, token, RequestOptions::get(), cancel).await {
            Ok(response) => Ok(Fetched {
                data: response.data,
                message: response.message,
                source: DataSource::Live,
            }),
            Err(RequestError::Cancelled) => Err(RequestError::Cancelled),
            Err(err) if self.fallback == FallbackMode::Demo => {
                tracing::warn!(path, error = %err, "serving demo data in place of failed request");
                let canned = demo_payload(path).decode::<T>()?;
                Ok(Fetched {
                    data: canned.data,
                    message: canned.message,
                    source: DataSource::Demo {
                        cause: err.to_string(),
                    },
                })
            }
            Err(err) => Err(err),
        }
    }

    pub async fn protected_resources(
        &self,
        token: &AccessToken,
        cancel: &CancellationToken,
    ) -> Result<Fetched<Vec<ProtectedResource>>, RequestError> {
        self.fetch_or_demo(endpoints::PROTECTED_RESOURCES, token, cancel).await
    }

    pub async fn tenant_info(
        &self,
        token: &AccessToken,
        cancel: &CancellationToken,
    ) -> Result<Fetched<TenantInfo>, RequestError> {
        self.fetch_or_demo(endpoints::TENANT_INFO, token, cancel).await
    }

    pub async fn user_analytics(
        &self,
        token: &AccessToken,
        cancel: &CancellationToken,
    ) -> Result<Fetched<UserAnalytics>, RequestError> {
        self.fetch_or_demo(endpoints::USER_ANALYTICS, token, cancel).await
    }
}
