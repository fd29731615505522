use reqwest::StatusCode;
use thiserror::Error;

/// Failure below the HTTP semantics layer, or an unexpected status.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("unexpected status {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if let Some(status) = err.status() {
            TransportError::Status(status.as_u16())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

/// Outcome taxonomy of one gateway call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// 401: re-acquire a token; the caller may retry once.
    #[error("unauthorized - please log in again")]
    Unauthorized,

    /// 403: do not retry; show an access-denied state.
    #[error("forbidden - insufficient permissions")]
    Forbidden,

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// 2xx with a body that is not the expected envelope/payload.
    #[error("response could not be decoded: {0}")]
    Decode(String),

    /// 2xx envelope reporting `status: "error"`.
    #[error("api error: {0}")]
    Api(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request cancelled")]
    Cancelled,
}

impl RequestError {
    /// Map a response status; `Ok(())` for 2xx.
    pub fn check_status(status: StatusCode) -> Result<(), RequestError> {
        match status {
            s if s.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED => Err(RequestError::Unauthorized),
            StatusCode::FORBIDDEN => Err(RequestError::Forbidden),
            s => Err(RequestError::Transport(TransportError::Status(s.as_u16()))),
        }
    }

    /// A fresh token may fix this failure.
    pub fn should_reacquire_token(&self) -> bool {
        matches!(self, RequestError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(RequestError::check_status(StatusCode::OK), Ok(()));
        assert_eq!(RequestError::check_status(StatusCode::NO_CONTENT), Ok(()));
        assert_eq!(
            RequestError::check_status(StatusCode::UNAUTHORIZED),
            Err(RequestError::Unauthorized)
        );
        assert_eq!(
            RequestError::check_status(StatusCode::FORBIDDEN),
            Err(RequestError::Forbidden)
        );
        assert_eq!(
            RequestError::check_status(StatusCode::BAD_GATEWAY),
            Err(RequestError::Transport(TransportError::Status(502)))
        );
        assert_eq!(
            RequestError::check_status(StatusCode::NOT_FOUND),
            Err(RequestError::Transport(TransportError::Status(404)))
        );
    }

    #[test]
    fn only_unauthorized_suggests_new_token() {
        assert!(RequestError::Unauthorized.should_reacquire_token());
        assert!(!RequestError::Forbidden.should_reacquire_token());
        assert!(!RequestError::Transport(TransportError::Timeout).should_reacquire_token());
    }
}
