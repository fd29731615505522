use thiserror::Error;

use tenantgate_auth::AccessDecision;
use tenantgate_client::RequestError;
use tenantgate_session::TokenAcquisitionError;

/// Failure surfaced to a page as an inline error panel.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("could not obtain an access token: {0}")]
    Token(#[from] TokenAcquisitionError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("access denied: {}", .0.reasons.join(" | "))]
    Denied(AccessDecision),
}

impl PageError {
    /// Label for the manual retry action, `None` when retrying cannot help.
    pub fn retry_hint(&self) -> Option<&'static str> {
        match self {
            PageError::Token(err) if err.requires_login() => Some("Sign in again"),
            PageError::Request(RequestError::Unauthorized) => Some("Sign in again"),
            PageError::Request(RequestError::Forbidden) | PageError::Denied(_) => None,
            PageError::Token(TokenAcquisitionError::Cancelled) | PageError::Request(RequestError::Cancelled) => None,
            PageError::Token(_) | PageError::Request(_) => Some("Try Again"),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            PageError::Token(TokenAcquisitionError::Cancelled) | PageError::Request(RequestError::Cancelled)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenantgate_client::TransportError;

    #[test]
    fn retry_hints_follow_error_kind() {
        assert_eq!(
            PageError::from(TokenAcquisitionError::NotAuthenticated).retry_hint(),
            Some("Sign in again")
        );
        assert_eq!(PageError::from(RequestError::Unauthorized).retry_hint(), Some("Sign in again"));
        assert_eq!(PageError::from(RequestError::Forbidden).retry_hint(), None);
        assert_eq!(
            PageError::from(RequestError::Transport(TransportError::Timeout)).retry_hint(),
            Some("Try Again")
        );
        assert_eq!(PageError::from(RequestError::Cancelled).retry_hint(), None);
        assert!(PageError::from(TokenAcquisitionError::Cancelled).is_cancelled());
    }
}
