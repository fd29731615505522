use thiserror::Error;

/// Failure establishing or manipulating session state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("identity provider error: {0}")]
    Provider(String),

    #[error("invalid id token: {0}")]
    InvalidIdToken(String),

    #[error("invalid provider settings: {0}")]
    Settings(String),
}

/// A token could not be obtained without user interaction (or at all).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenAcquisitionError {
    #[error("no authenticated principal")]
    NotAuthenticated,

    /// Silent refresh is impossible; the provider wants the user back
    /// (`login_required`, `consent_required`, ...).
    #[error("interaction required: {0}")]
    InteractionRequired(String),

    #[error("identity provider error: {0}")]
    Provider(String),

    #[error("token acquisition cancelled")]
    Cancelled,
}

impl TokenAcquisitionError {
    /// Whether restarting the login redirect can resolve the failure.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::NotAuthenticated | Self::InteractionRequired(_))
    }
}
