use async_trait::async_trait;

use tenantgate_auth::Principal;

use crate::{AccessToken, SessionError, TokenAcquisitionError, TokenRequest};

/// Client runtime of an external identity provider.
///
/// Implementations own the redirect protocol, token cache and refresh
/// tokens. The session only asks two questions: who is signed in, and can I
/// have a token for this audience/scope pair without bothering the user.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Establish or refresh session state (e.g. redeem a cached refresh token).
    ///
    /// `Ok(None)` means nobody is signed in.
    async fn restore_session(&self) -> Result<Option<Principal>, SessionError>;

    /// Obtain an access token silently.
    async fn get_token_silently(
        &self,
        request: &TokenRequest,
    ) -> Result<AccessToken, TokenAcquisitionError>;
}
