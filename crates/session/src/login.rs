//! Authorization-code + PKCE login redirect.
//!
//! The provider completes the flow on its side; this module only builds the
//! URLs the user agent is sent to.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};
use url::Url;

use crate::{ScopeSet, SessionError};

/// Static identity-provider settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    /// Provider domain (`tenant.eu.auth0.com`) or a full base URL.
    pub domain: String,
    pub client_id: String,
    pub audience: String,
    pub redirect_uri: Url,
    pub scope: ScopeSet,
}

impl ProviderSettings {
    /// `https://<domain>/`, or the domain itself when it already has a scheme.
    pub fn base_url(&self) -> Result<Url, SessionError> {
        let raw = if self.domain.starts_with("http://") || self.domain.starts_with("https://") {
            self.domain.clone()
        } else {
            format!("https://{}", self.domain)
        };
        Url::parse(&raw).map_err(|e| SessionError::Settings(format!("domain '{}': {e}", self.domain)))
    }

    fn endpoint(&self, path: &str) -> Result<Url, SessionError> {
        self.base_url()?
            .join(path)
            .map_err(|e| SessionError::Settings(e.to_string()))
    }
}

/// Where to send the user agent to start a login, plus the values the
/// callback handler must check (`state`) and redeem (`code_verifier`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    pub url: Url,
    pub state: String,
    pub code_verifier: String,
    pub return_target: String,
}

/// Build the `/authorize` redirect for a fresh login attempt.
pub fn begin_login(settings: &ProviderSettings, return_target: &str) -> Result<LoginRedirect, SessionError> {
    let code_verifier = random_token(32);
    let state = random_token(16);
    let challenge = code_challenge(&code_verifier);

    let mut url = settings.endpoint("authorize")?;
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", &settings.client_id)
        .append_pair("redirect_uri", settings.redirect_uri.as_str())
        .append_pair("audience", &settings.audience)
        .append_pair("scope", &settings.scope.to_string())
        .append_pair("state", &state)
        .append_pair("code_challenge", &challenge)
        .append_pair("code_challenge_method", "S256");

    tracing::info!(return_target, "login redirect prepared");

    Ok(LoginRedirect {
        url,
        state,
        code_verifier,
        return_target: return_target.to_string(),
    })
}

/// Provider logout endpoint that bounces back to `return_to`.
pub fn logout_url(settings: &ProviderSettings, return_to: &Url) -> Result<Url, SessionError> {
    let mut url = settings.endpoint("v2/logout")?;
    url.query_pairs_mut()
        .append_pair("client_id", &settings.client_id)
        .append_pair("returnTo", return_to.as_str());
    Ok(url)
}

/// S256 PKCE challenge: base64url(sha256(verifier)), unpadded.
pub fn code_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

fn random_token(len: usize) -> String {
    let mut buf = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}
