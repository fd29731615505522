use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use url::Url;

use tenantgate_auth::{ClaimExtractor, ClaimSet, Principal};

use crate::login::{self, LoginRedirect, ProviderSettings};
use crate::{AccessToken, IdentityProvider, SessionError, TokenAcquisitionError, TokenRequest};

/// Lifecycle state of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Establishing or refreshing; absence of a principal means "unknown".
    Loading,
    Authenticated,
    Anonymous,
    /// The provider could not establish state; treated as not signed in.
    Failed(String),
}

/// Immutable view of the session at one point in time.
///
/// Claims are derived once per principal and published together with it, so
/// readers never observe a principal paired with another principal's claims.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    status: SessionStatus,
    principal: Option<Arc<Principal>>,
    claims: ClaimSet,
}

impl SessionSnapshot {
    fn loading() -> Self {
        Self {
            status: SessionStatus::Loading,
            principal: None,
            claims: ClaimSet::anonymous(),
        }
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    pub fn principal(&self) -> Option<&Arc<Principal>> {
        self.principal.as_ref()
    }

    /// Claims for decision-making, `None` until the session is ready.
    pub fn ready_claims(&self) -> Option<&ClaimSet> {
        (!self.is_loading()).then_some(&self.claims)
    }
}

/// Owned, injectable identity session.
///
/// Created at application start in the `Loading` state, replaced wholesale
/// on (re-)authentication and cleared on logout.
pub struct IdentitySession {
    provider: Arc<dyn IdentityProvider>,
    settings: ProviderSettings,
    extractor: ClaimExtractor,
    state: watch::Sender<Arc<SessionSnapshot>>,
}

impl IdentitySession {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        settings: ProviderSettings,
        extractor: ClaimExtractor,
    ) -> Self {
        let (state, _) = watch::channel(Arc::new(SessionSnapshot::loading()));
        Self {
            provider,
            settings,
            extractor,
            state,
        }
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    /// Ask the provider for the current principal and publish the result.
    pub async fn establish(&self) -> Result<(), SessionError> {
        self.publish(Arc::new(SessionSnapshot::loading()));

        match self.provider.restore_session().await {
            Ok(principal) => {
                self.replace_principal(principal);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "session could not be established");
                self.publish(Arc::new(SessionSnapshot {
                    status: SessionStatus::Failed(err.to_string()),
                    principal: None,
                    claims: ClaimSet::anonymous(),
                }));
                Err(err)
            }
        }
    }

    /// Swap in a new principal (or none) as one value.
    pub fn replace_principal(&self, principal: Option<Principal>) {
        let claims = self.extractor.extract(principal.as_ref());
        let status = if principal.is_some() {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Anonymous
        };

        tracing::info!(
            authenticated = principal.is_some(),
            tenant = %claims.tenant,
            roles = claims.roles.len(),
            "session state replaced"
        );

        self.publish(Arc::new(SessionSnapshot {
            status,
            principal: principal.map(Arc::new),
            claims,
        }));
    }

    /// Tear down the local session and return the provider logout URL.
    pub fn logout(&self) -> Result<Url, SessionError> {
        let url = login::logout_url(&self.settings, &self.settings.redirect_uri)?;
        self.replace_principal(None);
        Ok(url)
    }

    /// Start the external redirect protocol. The session itself is unchanged
    /// until the provider hands back a principal.
    pub fn begin_login(&self, return_target: &str) -> Result<LoginRedirect, SessionError> {
        login::begin_login(&self.settings, return_target)
    }

    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        self.state.borrow().clone()
    }

    pub fn current_principal(&self) -> Option<Arc<Principal>> {
        self.snapshot().principal.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.snapshot().is_loading()
    }

    /// Claims for decision-making, `None` while loading.
    pub fn ready_claims(&self) -> Option<ClaimSet> {
        self.snapshot().ready_claims().cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionSnapshot>> {
        self.state.subscribe()
    }

    /// Suspend until the session leaves `Loading`.
    pub async fn wait_ready(&self) -> Arc<SessionSnapshot> {
        let mut rx = self.state.subscribe();
        match rx.wait_for(|s| !s.is_loading()).await {
            Ok(snapshot) => snapshot.clone(),
            // the sender lives in `self`, so the channel cannot close here
            Err(_) => self.snapshot(),
        }
    }

    /// Acquire an access token for `request`.
    ///
    /// Waits for the session to be ready, then asks the provider. Cancelling
    /// `cancel` aborts either wait.
    pub async fn acquire_token(
        &self,
        request: &TokenRequest,
        cancel: &CancellationToken,
    ) -> Result<AccessToken, TokenAcquisitionError> {
        let snapshot = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TokenAcquisitionError::Cancelled),
            snapshot = self.wait_ready() => snapshot,
        };

        if !snapshot.is_authenticated() {
            return Err(TokenAcquisitionError::NotAuthenticated);
        }

        tracing::debug!(audience = %request.audience, scope = %request.scopes, "acquiring access token");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TokenAcquisitionError::Cancelled),
            result = self.provider.get_token_silently(request) => result,
        }
    }

    fn publish(&self, snapshot: Arc<SessionSnapshot>) {
        self.state.send_replace(snapshot);
    }
}
