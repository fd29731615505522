//! Application-wide services, built once at startup and passed by reference.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use tenantgate_auth::ClaimExtractor;
use tenantgate_client::{ApiClient, ManagementClient};
use tenantgate_session::{IdentityProvider, IdentitySession, TokenRequest};

use crate::config::{AppConfig, ConfigError, scopes};
use crate::routes::{GuardOutcome, Route, guard};

pub const DEFAULT_APPLICATION_NAME: &str = "Auth0 Demo";

pub struct AppContext {
    pub config: AppConfig,
    pub session: Arc<IdentitySession>,
    pub api: ApiClient,
    pub management: ManagementClient,
}

impl AppContext {
    pub fn new(config: AppConfig, provider: Arc<dyn IdentityProvider>) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        let provider_root = config
            .provider
            .base_url()
            .map_err(|e| ConfigError::InvalidUrl {
                key: "AUTH0_DOMAIN",
                value: config.provider.domain.clone(),
                reason: e.to_string(),
            })?;

        let api = ApiClient::with_http(http.clone(), config.api_base_url.clone()).with_fallback(config.fallback);
        let management = ManagementClient::with_http(http, provider_root);
        let session = Arc::new(IdentitySession::new(
            provider,
            config.provider.clone(),
            ClaimExtractor::new(&config.claim_namespace),
        ));

        Ok(Self {
            config,
            session,
            api,
            management,
        })
    }

    /// Resolve `location` and run the admission guard against the current
    /// session snapshot.
    pub fn navigate(&self, location: &str) -> (Route, GuardOutcome) {
        let route = Route::resolve(location);
        (route, guard(route, &self.session.snapshot()))
    }

    /// Token request for the application backend.
    pub fn api_token_request(&self, scope: &str) -> TokenRequest {
        TokenRequest::new(self.config.provider.audience.clone(), scope)
    }

    /// Display name of the registered application.
    ///
    /// Anonymous sessions, cancellation and every failure yield
    /// [`DEFAULT_APPLICATION_NAME`].
    pub async fn application_name(&self, cancel: &CancellationToken) -> String {
        let snapshot = tokio::select! {
            biased;
            _ = cancel.cancelled() => return DEFAULT_APPLICATION_NAME.to_string(),
            snapshot = self.session.wait_ready() => snapshot,
        };
        if !snapshot.is_authenticated() {
            return DEFAULT_APPLICATION_NAME.to_string();
        }

        let request = TokenRequest::new(self.management.audience(), scopes::MANAGEMENT);
        let token = match self.session.acquire_token(&request, cancel).await {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!(error = %err, "management token unavailable; using default application name");
                return DEFAULT_APPLICATION_NAME.to_string();
            }
        };

        match self
            .management
            .application_info(&token, &self.config.provider.client_id, cancel)
            .await
        {
            Ok(info) => info.name,
            Err(err) => {
                tracing::warn!(error = %err, "application info unavailable; using default application name");
                DEFAULT_APPLICATION_NAME.to_string()
            }
        }
    }
}
