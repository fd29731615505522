//! In-process identity provider with a fixed principal.
//!
//! Backs the offline demo binary and the test suites. Tokens are random
//! opaque strings scoped to whatever was requested, as long as the requested
//! scopes were granted up front.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use tenantgate_auth::Principal;

use crate::{AccessToken, IdentityProvider, ScopeSet, SessionError, TokenAcquisitionError, TokenRequest};

#[derive(Debug, Clone)]
pub struct StaticIdentityProvider {
    principal: Option<Principal>,
    granted: Option<ScopeSet>,
    interaction_required: Option<String>,
    latency: Option<Duration>,
    token_ttl: chrono::Duration,
}

impl StaticIdentityProvider {
    pub fn signed_in(principal: Principal) -> Self {
        Self::with_principal(Some(principal))
    }

    pub fn anonymous() -> Self {
        Self::with_principal(None)
    }

    fn with_principal(principal: Option<Principal>) -> Self {
        Self {
            principal,
            granted: None,
            interaction_required: None,
            latency: None,
            token_ttl: chrono::Duration::hours(1),
        }
    }

    /// Restrict silent issuance to these scopes; anything else needs consent.
    pub fn with_granted_scopes(mut self, scopes: ScopeSet) -> Self {
        self.granted = Some(scopes);
        self
    }

    /// Make every silent token request fail with `InteractionRequired`.
    pub fn requiring_interaction(mut self, reason: impl Into<String>) -> Self {
        self.interaction_required = Some(reason.into());
        self
    }

    /// Delay every provider call, simulating a network round-trip.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn restore_session(&self) -> Result<Option<Principal>, SessionError> {
        self.simulate_latency().await;
        Ok(self.principal.clone())
    }

    async fn get_token_silently(
        &self,
        request: &TokenRequest,
    ) -> Result<AccessToken, TokenAcquisitionError> {
        self.simulate_latency().await;

        if self.principal.is_none() {
            return Err(TokenAcquisitionError::InteractionRequired("login_required".into()));
        }
        if let Some(reason) = &self.interaction_required {
            return Err(TokenAcquisitionError::InteractionRequired(reason.clone()));
        }
        if let Some(granted) = &self.granted {
            if !request.scopes.is_subset(granted) {
                return Err(TokenAcquisitionError::InteractionRequired("consent_required".into()));
            }
        }

        let secret = format!("st_{}", Uuid::now_v7().simple());
        Ok(AccessToken::new(secret, request.audience.clone(), request.scopes.clone())
            .with_expiry(Utc::now() + self.token_ttl))
    }
}
