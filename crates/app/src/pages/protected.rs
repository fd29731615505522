use serde::Serialize;
use tokio_util::sync::CancellationToken;

use tenantgate_auth::{AccessDecision, ClaimSet, ProtectedResource, decide};
use tenantgate_client::{DataSource, TenantInfo};

use crate::config::scopes;
use crate::{AppContext, PageError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRow {
    pub resource: ProtectedResource,
    pub decision: AccessDecision,
}

impl ResourceRow {
    pub fn denial_summary(&self) -> Option<String> {
        self.decision.denial_summary()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtectedResourcesView {
    /// First characters of the access token, never the whole secret.
    pub token_preview: String,
    pub claims: ClaimSet,
    pub resources: Vec<ResourceRow>,
    pub tenant: TenantInfo,
    /// `Demo` if any part of the page was served from canned data.
    pub source: DataSource,
}

impl ProtectedResourcesView {
    pub fn admitted_count(&self) -> usize {
        self.resources.iter().filter(|row| row.decision.admitted).count()
    }
}

/// Acquire a token, fetch resources then tenant info, and decide each
/// resource against the session's claims.
pub async fn load_protected_resources(
    ctx: &AppContext,
    cancel: &CancellationToken,
) -> Result<ProtectedResourcesView, PageError> {
    super::report("protected", load(ctx, cancel).await)
}

async fn load(ctx: &AppContext, cancel: &CancellationToken) -> Result<ProtectedResourcesView, PageError> {
    let claims = super::signed_in_claims(ctx, cancel).await?;
    let token = ctx
        .session
        .acquire_token(&ctx.api_token_request(scopes::PROTECTED_PAGE), cancel)
        .await?;

    let resources = ctx.api.protected_resources(&token, cancel).await?;
    let tenant = ctx.api.tenant_info(&token, cancel).await?;

    let rows: Vec<ResourceRow> = resources
        .data
        .into_iter()
        .map(|resource| {
            let decision = decide(&resource, &claims);
            ResourceRow { resource, decision }
        })
        .collect();

    let source = if resources.source.is_demo() {
        resources.source
    } else {
        tenant.source
    };

    tracing::info!(
        resources = rows.len(),
        admitted = rows.iter().filter(|r| r.decision.admitted).count(),
        demo = source.is_demo(),
        "protected resources loaded"
    );

    Ok(ProtectedResourcesView {
        token_preview: token.preview(),
        claims,
        resources: rows,
        tenant: tenant.data,
        source,
    })
}
