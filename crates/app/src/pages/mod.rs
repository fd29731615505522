//! Page models and their data loaders.

pub mod analytics;
pub mod dashboard;
pub mod protected;

pub use analytics::{AnalyticsView, load_analytics};
pub use dashboard::{AccessLevel, DashboardView};
pub use protected::{ProtectedResourcesView, ResourceRow, load_protected_resources};

use tokio_util::sync::CancellationToken;

use tenantgate_auth::ClaimSet;
use tenantgate_session::TokenAcquisitionError;

use crate::{AppContext, PageError};

/// Claims of the signed-in principal once the session is ready.
async fn signed_in_claims(ctx: &AppContext, cancel: &CancellationToken) -> Result<ClaimSet, PageError> {
    let snapshot = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(TokenAcquisitionError::Cancelled.into()),
        snapshot = ctx.session.wait_ready() => snapshot,
    };

    match snapshot.ready_claims() {
        Some(claims) if snapshot.is_authenticated() => Ok(claims.clone()),
        _ => Err(TokenAcquisitionError::NotAuthenticated.into()),
    }
}

fn report<T>(page: &'static str, result: Result<T, PageError>) -> Result<T, PageError> {
    if let Err(err) = &result {
        if err.is_cancelled() {
            tracing::debug!(page, "page load cancelled");
        } else {
            tracing::error!(page, error = %err, retry = ?err.retry_hint(), "page load failed");
        }
    }
    result
}
