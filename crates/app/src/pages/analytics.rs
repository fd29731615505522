use serde::Serialize;
use tokio_util::sync::CancellationToken;

use tenantgate_client::{DataSource, UserAnalytics};

use crate::config::scopes;
use crate::routes::Route;
use crate::{AppContext, PageError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsView {
    pub analytics: UserAnalytics,
    pub source: DataSource,
}

impl AnalyticsView {
    /// Share of active users in percent, rounded down and capped at 100;
    /// `None` without users.
    pub fn active_share(&self) -> Option<u64> {
        let total = u128::from(self.analytics.total_users);
        let active = u128::from(self.analytics.active_users);
        (total > 0).then(|| (active * 100 / total).min(100) as u64)
    }
}

/// Admin-only. The page re-checks the route requirement itself so a caller
/// that skipped the guard still gets `Denied`.
pub async fn load_analytics(ctx: &AppContext, cancel: &CancellationToken) -> Result<AnalyticsView, PageError> {
    super::report("analytics", load(ctx, cancel).await)
}

async fn load(ctx: &AppContext, cancel: &CancellationToken) -> Result<AnalyticsView, PageError> {
    let claims = super::signed_in_claims(ctx, cancel).await?;
    if let Some(requirement) = Route::Analytics.requirement() {
        let decision = requirement.admit(&claims);
        if !decision.admitted {
            return Err(PageError::Denied(decision));
        }
    }

    let token = ctx
        .session
        .acquire_token(&ctx.api_token_request(scopes::ANALYTICS), cancel)
        .await?;
    let fetched = ctx.api.user_analytics(&token, cancel).await?;

    Ok(AnalyticsView {
        analytics: fetched.data,
        source: fetched.source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(total_users: u64, active_users: u64) -> AnalyticsView {
        AnalyticsView {
            analytics: UserAnalytics {
                total_users,
                active_users,
                new_users_this_month: 0,
                average_session_duration: "0m 00s".into(),
                top_features: Vec::new(),
            },
            source: DataSource::Live,
        }
    }

    #[test]
    fn active_share_rounds_down() {
        assert_eq!(view(1250, 892).active_share(), Some(71));
        assert_eq!(view(0, 0).active_share(), None);
    }

    #[test]
    fn active_share_survives_extreme_counts() {
        assert_eq!(view(u64::MAX, u64::MAX).active_share(), Some(100));
        assert_eq!(view(u64::MAX, u64::MAX / 2).active_share(), Some(49));
        assert_eq!(view(1, u64::MAX).active_share(), Some(100));
    }
}
