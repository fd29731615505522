//! Route table and admission guard.

use serde::Serialize;

use tenantgate_auth::{AccessDecision, ClaimSet, PageRequirement, Role};
use tenantgate_session::SessionSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Login,
    Dashboard,
    Protected,
    Analytics,
}

impl Route {
    pub const ALL: [Route; 4] = [Route::Login, Route::Dashboard, Route::Protected, Route::Analytics];

    /// Map a location to a route. `/` and unknown paths land on the login page.
    pub fn resolve(location: &str) -> Route {
        let path = location.split(['?', '#']).next().unwrap_or_default();
        match path.trim_end_matches('/') {
            "/dashboard" => Route::Dashboard,
            "/protected" => Route::Protected,
            "/analytics" => Route::Analytics,
            _ => Route::Login,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::Protected => "/protected",
            Route::Analytics => "/analytics",
        }
    }

    /// `None` for public pages.
    pub fn requirement(self) -> Option<PageRequirement> {
        match self {
            Route::Login => None,
            Route::Dashboard | Route::Protected => Some(PageRequirement::open()),
            Route::Analytics => Some(PageRequirement::role(Role::admin())),
        }
    }
}

/// What the shell should do with a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Session not ready; render a spinner and decide nothing yet.
    Loading,
    /// Start a login that returns to `return_to` afterwards.
    LoginRequired { return_to: &'static str },
    /// Go elsewhere instead (a signed-in user on the login page).
    Redirect(Route),
    Denied(AccessDecision),
    Admitted(ClaimSet),
}

pub fn guard(route: Route, snapshot: &SessionSnapshot) -> GuardOutcome {
    let Some(claims) = snapshot.ready_claims() else {
        return GuardOutcome::Loading;
    };

    let Some(requirement) = route.requirement() else {
        return if snapshot.is_authenticated() {
            GuardOutcome::Redirect(Route::Dashboard)
        } else {
            GuardOutcome::Admitted(claims.clone())
        };
    };

    if !snapshot.is_authenticated() {
        return GuardOutcome::LoginRequired {
            return_to: route.path(),
        };
    }

    let decision = requirement.admit(claims);
    if decision.admitted {
        GuardOutcome::Admitted(claims.clone())
    } else {
        tracing::info!(route = route.path(), reasons = ?decision.reasons, "navigation denied");
        GuardOutcome::Denied(decision)
    }
}
