//! Canned payloads for offline demonstrations.
//!
//! Substitution only happens through [`crate::ApiClient::fetch_or_demo`] on a
//! client built with [`FallbackMode::Demo`], and the result says so.

use serde::Serialize;
use serde_json::{Value, json};

use crate::ApiResponse;
use crate::endpoints;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackMode {
    /// Failures reach the caller.
    #[default]
    Disabled,
    /// Failures are replaced by the endpoint's canned payload.
    Demo,
}

/// Where a [`Fetched`] payload came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSource {
    Live,
    Demo { cause: String },
}

impl DataSource {
    pub fn is_demo(&self) -> bool {
        matches!(self, DataSource::Demo { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub data: T,
    pub message: Option<String>,
    pub source: DataSource,
}

/// The canned envelope for `path`; unknown paths get an empty object.
pub fn demo_payload(path: &str) -> ApiResponse<Value> {
    match path {
        endpoints::PROTECTED_RESOURCES => ApiResponse::success(
            json!([
                {
                    "id": "1",
                    "name": "User Dashboard Data",
                    "description": "Basic user information and preferences",
                    "requiredRole": "user"
                },
                {
                    "id": "2",
                    "name": "Admin Panel Access",
                    "description": "Administrative controls and system settings",
                    "requiredRole": "admin"
                },
                {
                    "id": "3",
                    "name": "Analytics Data",
                    "description": "Business intelligence and reporting data",
                    "requiredRole": "admin"
                }
            ]),
            "Protected resources retrieved successfully",
        ),
        endpoints::TENANT_INFO => ApiResponse::success(
            json!({
                "id": "tenant-123",
                "name": "Acme Corporation",
                "domain": "acme.com",
                "plan": "Enterprise",
                "userCount": 1250
            }),
            "Tenant information retrieved successfully",
        ),
        endpoints::USER_ANALYTICS => ApiResponse::success(
            json!({
                "totalUsers": 1250,
                "activeUsers": 892,
                "newUsersThisMonth": 45,
                "averageSessionDuration": "12m 34s",
                "topFeatures": [
                    { "name": "Dashboard", "usage": 95 },
                    { "name": "Reports", "usage": 78 },
                    { "name": "Settings", "usage": 65 }
                ]
            }),
            "Analytics data retrieved successfully",
        ),
        _ => ApiResponse::success(json!({}), "Demo data retrieved successfully"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TenantInfo, UserAnalytics};
    use tenantgate_auth::ProtectedResource;

    #[test]
    fn canned_payloads_decode_into_models() {
        let resources = demo_payload(endpoints::PROTECTED_RESOURCES)
            .decode::<Vec<ProtectedResource>>()
            .unwrap();
        assert_eq!(resources.data.len(), 3);
        assert_eq!(resources.data[1].required_role.as_ref().unwrap().as_str(), "admin");

        let tenant = demo_payload(endpoints::TENANT_INFO).decode::<TenantInfo>().unwrap();
        assert_eq!(tenant.data.name, "Acme Corporation");

        let analytics = demo_payload(endpoints::USER_ANALYTICS)
            .decode::<UserAnalytics>()
            .unwrap();
        assert_eq!(analytics.data.top_features.len(), 3);
    }

    #[test]
    fn unknown_path_is_empty_object() {
        assert_eq!(demo_payload("/nope").data, json!({}));
    }

    #[test]
    fn fallback_is_off_by_default() {
        assert_eq!(FallbackMode::default(), FallbackMode::Disabled);
    }
}
