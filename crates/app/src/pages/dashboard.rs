use chrono::{DateTime, Utc};
use serde::Serialize;

use tenantgate_auth::{ClaimSet, Principal};
use tenantgate_core::TenantId;
use tenantgate_session::SessionSnapshot;

const PERMISSION_PREVIEW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccessLevel {
    Administrator,
    StandardUser,
}

impl core::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AccessLevel::Administrator => f.write_str("Administrator"),
            AccessLevel::StandardUser => f.write_str("Standard User"),
        }
    }
}

/// Profile and access summary for the signed-in principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub display_name: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub picture: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    /// Role names capitalised for display.
    pub roles: Vec<String>,
    pub tenant: TenantId,
    pub permissions_preview: Vec<String>,
    /// Permissions not shown in the preview.
    pub more_permissions: usize,
    pub access_level: AccessLevel,
    pub show_admin_action: bool,
}

impl DashboardView {
    pub fn build(principal: &Principal, claims: &ClaimSet) -> Self {
        let admin = claims.is_admin();
        Self {
            display_name: principal.display_name().to_string(),
            email: principal.email.clone(),
            email_verified: principal.email_verified.unwrap_or(false),
            picture: principal.picture.clone(),
            last_updated: principal.updated_at,
            roles: claims.roles.iter().map(|r| role_label(r.as_str())).collect(),
            tenant: claims.tenant.clone(),
            permissions_preview: claims
                .permissions
                .iter()
                .take(PERMISSION_PREVIEW)
                .map(|p| p.as_str().to_string())
                .collect(),
            more_permissions: claims.permissions.len().saturating_sub(PERMISSION_PREVIEW),
            access_level: if admin {
                AccessLevel::Administrator
            } else {
                AccessLevel::StandardUser
            },
            show_admin_action: admin,
        }
    }

    /// `None` unless the snapshot is ready and carries a principal.
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Option<Self> {
        let claims = snapshot.ready_claims()?;
        let principal = snapshot.principal()?;
        Some(Self::build(principal, claims))
    }
}

/// `"admin"` becomes `"Admin"`.
fn role_label(role: &str) -> String {
    let mut chars = role.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tenantgate_auth::ClaimExtractor;
    use tenantgate_core::SubjectId;

    fn principal(roles: serde_json::Value, permissions: serde_json::Value) -> Principal {
        Principal::new(SubjectId::new("auth0|7").unwrap())
            .with_name("Dana")
            .with_email("dana@acme.test", true)
            .with_claim("https://myapp.com/roles", roles)
            .with_claim("https://myapp.com/permissions", permissions)
    }

    #[test]
    fn admin_sees_quick_action_and_truncated_permissions() {
        let p = principal(
            json!(["admin", "user"]),
            json!(["read:a", "read:b", "read:c", "read:d", "read:e"]),
        );
        let claims = ClaimExtractor::default().extract(Some(&p));
        let view = DashboardView::build(&p, &claims);

        assert_eq!(view.display_name, "Dana");
        assert!(view.email_verified);
        assert_eq!(view.access_level, AccessLevel::Administrator);
        assert_eq!(view.access_level.to_string(), "Administrator");
        assert!(view.show_admin_action);
        assert_eq!(view.roles, vec!["Admin", "User"]);
        assert_eq!(view.permissions_preview, vec!["read:a", "read:b", "read:c"]);
        assert_eq!(view.more_permissions, 2);
        assert!(view.tenant.is_default());
    }

    #[test]
    fn missing_claims_give_standard_user() {
        let p = Principal::new(SubjectId::new("auth0|8").unwrap());
        let claims = ClaimExtractor::default().extract(Some(&p));
        let view = DashboardView::build(&p, &claims);

        assert_eq!(view.display_name, "User");
        assert!(!view.email_verified);
        assert_eq!(view.access_level.to_string(), "Standard User");
        assert!(!view.show_admin_action);
        assert!(view.roles.is_empty());
        assert_eq!(view.more_permissions, 0);
    }

    #[test]
    fn role_labels_are_capitalised() {
        assert_eq!(role_label("admin"), "Admin");
        assert_eq!(role_label(""), "");
    }
}
