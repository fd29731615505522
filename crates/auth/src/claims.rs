use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use tenantgate_core::TenantId;

use crate::{Permission, Principal, Role};

/// Namespace the identity provider is configured to put custom claims under.
pub const DEFAULT_CLAIM_NAMESPACE: &str = "https://myapp.com";

pub const ROLES_CLAIM: &str = "roles";
pub const TENANT_CLAIM: &str = "tenant";
pub const PERMISSIONS_CLAIM: &str = "permissions";

/// URL-shaped prefix for custom claims (`https://<app-domain>`).
///
/// Custom claims must not collide with standard OIDC claims, so the provider
/// emits them as `<namespace>/<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimNamespace(String);

impl ClaimNamespace {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self(prefix.trim_end_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fully qualified claim key for `name`.
    pub fn key(&self, name: &str) -> String {
        format!("{}/{}", self.0, name)
    }
}

impl Default for ClaimNamespace {
    fn default() -> Self {
        Self::new(DEFAULT_CLAIM_NAMESPACE)
    }
}

/// Access-relevant view of a principal.
///
/// Derived, never persisted. `tenant` is always a usable identifier and the
/// sets are empty rather than absent when the claims are missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    pub roles: BTreeSet<Role>,
    pub tenant: TenantId,
    pub permissions: BTreeSet<Permission>,
}

impl ClaimSet {
    /// Claims of an unauthenticated caller.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.as_str() == role)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p.as_str() == permission)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::ADMIN)
    }
}

/// Reads the namespaced `roles`, `tenant` and `permissions` claims.
///
/// - No IO
/// - No panics
/// - Malformed claims are treated as absent
#[derive(Debug, Clone)]
pub struct ClaimExtractor {
    roles_key: String,
    tenant_key: String,
    permissions_key: String,
}

impl ClaimExtractor {
    pub fn new(namespace: &ClaimNamespace) -> Self {
        Self {
            roles_key: namespace.key(ROLES_CLAIM),
            tenant_key: namespace.key(TENANT_CLAIM),
            permissions_key: namespace.key(PERMISSIONS_CLAIM),
        }
    }

    pub fn extract(&self, principal: Option<&Principal>) -> ClaimSet {
        let Some(principal) = principal else {
            return ClaimSet::anonymous();
        };

        let roles = string_set(principal.claim(&self.roles_key), &self.roles_key)
            .into_iter()
            .map(Role::new)
            .collect();

        let permissions = string_set(principal.claim(&self.permissions_key), &self.permissions_key)
            .into_iter()
            .map(Permission::new)
            .collect();

        let tenant = tenant(principal.claim(&self.tenant_key), &self.tenant_key)
            .unwrap_or_default();

        ClaimSet {
            roles,
            tenant,
            permissions,
        }
    }
}

impl Default for ClaimExtractor {
    fn default() -> Self {
        Self::new(&ClaimNamespace::default())
    }
}

/// A claim that is an array of strings; anything else yields the empty set.
fn string_set(value: Option<&Value>, key: &str) -> BTreeSet<String> {
    let Some(value) = value else {
        return BTreeSet::new();
    };

    let items = match value {
        Value::Array(items) => items,
        other => {
            tracing::debug!(claim = key, kind = kind(other), "ignoring non-array claim");
            return BTreeSet::new();
        }
    };

    let mut out = BTreeSet::new();
    for item in items {
        match item {
            Value::String(s) => {
                out.insert(s.clone());
            }
            other => {
                tracing::debug!(claim = key, kind = kind(other), "ignoring array claim with non-string element");
                return BTreeSet::new();
            }
        }
    }
    out
}

fn tenant(value: Option<&Value>, key: &str) -> Option<TenantId> {
    match value? {
        Value::String(s) => TenantId::new(s.as_str()).ok(),
        other => {
            tracing::debug!(claim = key, kind = kind(other), "ignoring non-string tenant claim");
            None
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
