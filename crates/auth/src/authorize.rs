use serde::{Deserialize, Deserializer, Serialize};

use tenantgate_core::TenantId;

use crate::{ClaimSet, Role};

/// A guarded item as described by the backend (or declared statically).
///
/// `None` on either requirement means "no restriction" on that dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectedResource {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "role_or_blank",
        skip_serializing_if = "Option::is_none"
    )]
    pub required_role: Option<Role>,
    #[serde(
        default,
        alias = "tenantId",
        deserialize_with = "tenant_or_blank",
        skip_serializing_if = "Option::is_none"
    )]
    pub required_tenant_id: Option<TenantId>,
}

impl ProtectedResource {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            required_role: None,
            required_tenant_id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn requiring_role(mut self, role: impl Into<Role>) -> Self {
        self.required_role = Some(role.into());
        self
    }

    pub fn requiring_tenant(mut self, tenant: TenantId) -> Self {
        self.required_tenant_id = Some(tenant);
        self
    }
}

/// Why a decision was negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DenialReason {
    MissingRole { role: Role },
    TenantMismatch { required: TenantId },
}

impl core::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DenialReason::MissingRole { role } => write!(f, "missing required role: {role}"),
            DenialReason::TenantMismatch { required } => write!(f, "tenant mismatch: need {required}"),
        }
    }
}

/// Outcome of evaluating one resource against one claim set.
///
/// `reasons` is ordered: the role reason always precedes the tenant reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    pub admitted: bool,
    pub role_satisfied: bool,
    pub tenant_satisfied: bool,
    pub reasons: Vec<String>,
}

impl AccessDecision {
    /// Reasons joined for single-line display, `None` when admitted.
    pub fn denial_summary(&self) -> Option<String> {
        if self.admitted {
            None
        } else {
            Some(self.reasons.join(" | "))
        }
    }
}

/// Decide whether `claims` may access `resource`.
///
/// - No IO
/// - No panics
/// - Deterministic
pub fn decide(resource: &ProtectedResource, claims: &ClaimSet) -> AccessDecision {
    evaluate(
        resource.required_role.as_ref(),
        resource.required_tenant_id.as_ref(),
        claims,
    )
}

/// Page-level admission: a page may declare a single required role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequirement {
    pub required_role: Option<Role>,
}

impl PageRequirement {
    /// A page every authenticated principal may see.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn role(role: impl Into<Role>) -> Self {
        Self {
            required_role: Some(role.into()),
        }
    }

    /// Same rule as [`decide`], with no tenant requirement.
    pub fn admit(&self, claims: &ClaimSet) -> AccessDecision {
        evaluate(self.required_role.as_ref(), None, claims)
    }
}

fn evaluate(
    required_role: Option<&Role>,
    required_tenant: Option<&TenantId>,
    claims: &ClaimSet,
) -> AccessDecision {
    let role_satisfied = required_role.is_none_or(|role| claims.roles.contains(role));
    let tenant_satisfied = required_tenant.is_none_or(|tenant| *tenant == claims.tenant);

    let mut denials = Vec::new();
    if let (false, Some(role)) = (role_satisfied, required_role) {
        denials.push(DenialReason::MissingRole { role: role.clone() });
    }
    if let (false, Some(required)) = (tenant_satisfied, required_tenant) {
        denials.push(DenialReason::TenantMismatch {
            required: required.clone(),
        });
    }

    AccessDecision {
        admitted: role_satisfied && tenant_satisfied,
        role_satisfied,
        tenant_satisfied,
        reasons: denials.iter().map(ToString::to_string).collect(),
    }
}

fn non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

fn role_or_blank<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(non_blank(deserializer)?.map(Role::new))
}

fn tenant_or_blank<'de, D>(deserializer: D) -> Result<Option<TenantId>, D::Error>
where
    D: Deserializer<'de>,
{
    non_blank(deserializer)?
        .map(TenantId::new)
        .transpose()
        .map_err(serde::de::Error::custom)
}
