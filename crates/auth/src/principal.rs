use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use tenantgate_core::{DomainError, SubjectId};

/// Authenticated identity as issued by the identity provider.
///
/// Built from the decoded ID-token claim document. Standard OIDC profile
/// claims are lifted into typed fields; everything else (namespaced custom
/// claims, `iss`, `aud`, ...) stays in [`Principal::claims`] untouched.
///
/// A principal is never mutated after construction: re-authentication
/// replaces it as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Principal {
    pub sub: SubjectId,
    pub name: Option<String>,
    pub nickname: Option<String>,
    pub preferred_username: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub picture: Option<String>,
    pub locale: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub claims: Map<String, Value>,
}

const STRING_CLAIMS: [&str; 8] = [
    "name",
    "nickname",
    "preferred_username",
    "given_name",
    "family_name",
    "email",
    "picture",
    "locale",
];

impl Principal {
    /// A principal with only a subject identifier.
    pub fn new(sub: SubjectId) -> Self {
        Self {
            sub,
            name: None,
            nickname: None,
            preferred_username: None,
            given_name: None,
            family_name: None,
            email: None,
            email_verified: None,
            picture: None,
            locale: None,
            updated_at: None,
            claims: Map::new(),
        }
    }

    /// Build a principal from a raw claim document.
    ///
    /// Only `sub` is mandatory. Standard claims with an unexpected type are
    /// dropped rather than rejected.
    pub fn from_claims(mut doc: Map<String, Value>) -> Result<Self, DomainError> {
        let sub = match doc.remove("sub") {
            Some(Value::String(s)) => SubjectId::new(s)?,
            Some(_) => return Err(DomainError::validation("sub claim must be a string")),
            None => return Err(DomainError::missing_claim("sub")),
        };

        let mut principal = Principal::new(sub);
        let mut strings = STRING_CLAIMS.map(|key| take_string(&mut doc, key));
        principal.name = strings[0].take();
        principal.nickname = strings[1].take();
        principal.preferred_username = strings[2].take();
        principal.given_name = strings[3].take();
        principal.family_name = strings[4].take();
        principal.email = strings[5].take();
        principal.picture = strings[6].take();
        principal.locale = strings[7].take();

        principal.email_verified = match doc.remove("email_verified") {
            Some(Value::Bool(b)) => Some(b),
            _ => None,
        };
        principal.updated_at = doc.remove("updated_at").and_then(parse_timestamp);
        principal.claims = doc;

        Ok(principal)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>, verified: bool) -> Self {
        self.email = Some(email.into());
        self.email_verified = Some(verified);
        self
    }

    pub fn with_claim(mut self, key: impl Into<String>, value: Value) -> Self {
        self.claims.insert(key.into(), value);
        self
    }

    /// Raw value of a non-standard claim.
    pub fn claim(&self, key: &str) -> Option<&Value> {
        self.claims.get(key)
    }

    /// Name shown in greetings: `name`, then `nickname`, then `"User"`.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.nickname.as_deref())
            .unwrap_or("User")
    }
}

impl TryFrom<Map<String, Value>> for Principal {
    type Error = DomainError;

    fn try_from(value: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::from_claims(value)
    }
}

impl From<Principal> for Map<String, Value> {
    fn from(p: Principal) -> Self {
        let mut doc = p.claims;
        doc.insert("sub".into(), Value::String(p.sub.into_inner()));

        let strings = [
            ("name", p.name),
            ("nickname", p.nickname),
            ("preferred_username", p.preferred_username),
            ("given_name", p.given_name),
            ("family_name", p.family_name),
            ("email", p.email),
            ("picture", p.picture),
            ("locale", p.locale),
        ];
        for (key, value) in strings {
            if let Some(v) = value {
                doc.insert(key.into(), Value::String(v));
            }
        }
        if let Some(v) = p.email_verified {
            doc.insert("email_verified".into(), Value::Bool(v));
        }
        if let Some(ts) = p.updated_at {
            doc.insert("updated_at".into(), Value::String(ts.to_rfc3339()));
        }
        doc
    }
}

fn take_string(doc: &mut Map<String, Value>, key: &str) -> Option<String> {
    match doc.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

/// `updated_at` is RFC 3339 on some providers and epoch seconds on others.
fn parse_timestamp(value: Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        _ => None,
    }
}
