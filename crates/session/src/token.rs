use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Space-separated OAuth scope list, held as a set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct ScopeSet(BTreeSet<String>);

impl ScopeSet {
    pub fn parse(raw: &str) -> Self {
        Self(raw.split_whitespace().map(str::to_string).collect())
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.0.contains(scope)
    }

    pub fn is_subset(&self, other: &ScopeSet) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl core::fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for scope in &self.0 {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(scope)?;
            first = false;
        }
        Ok(())
    }
}

impl From<&str> for ScopeSet {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for ScopeSet {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<ScopeSet> for String {
    fn from(value: ScopeSet) -> Self {
        value.to_string()
    }
}

/// Audience/scope pair a token is requested for. Passed to the provider
/// unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    pub audience: String,
    pub scopes: ScopeSet,
}

impl TokenRequest {
    pub fn new(audience: impl Into<String>, scopes: impl Into<ScopeSet>) -> Self {
        Self {
            audience: audience.into(),
            scopes: scopes.into(),
        }
    }
}

/// Opaque bearer credential.
///
/// Lives only in memory for as long as the caller holds it. `Debug` never
/// prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    secret: String,
    audience: String,
    scopes: ScopeSet,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(secret: impl Into<String>, audience: impl Into<String>, scopes: ScopeSet) -> Self {
        Self {
            secret: secret.into(),
            audience: audience.into(),
            scopes,
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn as_str(&self) -> &str {
        &self.secret
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn scopes(&self) -> &ScopeSet {
        &self.scopes
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// First 20 characters followed by `...`, for on-screen display.
    pub fn preview(&self) -> String {
        let head: String = self.secret.chars().take(20).collect();
        format!("{head}...")
    }
}

impl core::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("audience", &self.audience)
            .field("scopes", &self.scopes)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn scopes_are_a_set() {
        let scopes = ScopeSet::parse("read:tenant  read:resources read:tenant");
        assert_eq!(scopes.to_string(), "read:resources read:tenant");
        assert!(scopes.contains("read:resources"));
        assert!(ScopeSet::parse("read:tenant").is_subset(&scopes));
        assert!(!ScopeSet::parse("admin:dashboard").is_subset(&scopes));
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let token = AccessToken::new("eyJhbGciOiJSUzI1NiJ9.secret", "https://api", ScopeSet::default());
        let printed = format!("{token:?}");
        assert!(printed.contains("<redacted>"));
        assert!(!printed.contains("eyJ"));
    }

    #[test]
    fn preview_truncates_to_twenty_chars() {
        let token = AccessToken::new("abcdefghijklmnopqrstuvwxyz", "aud", ScopeSet::default());
        assert_eq!(token.preview(), "abcdefghijklmnopqrst...");
    }

    #[test]
    fn expiry_is_optional() {
        let token = AccessToken::new("t", "aud", ScopeSet::default());
        assert_eq!(token.expires_at(), None);
        let at = Utc::now() + Duration::minutes(5);
        assert_eq!(token.with_expiry(at).expires_at(), Some(at));
    }
}
