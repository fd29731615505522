//! Startup configuration.
//!
//! Read once. Missing values fall back to placeholders so the demo still
//! starts; only malformed values are errors.

use std::time::Duration;

use thiserror::Error;
use url::Url;

use tenantgate_auth::{ClaimNamespace, DEFAULT_CLAIM_NAMESPACE};
use tenantgate_client::FallbackMode;
use tenantgate_session::{ProviderSettings, ScopeSet};

/// Scope strings requested at each point of the application.
pub mod scopes {
    pub const LOGIN: &str = "openid profile email read:resources read:tenant admin:dashboard";
    pub const PROTECTED_PAGE: &str = "read:resources read:tenant";
    pub const ANALYTICS: &str = "read:analytics admin:dashboard";
    pub const MANAGEMENT: &str = "read:clients";
}

pub const PLACEHOLDER_DOMAIN: &str = "your-domain.auth0.com";
pub const PLACEHOLDER_CLIENT_ID: &str = "your-client-id";
pub const PLACEHOLDER_AUDIENCE: &str = "https://your-api.example.com";
pub const DEFAULT_APP_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_API_BASE: &str = "/api";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}: invalid url '{value}': {reason}")]
    InvalidUrl {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{key}: expected a whole number of seconds, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key}: expected true or false, got '{value}'")]
    InvalidBool { key: &'static str, value: String },

    #[error("http client: {0}")]
    HttpClient(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: ProviderSettings,
    pub api_base_url: Url,
    pub claim_namespace: ClaimNamespace,
    pub fallback: FallbackMode,
    pub request_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let or_placeholder = |key: &'static str, placeholder: &str| {
            get(key).unwrap_or_else(|| {
                tracing::warn!(key, placeholder, "not set; using placeholder value");
                placeholder.to_string()
            })
        };

        let origin_raw = get("APP_ORIGIN").unwrap_or_else(|| DEFAULT_APP_ORIGIN.to_string());
        let origin = parse_url("APP_ORIGIN", &origin_raw)?;

        let api_raw = or_placeholder("API_BASE_URL", DEFAULT_API_BASE);
        let api_base_url = if api_raw.starts_with('/') {
            origin.join(&api_raw).map_err(|e| ConfigError::InvalidUrl {
                key: "API_BASE_URL",
                value: api_raw.clone(),
                reason: e.to_string(),
            })?
        } else {
            parse_url("API_BASE_URL", &api_raw)?
        };

        let provider = ProviderSettings {
            domain: or_placeholder("AUTH0_DOMAIN", PLACEHOLDER_DOMAIN),
            client_id: or_placeholder("AUTH0_CLIENT_ID", PLACEHOLDER_CLIENT_ID),
            audience: or_placeholder("AUTH0_AUDIENCE", PLACEHOLDER_AUDIENCE),
            redirect_uri: origin,
            scope: ScopeSet::parse(scopes::LOGIN),
        };
        provider.base_url().map_err(|e| ConfigError::InvalidUrl {
            key: "AUTH0_DOMAIN",
            value: provider.domain.clone(),
            reason: e.to_string(),
        })?;

        let claim_namespace = ClaimNamespace::new(or_placeholder("CLAIM_NAMESPACE", DEFAULT_CLAIM_NAMESPACE));

        let fallback = match get("DEMO_MODE") {
            Some(raw) => {
                if parse_bool("DEMO_MODE", &raw)? {
                    FallbackMode::Demo
                } else {
                    FallbackMode::Disabled
                }
            }
            None => FallbackMode::Disabled,
        };

        let request_timeout = match get("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::InvalidNumber {
                    key: "REQUEST_TIMEOUT_SECS",
                    value: raw,
                })?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Self {
            provider,
            api_base_url,
            claim_namespace,
            fallback,
            request_timeout,
        })
    }
}

fn parse_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_placeholders() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.provider.domain, PLACEHOLDER_DOMAIN);
        assert_eq!(cfg.provider.client_id, PLACEHOLDER_CLIENT_ID);
        assert_eq!(cfg.provider.audience, PLACEHOLDER_AUDIENCE);
        assert_eq!(cfg.api_base_url.as_str(), "http://localhost:3000/api");
        assert_eq!(cfg.claim_namespace.as_str(), "https://myapp.com");
        assert_eq!(cfg.fallback, FallbackMode::Disabled);
        assert_eq!(cfg.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert!(cfg.provider.scope.contains("admin:dashboard"));
    }

    #[test]
    fn explicit_values_win() {
        let cfg = config(&[
            ("AUTH0_DOMAIN", "acme.eu.auth0.com"),
            ("AUTH0_CLIENT_ID", "abc"),
            ("AUTH0_AUDIENCE", "https://api.acme.test"),
            ("API_BASE_URL", "https://backend.acme.test/v1"),
            ("CLAIM_NAMESPACE", "https://acme.test/"),
            ("DEMO_MODE", "true"),
            ("REQUEST_TIMEOUT_SECS", "3"),
        ])
        .unwrap();
        assert_eq!(cfg.provider.domain, "acme.eu.auth0.com");
        assert_eq!(cfg.api_base_url.as_str(), "https://backend.acme.test/v1");
        assert_eq!(cfg.claim_namespace.key("roles"), "https://acme.test/roles");
        assert_eq!(cfg.fallback, FallbackMode::Demo);
        assert_eq!(cfg.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = config(&[("AUTH0_DOMAIN", "   "), ("DEMO_MODE", "")]).unwrap();
        assert_eq!(cfg.provider.domain, PLACEHOLDER_DOMAIN);
        assert_eq!(cfg.fallback, FallbackMode::Disabled);
    }

    #[test]
    fn malformed_values_fail() {
        assert!(matches!(
            config(&[("REQUEST_TIMEOUT_SECS", "soon")]),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert!(matches!(
            config(&[("REQUEST_TIMEOUT_SECS", "0")]),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert!(matches!(
            config(&[("DEMO_MODE", "maybe")]),
            Err(ConfigError::InvalidBool { .. })
        ));
        assert!(matches!(
            config(&[("API_BASE_URL", "not a url")]),
            Err(ConfigError::InvalidUrl { key: "API_BASE_URL", .. })
        ));
    }
}
