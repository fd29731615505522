//! Read-only calls against the identity provider's management API.
//!
//! Responses are the provider's own JSON, not the backend envelope.

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use url::Url;

use tenantgate_session::AccessToken;

use crate::transport;
use crate::{ApplicationInfo, RequestError, RequestOptions, TenantInfo, UserStats};

const TOTAL_COUNT_HEADER: &str = "x-total-count";

#[derive(Debug, Clone)]
pub struct ManagementClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ManagementClient {
    /// `base_url` is the provider root, e.g. `https://tenant.auth0.com/`.
    pub fn new(base_url: Url) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    pub fn with_http(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Audience a management token must be requested for.
    pub fn audience(&self) -> String {
        format!("{}/api/v2/", self.base_url.as_str().trim_end_matches('/'))
    }

    pub async fn application_info(
        &self,
        token: &AccessToken,
        client_id: &str,
        cancel: &CancellationToken,
    ) -> Result<ApplicationInfo, RequestError> {
        let mut url = transport::resolve(&self.base_url, "/api/v2/clients")?;
        url.path_segments_mut()
            .map_err(|_| RequestError::InvalidRequest("management base url cannot have a path".into()))?
            .push(client_id);

        let doc = self.get_json(url, token, cancel).await?;
        Ok(ApplicationInfo {
            name: non_blank(&doc, "name").unwrap_or_else(|| "Auth0 Application".to_string()),
            description: non_blank(&doc, "description"),
        })
    }

    /// Plan and user count are not part of the settings document; they are
    /// reported as `Standard` and `0`.
    pub async fn tenant_settings(
        &self,
        token: &AccessToken,
        cancel: &CancellationToken,
    ) -> Result<TenantInfo, RequestError> {
        let url = transport::resolve(&self.base_url, "/api/v2/tenants/settings")?;
        let doc = self.get_json(url, token, cancel).await?;

        let tenant = non_blank(&doc, "tenant");
        Ok(TenantInfo {
            id: tenant.clone().unwrap_or_else(|| "unknown".to_string()),
            name: non_blank(&doc, "friendly_name")
                .or(tenant)
                .unwrap_or_else(|| "Unknown Tenant".to_string()),
            domain: self.base_url.host_str().unwrap_or("unknown").to_string(),
            plan: "Standard".to_string(),
            user_count: 0,
        })
    }

    /// Total from the `x-total-count` header of a one-item user page.
    pub async fn user_stats(
        &self,
        token: &AccessToken,
        cancel: &CancellationToken,
    ) -> Result<UserStats, RequestError> {
        let url = transport::resolve(&self.base_url, "/api/v2/users?per_page=1")?;
        let received = transport::send(&self.http, url, token, RequestOptions::get(), cancel).await?;

        let total = received
            .headers
            .get(TOTAL_COUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(0);
        Ok(UserStats::from_total(total))
    }

    async fn get_json(
        &self,
        url: Url,
        token: &AccessToken,
        cancel: &CancellationToken,
    ) -> Result<Value, RequestError> {
        let received = transport::send(&self.http, url, token, RequestOptions::get(), cancel).await?;
        serde_json::from_slice(&received.body).map_err(|e| RequestError::Decode(e.to_string()))
    }
}

fn non_blank(doc: &Value, key: &str) -> Option<String> {
    doc.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
