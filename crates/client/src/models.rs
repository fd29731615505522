use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantInfo {
    pub id: String,
    pub name: String,
    pub domain: String,
    pub plan: String,
    pub user_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureUsage {
    pub name: String,
    /// Percentage of users touching the feature.
    pub usage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnalytics {
    pub total_users: u64,
    pub active_users: u64,
    pub new_users_this_month: u64,
    pub average_session_duration: String,
    #[serde(default)]
    pub top_features: Vec<FeatureUsage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub user_count: u64,
    pub active_users: u64,
}

impl UserStats {
    /// Active users are estimated at 70% of the total, rounded down.
    pub fn from_total(total: u64) -> Self {
        Self {
            user_count: total,
            active_users: total / 10 * 7 + total % 10 * 7 / 10,
        }
    }
}
