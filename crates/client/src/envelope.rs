use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::RequestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// `{status, data, message}` wrapper every backend endpoint returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: ResponseStatus,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            data,
            message: Some(message.into()),
        }
    }
}

/// Wire shape before the status is known; error envelopes often omit `data`.
#[derive(Deserialize)]
struct RawEnvelope {
    status: ResponseStatus,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    message: Option<String>,
}

impl ApiResponse<Value> {
    /// Parse a response body. A missing `data` reads as `null`.
    pub fn from_slice(body: &[u8]) -> Result<Self, RequestError> {
        let raw: RawEnvelope = serde_json::from_slice(body).map_err(|e| RequestError::Decode(e.to_string()))?;
        Ok(Self {
            status: raw.status,
            data: raw.data,
            message: raw.message,
        })
    }

    /// Check the envelope status, then type the payload.
    ///
    /// An error envelope may carry any `data` (often `null`), so the status
    /// is inspected before the payload is deserialized.
    pub fn decode<T: DeserializeOwned>(self) -> Result<ApiResponse<T>, RequestError> {
        if self.status == ResponseStatus::Error {
            return Err(RequestError::Api(
                self.message.unwrap_or_else(|| "request failed".to_string()),
            ));
        }

        let data = serde_json::from_value(self.data).map_err(|e| RequestError::Decode(e.to_string()))?;
        Ok(ApiResponse {
            status: self.status,
            data,
            message: self.message,
        })
    }
}
