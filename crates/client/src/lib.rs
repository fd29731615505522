//! `tenantgate-client`: authenticated request gateway.
//!
//! Attaches a bearer token to every call, maps failures to [`RequestError`]
//! and never substitutes data unless the caller opted into
//! [`FallbackMode::Demo`].

pub mod client;
pub mod demo;
pub mod envelope;
pub mod error;
pub mod management;
pub mod models;
pub mod request;
mod transport;

pub use client::{ApiClient, endpoints};
pub use demo::{DataSource, FallbackMode, Fetched, demo_payload};
pub use envelope::{ApiResponse, ResponseStatus};
pub use error::{RequestError, TransportError};
pub use management::ManagementClient;
pub use models::{ApplicationInfo, FeatureUsage, TenantInfo, UserAnalytics, UserStats};
pub use request::RequestOptions;
