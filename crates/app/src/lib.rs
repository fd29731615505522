//! `tenantgate-app`: wiring of session, claims, decisions and the request
//! gateway into the pages of the demo application.

pub mod config;
pub mod context;
pub mod error;
pub mod pages;
pub mod routes;

pub use config::{AppConfig, ConfigError};
pub use context::{AppContext, DEFAULT_APPLICATION_NAME};
pub use error::PageError;
pub use routes::{GuardOutcome, Route, guard};
