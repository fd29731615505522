//! `tenantgate-core`: identifier and error primitives shared by every crate.
//!
//! No IO, no async, no identity-provider specifics.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{DEFAULT_TENANT, SubjectId, TenantId};
