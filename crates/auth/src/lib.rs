//! `tenantgate-auth`: claim extraction and access decisions.
//!
//! This crate is intentionally decoupled from HTTP, tokens and the identity
//! provider. It reads claims that were already validated elsewhere and turns
//! them into admit/deny decisions.

pub mod authorize;
pub mod claims;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{AccessDecision, DenialReason, PageRequirement, ProtectedResource, decide};
pub use claims::{ClaimExtractor, ClaimNamespace, ClaimSet, DEFAULT_CLAIM_NAMESPACE};
pub use permissions::Permission;
pub use principal::Principal;
pub use roles::Role;
