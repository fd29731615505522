//! `tenantgate-session`: the identity-provider boundary.
//!
//! Wraps whatever client runtime talks to the provider behind
//! [`IdentityProvider`] and exposes an owned, injectable [`IdentitySession`]
//! with an explicit lifecycle and a ready signal.

pub mod error;
pub mod id_token;
pub mod login;
pub mod provider;
pub mod session;
pub mod static_provider;
pub mod token;

pub use error::{SessionError, TokenAcquisitionError};
pub use id_token::decode_id_token;
pub use login::{LoginRedirect, ProviderSettings};
pub use provider::IdentityProvider;
pub use session::{IdentitySession, SessionSnapshot, SessionStatus};
pub use static_provider::StaticIdentityProvider;
pub use token::{AccessToken, ScopeSet, TokenRequest};
