//! `taskboard-auth` — authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage. Token
//! verification and the policy decision table are pure; the async pieces
//! (`Authenticator`, `AuthorizationEngine`) compose them over injected
//! lookup traits, so callers decide where users/projects/tasks live.

pub mod bearer;
pub mod claims;
pub mod directory;
pub mod engine;
pub mod error;
pub mod ownership;
pub mod policy;
pub mod principal;
pub mod roles;

pub use bearer::{Authenticator, parse_bearer};
pub use claims::{Hs256TokenVerifier, TokenClaims, TokenVerifier};
pub use directory::{DirectoryError, ProjectDirectory, TaskDirectory, TaskLink, UserDirectory};
pub use engine::{AuthorizationEngine, ResourceRef};
pub use error::AuthError;
pub use ownership::{OwnerFields, OwnerRef, resolve_owner};
pub use policy::{Action, Decision, ProjectSnapshot, TaskSnapshot, authorize_project, authorize_task};
pub use principal::Principal;
pub use roles::Role;
