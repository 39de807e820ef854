use std::sync::Arc;

use chrono::Duration;
use taskboard_auth::{Authenticator, AuthorizationEngine, Hs256TokenVerifier};
use taskboard_storage::{Database, ProjectStore, TaskStore, UserStore};

/// Shared application state: stores, the auth pipeline, token issuing.
///
/// Everything in here is read-only after startup; requests share it
/// without coordination.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub projects: Arc<dyn ProjectStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub authenticator: Arc<Authenticator>,
    pub engine: AuthorizationEngine,
    pub tokens: Arc<Hs256TokenVerifier>,
    pub token_ttl: Duration,
    /// Present when running against Postgres; used by the health check
    /// and closed by the composition root on shutdown.
    pub db: Option<Database>,
}
