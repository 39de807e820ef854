//! Application wiring: stores, auth pipeline, router.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Duration;
use serde_json::json;
use taskboard_auth::{Authenticator, AuthorizationEngine, Hs256TokenVerifier};
use taskboard_storage::{
    Database, InMemoryProjectStore, InMemoryTaskStore, InMemoryUserStore, PostgresProjectStore,
    PostgresTaskStore, PostgresUserStore,
};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::middleware::auth_middleware;
use crate::routes::{auth, projects, tasks, users};
use crate::state::AppState;

/// Wire up state from config: Postgres when `DATABASE_URL` is set,
/// in-memory stores otherwise (dev/test).
pub async fn build_state(config: &ApiConfig) -> anyhow::Result<AppState> {
    let tokens = Arc::new(Hs256TokenVerifier::new(config.jwt_secret.as_bytes()));
    let token_ttl = Duration::minutes(config.token_ttl_minutes);

    match &config.database_url {
        Some(url) => {
            let db = Database::connect(url, config.db_max_connections).await?;
            db.ensure_schema().await?;

            let users = Arc::new(PostgresUserStore::new(db.pool().clone()));
            let projects = Arc::new(PostgresProjectStore::new(db.pool().clone()));
            let tasks = Arc::new(PostgresTaskStore::new(db.pool().clone()));

            Ok(AppState {
                authenticator: Arc::new(Authenticator::new(tokens.clone(), users.clone())),
                engine: AuthorizationEngine::new(projects.clone(), tasks.clone()),
                users,
                projects,
                tasks,
                tokens,
                token_ttl,
                db: Some(db),
            })
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory stores");

            let users = Arc::new(InMemoryUserStore::new());
            let projects = Arc::new(InMemoryProjectStore::new());
            let tasks = Arc::new(InMemoryTaskStore::new());

            Ok(AppState {
                authenticator: Arc::new(Authenticator::new(tokens.clone(), users.clone())),
                engine: AuthorizationEngine::new(projects.clone(), tasks.clone()),
                users,
                projects,
                tasks,
                tokens,
                token_ttl,
                db: None,
            })
        }
    }
}

/// Build the router over prepared state.
///
/// Everything but register/login/health sits behind the auth middleware.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/health", get(health));

    let protected = Router::new()
        .route("/users/me", get(users::me))
        .route("/users", get(users::list_users))
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/projects",
            post(projects::create_project).get(projects::list_projects),
        )
        .route(
            "/projects/:id",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/tasks", post(tasks::create_task).get(tasks::list_tasks))
        .route(
            "/tasks/:id",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    public.merge(protected).with_state(state)
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match &state.db {
        Some(db) => {
            db.healthcheck().await?;
            Ok(Json(json!({ "status": "connected" })))
        }
        None => Ok(Json(json!({ "status": "ok", "storage": "in-memory" }))),
    }
}
