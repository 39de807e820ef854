//! Registration and login.

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskboard_auth::Role;
use taskboard_core::UserId;
use taskboard_storage::UserRecord;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::User
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if body.name.trim().is_empty() || body.email.trim().is_empty() {
        return Err(ApiError::BadRequest("Name and email are required"));
    }

    if state.users.find_by_email(&body.email).await?.is_some() {
        return Err(ApiError::BadRequest("Email already registered"));
    }

    let hashed_password = bcrypt::hash(&body.password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::Internal(format!("password hash: {e}")))?;

    let now = Utc::now();
    let user = UserRecord {
        id: UserId::new(),
        name: body.name,
        email: body.email,
        role: body.role,
        hashed_password,
        created_at: now,
        updated_at: now,
    };

    state.users.insert(user.clone()).await?;
    tracing::info!(user_id = %user.id, "user registered");

    Ok(Json(user.into()))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user_id: UserId,
    pub name: String,
    pub role: Role,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Some(user) = state.users.find_by_email(&body.email).await? else {
        return Err(ApiError::Unauthorized("Incorrect email"));
    };

    let password_ok = bcrypt::verify(&body.password, &user.hashed_password)
        .map_err(|e| ApiError::Internal(format!("password verify: {e}")))?;
    if !password_ok {
        return Err(ApiError::Unauthorized("Incorrect password"));
    }

    let access_token = state
        .tokens
        .issue(user.id, user.role, Utc::now(), state.token_ttl)
        .map_err(|e| ApiError::Internal(format!("token issue: {e}")))?;

    tracing::info!(user_id = %user.id, "login succeeded");

    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer",
        user_id: user.id,
        name: user.name,
        role: user.role,
    }))
}
