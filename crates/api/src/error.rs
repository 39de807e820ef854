//! API error model and the HTTP status mapping.
//!
//! Authorization outcomes arrive as values (`Decision`), never as raised
//! faults; this module is the single place where they become statuses:
//! scheme/token failures and policy denials map to 403, missing
//! principals and missing resources map to 404, store failures to 500.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use taskboard_auth::{AuthError, Decision, DirectoryError};
use taskboard_storage::StoreError;

#[derive(Debug)]
pub enum ApiError {
    /// Wrong or missing `Bearer` scheme.
    Scheme,
    /// Malformed, badly signed, or expired token (undifferentiated).
    InvalidToken,
    /// Token verified but its subject no longer exists.
    PrincipalNotFound,
    /// Authenticated, resource exists, policy forbids the action.
    Forbidden(&'static str),
    NotFound(&'static str),
    BadRequest(&'static str),
    Unauthorized(&'static str),
    Internal(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Scheme => ApiError::Scheme,
            AuthError::InvalidToken => ApiError::InvalidToken,
            AuthError::PrincipalNotFound => ApiError::PrincipalNotFound,
            AuthError::Directory(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl ApiError {
    fn status_and_detail(&self) -> (StatusCode, String) {
        match self {
            ApiError::Scheme => (
                StatusCode::FORBIDDEN,
                "Invalid authentication scheme.".to_string(),
            ),
            ApiError::InvalidToken => (
                StatusCode::FORBIDDEN,
                "Invalid token or expired token.".to_string(),
            ),
            ApiError::PrincipalNotFound => {
                (StatusCode::NOT_FOUND, "User not found".to_string())
            }
            ApiError::Forbidden(detail) => (StatusCode::FORBIDDEN, (*detail).to_string()),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, (*detail).to_string()),
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, (*detail).to_string()),
            ApiError::Unauthorized(detail) => (StatusCode::UNAUTHORIZED, (*detail).to_string()),
            ApiError::Internal(detail) => {
                tracing::error!("internal error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = self.status_and_detail();
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Turn a policy decision into flow control for a handler.
///
/// `missing` is the not-found detail for this resource kind.
pub fn ensure_allowed(decision: Decision, missing: &'static str) -> Result<(), ApiError> {
    match decision {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => Err(ApiError::Forbidden(reason)),
        Decision::NotFound => Err(ApiError::NotFound(missing)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::Scheme.status_and_detail().0, StatusCode::FORBIDDEN);
        assert_eq!(ApiError::InvalidToken.status_and_detail().0, StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::PrincipalNotFound.status_and_detail().0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Forbidden("nope").status_and_detail().0,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("gone").status_and_detail().0,
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn deny_and_not_found_stay_distinct() {
        let deny = ensure_allowed(Decision::Deny("not your project"), "Project not found")
            .unwrap_err();
        let missing = ensure_allowed(Decision::NotFound, "Project not found").unwrap_err();

        assert!(matches!(deny, ApiError::Forbidden(_)));
        assert!(matches!(missing, ApiError::NotFound(_)));
    }
}
