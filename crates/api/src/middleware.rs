use axum::extract::State;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticate the request and stash the principal in extensions.
///
/// Runs the full pipeline (scheme parse, token verify, subject check)
/// before any resource-scoped handler sees the request.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(ApiError::Scheme)?;

    let principal = state.authenticator.authenticate(header).await?;

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}
