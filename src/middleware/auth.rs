//! Admin authentication middleware

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};

use crate::{AppError, AppState};

/// Middleware: Require the configured admin bearer token
///
/// With no token configured the admin API is closed entirely.
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.config.admin_token.as_deref() else {
        tracing::warn!("Admin route {} called but ADMIN_TOKEN is not set", req.uri().path());
        return Err(AppError::Forbidden);
    };

    let token = extract_bearer_token(&req)?;

    // Compare digests so timing does not depend on the common prefix
    if hash_token(&token) != hash_token(expected) {
        tracing::warn!("Rejected admin token for {}", req.uri().path());
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(req).await)
}

/// Extract bearer token from Authorization header
fn extract_bearer_token(req: &Request) -> Result<String, AppError> {
    let auth_header = req.headers()
        .get(AUTHORIZATION)
        .ok_or(AppError::Unauthorized)?
        .to_str()
        .map_err(|_| AppError::Unauthorized)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized)
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
