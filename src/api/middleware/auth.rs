//! Identity token authentication middleware.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::config::BEARER_TOKEN_PREFIX;
use crate::errors::AppError;

/// Identity authentication middleware.
///
/// Extracts and verifies the bearer token from the Authorization header,
/// then injects the [`AuthenticatedCaller`](crate::domain::AuthenticatedCaller)
/// into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
        .ok_or(AppError::Unauthenticated)?;

    let caller = state.services.identity().verify(token)?;
    tracing::debug!(subject = %caller.subject, "caller authenticated");

    request.extensions_mut().insert(caller);

    Ok(next.run(request).await)
}
