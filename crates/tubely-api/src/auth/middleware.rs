use crate::auth::jwt::JwtValidator;
use crate::auth::models::CallerContext;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tubely_core::AppError;

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthenticated("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| {
            AppError::Unauthenticated("Invalid authorization header format".to_string())
        })?;

    if token.is_empty() {
        return Err(AppError::Unauthenticated(
            "Empty bearer token".to_string(),
        ));
    }

    Ok(token)
}

pub async fn auth_middleware(
    State(validator): State<Arc<JwtValidator>>,
    mut request: Request,
    next: Next,
) -> Response {
    let user_id = match bearer_token(request.headers())
        .and_then(|token| validator.validate_token(token))
    {
        Ok(user_id) => user_id,
        Err(e) => return HttpAppError(e).into_response(),
    };

    tracing::debug!(user_id = %user_id, "Authenticated request");
    request.extensions_mut().insert(CallerContext { user_id });
    next.run(request).await
}
