use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{error::ApiError, AppState};
use crate::identity::identity_cookie;

/// Resolves the caller's identity and adds its `UserId` to the request
/// extensions. A freshly minted cookie token is sent back on the response.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let resolved = match state.identity.resolve(request.headers()) {
        Ok(resolved) => resolved,
        Err(e) => return ApiError::from(e).into_response(),
    };

    request.extensions_mut().insert(resolved.user_id.clone());
    let mut response = next.run(request).await;

    if let (Some(token), Some(name)) = (resolved.issued, state.identity.cookie_name()) {
        tracing::info!(user = %resolved.user_id, "issued new identity cookie");
        match HeaderValue::from_str(&identity_cookie(name, &token)) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::warn!("could not encode identity cookie: {}", e),
        }
    }

    response
}
