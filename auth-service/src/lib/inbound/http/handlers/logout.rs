use axum::extract::State;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Extension;

use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::middleware::SecurityContext;
use crate::inbound::http::router::AppState;

/// Invalidate the caller's session.
///
/// Always answers 204 with an emptied token header, whether or not a live
/// session was attached.
pub async fn logout(
    State(state): State<AppState>,
    Extension(context): Extension<SecurityContext>,
) -> Result<Response, ApiError> {
    let removed = state.gateway.logout(context.token.as_ref()).await?;
    tracing::debug!(removed, "Logout");

    let mut response = StatusCode::NO_CONTENT.into_response();
    response
        .headers_mut()
        .insert(state.token_header.clone(), HeaderValue::from_static(""));

    Ok(response)
}
