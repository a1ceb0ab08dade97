use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use crate::domain::identity::models::SessionView;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::middleware::SecurityContext;
use crate::inbound::http::router::AppState;

pub async fn current_session(
    State(state): State<AppState>,
    Extension(context): Extension<SecurityContext>,
) -> Result<ApiSuccess<SessionView>, ApiError> {
    state
        .gateway
        .current_session(context.identity.as_ref())
        .await
        .map_err(ApiError::from)
        .map(|view| ApiSuccess::new(StatusCode::OK, view))
}
