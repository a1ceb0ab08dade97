use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;

use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserExistsParams {
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserExistsResponse {
    pub exists: bool,
}

pub async fn user_exists(
    State(state): State<AppState>,
    Query(params): Query<UserExistsParams>,
) -> Result<ApiSuccess<UserExistsResponse>, ApiError> {
    state
        .gateway
        .user_exists(params.username, params.email)
        .await
        .map_err(ApiError::from)
        .map(|exists| ApiSuccess::new(StatusCode::OK, UserExistsResponse { exists }))
}
