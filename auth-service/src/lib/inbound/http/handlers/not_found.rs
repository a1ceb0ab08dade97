use axum::http::Uri;

use crate::inbound::http::handlers::ApiError;

/// Fallback for paths the policy allowed but no route serves.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No resource at {}", uri.path()))
}
