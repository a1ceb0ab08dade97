use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::HeaderName;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::current_session;
use super::handlers::logout;
use super::handlers::not_found;
use super::handlers::user_exists;
use super::middleware::security_filter;
use crate::domain::identity::ports::GatewayServicePort;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn GatewayServicePort>,
    /// Header carrying the session token in both directions.
    pub token_header: HeaderName,
    pub realm: Arc<str>,
}

pub fn create_router(
    gateway: Arc<dyn GatewayServicePort>,
    token_header: HeaderName,
    realm: &str,
) -> Router {
    let state = AppState {
        gateway,
        token_header,
        realm: Arc::from(realm),
    };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    // The filter is layered over the fallback too, so unrouted paths are
    // authorized before they can answer 404.
    Router::new()
        .route("/session", get(current_session).delete(logout))
        .route("/users/exists", get(user_exists))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_filter,
        ))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
