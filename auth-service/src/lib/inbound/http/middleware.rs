use auth::AccessDecision;
use auth::DenialReason;
use auth::SessionToken;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::http::HeaderName;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum_extra::headers::authorization::Basic;
use axum_extra::headers::Authorization;
use axum_extra::headers::HeaderMapExt;

use crate::domain::identity::errors::GatewayError;
use crate::domain::identity::models::Identity;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Extension type carrying the caller's identity and session into handlers.
#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    pub identity: Option<Identity>,
    pub token: Option<SessionToken>,
}

/// Security filter applied to every request.
///
/// Establishes the caller from HTTP Basic credentials (opening a new session)
/// or from the session token header, then asks the gateway whether the
/// request may proceed. A session opened here is returned to the client in
/// the token header.
pub async fn security_filter(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let (context, issued) = match establish_caller(&state, req.headers()).await {
        Ok(caller) => caller,
        Err(e) => return challenge(&state, e.into_response()),
    };

    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();

    let denial = match state
        .gateway
        .authorize(&method, &path, context.identity.as_ref())
    {
        AccessDecision::Granted => None,
        AccessDecision::Denied(DenialReason::Unauthenticated) => {
            Some(GatewayError::Unauthenticated)
        }
        AccessDecision::Denied(DenialReason::Forbidden) => {
            tracing::warn!(
                %method,
                %path,
                caller = context.identity.as_ref().map(|i| i.username.as_str()),
                "Forbidden"
            );
            Some(GatewayError::Forbidden)
        }
    };

    if let Some(error) = denial {
        // A session opened by this request is never handed out on denial
        if let Err(e) = state.gateway.logout(issued.as_ref()).await {
            tracing::error!(error = %e, "Failed to close session of denied request");
        }
        return challenge(&state, ApiError::from(error).into_response());
    }

    req.extensions_mut().insert(context);
    let mut response = next.run(req).await;

    if let Some(token) = issued {
        if !response.headers().contains_key(&state.token_header) {
            if let Ok(value) = HeaderValue::from_str(token.as_str()) {
                response.headers_mut().insert(state.token_header.clone(), value);
            }
        }
    }

    challenge(&state, response)
}

/// Resolve the caller from request headers.
///
/// # Returns
/// The security context and, when Basic credentials opened a session, its token
async fn establish_caller(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(SecurityContext, Option<SessionToken>), ApiError> {
    if has_basic_scheme(headers) {
        let Some(credentials) = headers.typed_get::<Authorization<Basic>>() else {
            tracing::warn!("Malformed Basic credentials");
            return Err(ApiError::from(GatewayError::AuthenticationFailed));
        };

        let (token, identity) = state
            .gateway
            .login(credentials.username(), credentials.password())
            .await?;

        let context = SecurityContext {
            identity: Some(identity),
            token: Some(token.clone()),
        };
        return Ok((context, Some(token)));
    }

    let Some(token) = presented_token(&state.token_header, headers) else {
        return Ok((SecurityContext::default(), None));
    };

    let identity = state.gateway.resolve_session(&token).await?;
    if identity.is_none() {
        tracing::debug!("Presented session token is not live");
    }

    let context = SecurityContext {
        identity,
        token: Some(token),
    };
    Ok((context, None))
}

fn has_basic_scheme(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.get(..6))
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("basic "))
}

fn presented_token(token_header: &HeaderName, headers: &HeaderMap) -> Option<SessionToken> {
    headers
        .get(token_header)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(SessionToken::new)
}

/// Attach the Basic challenge to 401 responses that lack one.
fn challenge(state: &AppState, mut response: Response) -> Response {
    if response.status() == StatusCode::UNAUTHORIZED
        && !response.headers().contains_key(header::WWW_AUTHENTICATE)
    {
        if let Ok(value) = HeaderValue::from_str(&format!("Basic realm=\"{}\"", state.realm)) {
            response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
        }
    }
    response
}
