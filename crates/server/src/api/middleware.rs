//! Authentication and metrics middleware for API routes.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use logfetch_core::{AuthRequest, Identity};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use crate::metrics::{
    normalize_path, AUTH_FAILURES_TOTAL, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION,
};
use crate::state::AppState;

/// Metrics middleware that tracks HTTP request duration and counts.
///
/// This middleware records:
/// - Request duration (histogram)
/// - Request count (counter)
/// - Requests in flight (gauge)
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    HTTP_REQUESTS_IN_FLIGHT.inc();

    let response = next.run(request).await;

    HTTP_REQUESTS_IN_FLIGHT.dec();

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(duration);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    response
}

/// Authentication middleware that validates requests using the configured authenticator.
///
/// This middleware extracts credentials from request headers and validates them
/// against the authenticator configured in AppState. If authentication fails,
/// it returns a 401 Unauthorized response.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let authenticator = state.authenticator();

    // Skip auth check if using NoneAuthenticator, but still insert anonymous identity
    if authenticator.method_name() == "none" {
        let mut request = request;
        request.extensions_mut().insert(Identity::anonymous());
        return Ok(next.run(request).await);
    }

    // Extract headers into HashMap for AuthRequest
    let headers: HashMap<String, String> = request
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_lowercase(), v.to_string()))
        })
        .collect();

    // Get source IP (default to localhost if not available)
    let source_ip = request
        .extensions()
        .get::<std::net::SocketAddr>()
        .map(|addr| addr.ip())
        .unwrap_or_else(|| std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST));

    let auth_request = AuthRequest { headers, source_ip };

    match authenticator.authenticate(&auth_request).await {
        Ok(identity) => {
            // Authentication successful, insert identity and continue to the handler
            let mut request = request;
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        Err(logfetch_core::AuthError::NotAuthenticated) => {
            // No credentials provided
            AUTH_FAILURES_TOTAL
                .with_label_values(&["not_authenticated"])
                .inc();
            Err(StatusCode::UNAUTHORIZED)
        }
        Err(logfetch_core::AuthError::InvalidCredentials(_)) => {
            // Wrong credentials
            AUTH_FAILURES_TOTAL
                .with_label_values(&["invalid_credentials"])
                .inc();
            Err(StatusCode::UNAUTHORIZED)
        }
        Err(_) => {
            // Other auth errors (config error)
            AUTH_FAILURES_TOTAL
                .with_label_values(&["internal_error"])
                .inc();
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Extractor for authenticated user ID.
///
/// Extracts the user_id from the Identity stored in request extensions.
/// Falls back to "anonymous" if no identity is present (shouldn't happen
/// if auth middleware is properly configured).
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let user_id = parts
            .extensions
            .get::<Identity>()
            .map(|id| id.user_id.clone())
            .unwrap_or_else(|| "anonymous".to_string());
        std::future::ready(Ok(AuthUser(user_id)))
    }
}
