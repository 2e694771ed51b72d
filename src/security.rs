// src/security.rs
// Response security headers and the production HTTPS redirect.
use axum::{
    Router,
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::Environment;
use crate::state::AppState;

const DEV_CSP: &str = "default-src 'self'; \
    img-src 'self' data: https:; \
    script-src 'self' 'unsafe-inline'; \
    style-src 'self' 'unsafe-inline'";

const PROD_CSP: &str = "default-src 'self'; \
    img-src 'self' https://images.pexels.com data:; \
    script-src 'self' 'unsafe-inline'; \
    style-src 'self' 'unsafe-inline' https://fonts.googleapis.com; \
    font-src 'self' https://fonts.gstatic.com; \
    connect-src 'self'";

const HSTS: &str = "max-age=31536000; includeSubDomains; preload";

/// Headers sent on every response for the given environment.
pub fn headers_for(env: Environment) -> Vec<(HeaderName, HeaderValue)> {
    let mut headers = vec![
        (
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ),
        (
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ),
        (
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ),
    ];

    match env {
        Environment::Development => {
            headers.push((header::CONTENT_SECURITY_POLICY, HeaderValue::from_static(DEV_CSP)));
            headers.push((header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN")));
        }
        Environment::Production => {
            headers.push((header::CONTENT_SECURITY_POLICY, HeaderValue::from_static(PROD_CSP)));
            headers.push((header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")));
            headers.push((header::STRICT_TRANSPORT_SECURITY, HeaderValue::from_static(HSTS)));
            headers.push((
                HeaderName::from_static("permissions-policy"),
                HeaderValue::from_static("geolocation=()"),
            ));
        }
    }
    headers
}

pub fn apply(mut router: Router<AppState>, env: Environment) -> Router<AppState> {
    for (name, value) in headers_for(env) {
        router = router.layer(SetResponseHeaderLayer::if_not_present(name, value));
    }
    if env == Environment::Production {
        router = router.layer(middleware::from_fn(redirect_to_https));
    }
    router
}

/// Behind a TLS-terminating proxy, bounce plain-HTTP requests to https.
async fn redirect_to_https(req: Request, next: Next) -> Response {
    let plain_http = req
        .headers()
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("http"));

    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match (plain_http, host) {
        (true, Some(host)) => {
            let path = req.uri().path_and_query().map(|p| p.as_str()).unwrap_or("/");
            let target = format!("https://{host}{path}");
            tracing::debug!(%target, "redirecting to https");
            (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, target)]).into_response()
        }
        _ => next.run(req).await,
    }
}
