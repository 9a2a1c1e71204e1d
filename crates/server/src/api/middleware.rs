//! Authentication and metrics middleware for API routes.

use axum::{
    body::Body,
    extract::{FromRequestParts, MatchedPath, State},
    http::{request::Parts, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use rolegate_core::{AuthError, AuthRequest, Identity};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::error;

use super::error::ApiError;
use crate::metrics::{
    ANONYMOUS_REQUESTS_TOTAL, AUTH_FAILURES_TOTAL, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION, UNMATCHED_PATH,
};
use crate::state::AppState;

/// Metrics middleware that tracks HTTP request duration and counts.
///
/// This middleware records:
/// - Request duration (histogram)
/// - Request count (counter)
/// - Requests in flight (gauge)
///
/// Requests are labelled with their route template, never the raw URI.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = path_label(&request);

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

/// `/api/v1/roles/{role}` for a matched route, [`UNMATCHED_PATH`] otherwise.
pub fn path_label(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_PATH.to_string())
}

/// `x-user-id` → `X-User-Id`.
pub fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("-")
}

/// Canonical header name, except that a leading `prefix` (matched ignoring case) keeps the
/// configured spelling: with `X-OpenStack-`, `x-openstack-user-id` → `X-OpenStack-User-Id`.
pub fn trusted_header_name(name: &str, prefix: &str) -> String {
    match name.get(..prefix.len()) {
        Some(head) if !prefix.is_empty() && head.eq_ignore_ascii_case(prefix) => {
            format!("{}{}", prefix, canonical_header_name(&name[prefix.len()..]))
        }
        _ => canonical_header_name(name),
    }
}

/// Present request headers to the core in canonical form, keeping their order.
///
/// Values that are not valid UTF-8 are skipped.
pub fn auth_request_from_headers(headers: &HeaderMap, trusted_prefix: &str) -> AuthRequest {
    AuthRequest::new(
        headers
            .iter()
            .filter_map(|(name, value)| {
                std::str::from_utf8(value.as_bytes()).ok().map(|v| {
                    (
                        trusted_header_name(name.as_str(), trusted_prefix),
                        v.to_string(),
                    )
                })
            })
            .collect(),
    )
}

/// Authentication middleware that publishes the caller's identity.
///
/// Runs the configured authenticator over the request headers and inserts the resulting
/// [`Identity`] into the request extensions. A rejected request never reaches the handler.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_request = auth_request_from_headers(
        request.headers(),
        &state.config().access.trusted_header_prefix,
    );

    match state.authenticator().authenticate(&auth_request) {
        Ok(identity) => {
            if identity.is_anonymous() {
                ANONYMOUS_REQUESTS_TOTAL.inc();
            }
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        Err(AuthError::NotAuthenticated) => {
            AUTH_FAILURES_TOTAL
                .with_label_values(&["not_authenticated"])
                .inc();
            Err(AuthError::NotAuthenticated.into())
        }
        Err(AuthError::Forbidden) => {
            AUTH_FAILURES_TOTAL.with_label_values(&["forbidden"]).inc();
            Err(AuthError::Forbidden.into())
        }
        Err(err) => {
            error!(error = %err, "Authenticator failed");
            AUTH_FAILURES_TOTAL.with_label_values(&["internal_error"]).inc();
            Err(err.into())
        }
    }
}

/// Extractor for the identity published by [`auth_middleware`].
///
/// Fails with a 500 when no identity was published, which means the route is not behind
/// the authentication gate.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

impl CurrentIdentity {
    pub(crate) fn from_parts(parts: &Parts) -> Result<Self, ApiError> {
        match parts.extensions.get::<Identity>() {
            Some(identity) => Ok(CurrentIdentity(identity.clone())),
            None => {
                error!(
                    path = %parts.uri.path(),
                    "Identity accessed outside of an authenticated request"
                );
                Err(ApiError::internal("no identity published for request"))
            }
        }
    }
}

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        std::future::ready(Self::from_parts(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{HeaderValue, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use http_body_util::BodyExt;
    use rolegate_core::testing::{fixtures, StaticAuthenticator};
    use rolegate_core::Config;
    use serde_json::Value;
    use tokio_test::assert_ok;
    use tower::ServiceExt;

    async fn identity_handler(CurrentIdentity(identity): CurrentIdentity) -> String {
        format!("{}|{}", identity.user_id(), identity.roles().join(","))
    }

    fn create_test_state(allow_anonymous_access: bool) -> Arc<AppState> {
        let config = Config {
            access: fixtures::access_config(allow_anonymous_access),
            server: Default::default(),
        };
        let authenticator = Arc::new(fixtures::gate(allow_anonymous_access));
        Arc::new(AppState::from_config(config, authenticator))
    }

    fn app(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/test", get(identity_handler))
            .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state)
    }

    async fn body_string(response: Response) -> String {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[test]
    fn test_canonical_header_name() {
        assert_eq!(canonical_header_name("x-user-id"), "X-User-Id");
        assert_eq!(canonical_header_name("x-identity-status"), "X-Identity-Status");
        assert_eq!(canonical_header_name("X-ROLES"), "X-Roles");
        assert_eq!(canonical_header_name("accept"), "Accept");
        assert_eq!(canonical_header_name("x-"), "X-");
    }

    #[test]
    fn test_trusted_header_name_keeps_configured_prefix() {
        assert_eq!(
            trusted_header_name("x-openstack-user-id", "X-OpenStack-"),
            "X-OpenStack-User-Id"
        );
        assert_eq!(trusted_header_name("X-SSL-CLIENT-DN", "X-SSL-"), "X-SSL-Client-Dn");
        assert_eq!(trusted_header_name("x-user-id", "x-"), "x-User-Id");
        assert_eq!(trusted_header_name("x-user-id", "X-"), "X-User-Id");
        assert_eq!(trusted_header_name("accept", "X-OpenStack-"), "Accept");
        assert_eq!(trusted_header_name("x-user-id", ""), "X-User-Id");
    }

    #[test]
    fn test_auth_request_keeps_utf8_values() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("u-1"));
        headers.insert("x-user-name", HeaderValue::from_bytes("José".as_bytes()).unwrap());

        let request = auth_request_from_headers(&headers, "X-");

        assert_eq!(
            request.headers,
            vec![
                ("X-User-Id".to_string(), "u-1".to_string()),
                ("X-User-Name".to_string(), "José".to_string()),
            ]
        );
    }

    #[test]
    fn test_auth_request_skips_invalid_utf8() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("u-1"));
        headers.insert("x-project-name", HeaderValue::from_bytes(b"caf\xe9").unwrap());

        let request = auth_request_from_headers(&headers, "X-");

        assert_eq!(request.headers, vec![("X-User-Id".to_string(), "u-1".to_string())]);
    }

    #[tokio::test]
    async fn test_metrics_label_uses_route_template() {
        let app: Router = Router::new()
            .route("/labelled/{id}", get(|| async { "OK" }))
            .layer(middleware::from_fn(metrics_middleware));

        for uri in ["/labelled/zq-4411", "/labelled/zq-4412", "/zq-unrouted-4413"] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            assert_ok!(app.clone().oneshot(request).await);
        }

        let output = crate::metrics::encode_metrics();
        assert!(output.contains("path=\"/labelled/{id}\""));
        assert!(output.contains("path=\"unmatched\""));
        assert!(!output.contains("zq-"));
    }

    #[tokio::test]
    async fn test_confirmed_request_publishes_identity() {
        let request = Request::builder()
            .uri("/test")
            .header("x-identity-status", "Confirmed")
            .header("x-user-id", "u-1")
            .header("x-roles", "admin_role_1,support_role_1")
            .body(Body::empty())
            .unwrap();

        let response = app(create_test_state(false)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "u-1|admin_role_1,support_role_1");
    }

    #[tokio::test]
    async fn test_missing_status_is_rejected() {
        let request = Request::builder()
            .uri("/test")
            .header("x-user-id", "u-1")
            .body(Body::empty())
            .unwrap();

        let response = app(create_test_state(false)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["code"], 401);
        assert_eq!(body["title"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_anonymous_fallback() {
        let request = Request::builder()
            .uri("/test")
            .header("x-identity-status", "Invalid")
            .header("x-user-id", "u-1")
            .body(Body::empty())
            .unwrap();

        let response = app(create_test_state(true)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "|");
    }

    #[tokio::test]
    async fn test_identity_without_gate_is_internal_error() {
        let app: Router = Router::new().route("/test", get(identity_handler));

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["code"], 500);
    }

    #[tokio::test]
    async fn test_authenticator_configuration_error_is_internal() {
        struct BrokenAuthenticator;

        impl rolegate_core::Authenticator for BrokenAuthenticator {
            fn authenticate(&self, _request: &AuthRequest) -> Result<Identity, AuthError> {
                Err(AuthError::ConfigurationError("broken".to_string()))
            }

            fn method_name(&self) -> &'static str {
                "broken"
            }
        }

        let config = Config {
            access: fixtures::access_config(false),
            server: Default::default(),
        };
        let state = Arc::new(AppState::from_config(config, Arc::new(BrokenAuthenticator)));

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_static_authenticator_is_consulted_once_per_request() {
        let config = Config {
            access: fixtures::access_config(false),
            server: Default::default(),
        };
        let authenticator = Arc::new(StaticAuthenticator::returning(fixtures::user(
            "u-9",
            &["support_role_1"],
        )));
        let state = Arc::new(AppState::from_config(config, authenticator.clone()));
        let app = app(state);

        for _ in 0..3 {
            let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(body_string(response).await, "u-9|support_role_1");
        }
        assert_eq!(authenticator.calls(), 3);
    }
}
