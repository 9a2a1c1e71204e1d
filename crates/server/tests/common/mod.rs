//! Common test utilities for E2E testing.
//!
//! This module provides a test fixture that builds the full router in-process
//! (gate, guards, metrics) from a configuration, so requests can be driven
//! without binding a socket.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderValue, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use rolegate_core::{create_authenticator, AccessConfig, Config, RoleMapping, ServerConfig};

/// Re-export fixtures for test convenience
pub use rolegate_core::testing::fixtures;

/// Test fixture for E2E testing.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_whoami() {
///     let fixture = TestFixture::new();
///
///     let response = fixture
///         .get_as("/api/v1/whoami", &fixtures::confirmed_headers("u-1", "admin_role_1"))
///         .await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

/// Fixture options.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub roles: RoleMapping,
    pub allow_anonymous_access: bool,
    pub config_roles: Vec<String>,
    pub trusted_header_prefix: String,
    pub identity_status_header: String,
    pub roles_header: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            roles: fixtures::role_mapping(),
            allow_anonymous_access: false,
            config_roles: vec!["admin".to_string()],
            trusted_header_prefix: "X-".to_string(),
            identity_status_header: "X-Identity-Status".to_string(),
            roles_header: "X-Roles".to_string(),
        }
    }
}

impl TestFixture {
    /// Standard role table, anonymous access disabled.
    pub fn new() -> Self {
        Self::with_config(TestConfig::default())
    }

    /// Standard role table, anonymous access enabled.
    pub fn anonymous() -> Self {
        Self::with_config(TestConfig {
            allow_anonymous_access: true,
            ..TestConfig::default()
        })
    }

    pub fn with_config(test_config: TestConfig) -> Self {
        let config = Config {
            access: AccessConfig {
                roles: test_config.roles,
                allow_anonymous_access: test_config.allow_anonymous_access,
                trusted_header_prefix: test_config.trusted_header_prefix,
                identity_status_header: test_config.identity_status_header,
                roles_header: test_config.roles_header,
            },
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
                config_roles: test_config.config_roles,
            },
        };

        let authenticator = create_authenticator(&config.access)
            .expect("Failed to create authenticator");
        let state = Arc::new(rolegate_server::state::AppState::from_config(
            config,
            Arc::from(authenticator),
        ));

        Self {
            router: rolegate_server::api::create_router(state),
        }
    }

    /// Send a GET request without identity headers.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.get_as(path, &[]).await
    }

    /// Send a GET request carrying the given headers. Values go on the wire as raw UTF-8.
    pub async fn get_as(&self, path: &str, headers: &[(String, String)]) -> TestResponse {
        let mut request_builder = Request::builder().method("GET").uri(path);
        for (name, value) in headers {
            let value = HeaderValue::from_bytes(value.as_bytes()).expect("Invalid header value");
            request_builder = request_builder.header(name.as_str(), value);
        }
        let request = request_builder
            .body(Body::empty())
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Headers of a confirmed caller.
pub fn confirmed(user_id: &str, roles: &str) -> Vec<(String, String)> {
    fixtures::confirmed_headers(user_id, roles)
}

/// Headers of a caller the proxy could not confirm.
pub fn unconfirmed(user_id: &str) -> Vec<(String, String)> {
    vec![
        ("X-Identity-Status".to_string(), "Invalid".to_string()),
        ("X-User-Id".to_string(), user_id.to_string()),
    ]
}
