use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use rolegate_core::{Identity, RoleTable, SanitizedConfig};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::middleware::CurrentIdentity;
use crate::metrics::encode_metrics;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// What the server knows about the caller.
#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub anonymous: bool,
    pub user_id: String,
    pub roles: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    /// Every configured role and whether the caller holds it.
    pub memberships: BTreeMap<String, bool>,
}

#[derive(Debug, Serialize)]
pub struct RoleCheckResponse {
    pub role: String,
    /// Whether the role appears in the role table at all.
    pub configured: bool,
    pub granted: bool,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn whoami(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Json<IdentityResponse> {
    Json(IdentityResponse {
        anonymous: identity.is_anonymous(),
        user_id: identity.user_id().to_string(),
        roles: identity.roles().to_vec(),
        attributes: identity
            .attributes()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        memberships: state.roles().memberships(&identity),
    })
}

pub async fn check_role(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(role): Path<String>,
) -> Json<RoleCheckResponse> {
    Json(role_check(&identity, state.roles(), role))
}

/// The role name is client input, so unconfigured roles are answered without the
/// `has_role` warning.
fn role_check(identity: &Identity, roles: &RoleTable, role: String) -> RoleCheckResponse {
    let configured = roles.contains(&role);
    RoleCheckResponse {
        configured,
        granted: configured && identity.has_role(roles, &role),
        role,
    }
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolegate_core::testing::fixtures;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn count_warnings(f: impl FnOnce()) -> usize {
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));
        tracing::subscriber::with_default(subscriber, f);
        warnings.load(Ordering::SeqCst)
    }

    #[test]
    fn test_role_check_configured_role() {
        let roles = fixtures::role_table();
        let identity = fixtures::user("u-1", &["admin_role_1"]);

        let response = role_check(&identity, &roles, "admin".to_string());
        assert!(response.configured);
        assert!(response.granted);

        let response = role_check(&identity, &roles, "support".to_string());
        assert!(response.configured);
        assert!(!response.granted);
    }

    #[test]
    fn test_role_check_unknown_role_is_quiet() {
        let roles = fixtures::role_table();
        let identity = fixtures::user("u-1", &["admin_role_1"]);

        let mut response = None;
        let warnings = count_warnings(|| {
            response = Some(role_check(&identity, &roles, "no_such_role".to_string()));
        });

        let response = response.unwrap();
        assert_eq!(response.role, "no_such_role");
        assert!(!response.configured);
        assert!(!response.granted);
        assert_eq!(warnings, 0);

        // The guard path still reports unknown roles
        let warnings = count_warnings(|| {
            assert!(!identity.has_role(&roles, "no_such_role"));
        });
        assert_eq!(warnings, 1);
    }
}
