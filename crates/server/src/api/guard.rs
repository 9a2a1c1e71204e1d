//! Route guards: role and authentication checks layered onto single routes.
//!
//! ```rust,ignore
//! let route = require_role(get(handler), Arc::clone(state.roles()), ["admin", "support"]);
//! let route = require_authenticated(route);
//! ```
//!
//! Guards stack. The outermost guard runs first, so its rejection is the one the caller sees.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};
use rolegate_core::{
    authorize, require_authenticated as check_authenticated, Decision, RoleRequirement, RoleTable,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::error::ApiError;
use super::middleware::CurrentIdentity;
use crate::metrics::AUTHZ_DENIALS_TOTAL;

#[derive(Clone)]
struct RoleGuard {
    roles: Arc<RoleTable>,
    requirement: Arc<RoleRequirement>,
}

/// Only callers holding one of the configured roles in `requirement` reach `route`.
pub fn require_role<S>(
    route: MethodRouter<S>,
    roles: Arc<RoleTable>,
    requirement: impl Into<RoleRequirement>,
) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    let guard = RoleGuard {
        roles,
        requirement: Arc::new(requirement.into()),
    };
    route.route_layer(middleware::from_fn_with_state(guard, role_guard))
}

/// Only non-anonymous callers reach `route`.
pub fn require_authenticated<S>(route: MethodRouter<S>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(middleware::from_fn(authenticated_guard))
}

async fn role_guard(
    State(guard): State<RoleGuard>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let (parts, body) = request.into_parts();
    let CurrentIdentity(identity) = CurrentIdentity::from_parts(&parts)?;
    let path = parts.uri.path().to_string();

    if !guard.requirement.is_well_formed() {
        error!(path = %path, "Role guard has no roles to check, rejecting");
    }

    match authorize(&identity, &guard.requirement, &guard.roles) {
        Decision::Allow => Ok(next.run(Request::from_parts(parts, body)).await),
        decision => {
            info!(
                user_id = identity.user_id(),
                path = %path,
                required_roles = %guard.requirement,
                "User does not have any of the required roles"
            );
            AUTHZ_DENIALS_TOTAL.with_label_values(&["require_role"]).inc();
            Err(reject(decision))
        }
    }
}

async fn authenticated_guard(request: Request<Body>, next: Next) -> Result<Response, ApiError> {
    let (parts, body) = request.into_parts();
    let CurrentIdentity(identity) = CurrentIdentity::from_parts(&parts)?;

    match check_authenticated(&identity) {
        Decision::Allow => Ok(next.run(Request::from_parts(parts, body)).await),
        decision => {
            warn!(
                user_id = identity.user_id(),
                path = %parts.uri.path(),
                "Anonymous caller rejected from authenticated route"
            );
            AUTHZ_DENIALS_TOTAL
                .with_label_values(&["require_authenticated"])
                .inc();
            Err(reject(decision))
        }
    }
}

fn reject(decision: Decision) -> ApiError {
    match decision.rejection() {
        Some(rejection) => rejection.into(),
        None => ApiError::internal("guard rejected an allowed request"),
    }
}
