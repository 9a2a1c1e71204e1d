use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::guard::{require_authenticated, require_role};
use super::handlers;
use super::middleware::{auth_middleware, metrics_middleware};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let roles = Arc::clone(state.roles());
    let config_roles = state.config().server.config_roles.clone();

    // API routes
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/whoami", get(handlers::whoami))
        .route("/session", require_authenticated(get(handlers::whoami)))
        .route("/roles/{role}", get(handlers::check_role))
        .route(
            "/config",
            require_role(get(handlers::get_config), roles, config_roles),
        );

    // Outermost first. The gate wraps every route, metrics included.
    let layers = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(layers)
        .with_state(state)
}
