pub mod error;
pub mod guard;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use error::ApiError;
pub use guard::{require_authenticated, require_role};
pub use middleware::CurrentIdentity;
pub use routes::create_router;
