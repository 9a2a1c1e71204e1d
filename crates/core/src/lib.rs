pub mod auth;
pub mod config;
pub mod identity;
pub mod roles;
pub mod testing;

pub use auth::{
    authorize, create_authenticator, require_authenticated, AuthError, AuthRequest,
    AuthenticationGate, Authenticator, Decision, ErrorBody, Rejection, RoleRequirement,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AccessConfig, Config, ConfigError,
    SanitizedConfig, ServerConfig,
};
pub use identity::{Identity, IdentityAttributes, IdentityFactory};
pub use roles::{RoleMapping, RoleMappingError, RoleTable};
