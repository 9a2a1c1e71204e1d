//! Testing utilities shared by unit tests and the server's E2E tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use rolegate_core::testing::{fixtures, StaticAuthenticator};
//!
//! let table = fixtures::role_table();
//! let auth = StaticAuthenticator::returning(fixtures::user("u-1", &["admin_role_1"]));
//! ```

mod static_authenticator;

pub use static_authenticator::StaticAuthenticator;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::auth::{AuthRequest, AuthenticationGate, CONFIRMED};
    use crate::config::AccessConfig;
    use crate::identity::{Identity, IdentityAttributes};
    use crate::roles::{RoleMapping, RoleTable};

    /// `admin_role_1`, `admin_role_2` → `admin`; `support_role_1` → `support`.
    pub const STANDARD_ROLES: &str = "admin_role_1:admin,admin_role_2:admin,support_role_1:support";

    pub fn role_mapping() -> RoleMapping {
        RoleMapping::new()
            .with("admin_role_1", "admin")
            .with("admin_role_2", "admin")
            .with("support_role_1", "support")
    }

    pub fn role_table() -> RoleTable {
        RoleTable::from_mapping(&role_mapping())
    }

    /// Access config with the standard role mapping and default header names.
    pub fn access_config(allow_anonymous_access: bool) -> AccessConfig {
        AccessConfig {
            roles: role_mapping(),
            allow_anonymous_access,
            ..AccessConfig::default()
        }
    }

    pub fn gate(allow_anonymous_access: bool) -> AuthenticationGate {
        AuthenticationGate::from_config(&access_config(allow_anonymous_access))
    }

    /// Authenticated identity carrying only a user id.
    pub fn user(user_id: &str, roles: &[&str]) -> Identity {
        let mut attributes = IdentityAttributes::new();
        attributes.insert("user_id", user_id);
        Identity::authenticated(attributes, roles.iter().map(|r| r.to_string()).collect())
    }

    /// Headers a proxy sends for a confirmed caller.
    pub fn confirmed_headers(user_id: &str, roles: &str) -> Vec<(String, String)> {
        vec![
            ("X-Identity-Status".to_string(), CONFIRMED.to_string()),
            ("X-User-Id".to_string(), user_id.to_string()),
            ("X-Roles".to_string(), roles.to_string()),
        ]
    }

    pub fn confirmed_request(user_id: &str, roles: &str) -> AuthRequest {
        AuthRequest::new(confirmed_headers(user_id, roles))
    }

    /// Request the proxy could not confirm.
    pub fn invalid_request() -> AuthRequest {
        AuthRequest::from_pairs([("X-Identity-Status", "Invalid")])
    }
}
