//! Authorization decisions over a published identity.

use std::fmt;

use super::rejection::Rejection;
use crate::identity::Identity;
use crate::roles::RoleTable;

/// Configured roles a route requires. Holding any one of them is enough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRequirement {
    Role(String),
    AnyOf(Vec<String>),
}

impl RoleRequirement {
    pub fn roles(&self) -> &[String] {
        match self {
            Self::Role(role) => std::slice::from_ref(role),
            Self::AnyOf(roles) => roles,
        }
    }

    /// An empty `AnyOf` names no role at all and can never be satisfied.
    pub fn is_well_formed(&self) -> bool {
        !self.roles().is_empty()
    }
}

impl fmt::Display for RoleRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Role(role) => f.write_str(role),
            Self::AnyOf(roles) => write!(f, "[{}]", roles.join(", ")),
        }
    }
}

impl From<&str> for RoleRequirement {
    fn from(role: &str) -> Self {
        Self::Role(role.to_string())
    }
}

impl From<String> for RoleRequirement {
    fn from(role: String) -> Self {
        Self::Role(role)
    }
}

impl From<Vec<String>> for RoleRequirement {
    fn from(roles: Vec<String>) -> Self {
        Self::AnyOf(roles)
    }
}

impl From<Vec<&str>> for RoleRequirement {
    fn from(roles: Vec<&str>) -> Self {
        Self::AnyOf(roles.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for RoleRequirement {
    fn from(roles: &[&str]) -> Self {
        Self::AnyOf(roles.iter().map(|r| r.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for RoleRequirement {
    fn from(roles: [&str; N]) -> Self {
        Self::AnyOf(roles.iter().map(|r| r.to_string()).collect())
    }
}

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RejectUnauthenticated,
    RejectForbidden,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }

    pub fn rejection(self) -> Option<Rejection> {
        match self {
            Decision::Allow => None,
            Decision::RejectUnauthenticated => Some(Rejection::Unauthenticated),
            Decision::RejectForbidden => Some(Rejection::Forbidden),
        }
    }
}

/// `RequireRole`: allow if `identity` holds any role of `requirement`.
///
/// Roles are tried in order and the first match wins. A malformed requirement or a role
/// missing from `table` is forbidden, never an error.
pub fn authorize(identity: &Identity, requirement: &RoleRequirement, table: &RoleTable) -> Decision {
    if requirement
        .roles()
        .iter()
        .any(|role| identity.has_role(table, role))
    {
        Decision::Allow
    } else {
        Decision::RejectForbidden
    }
}

/// `RequireAuthenticated`: allow any non-anonymous identity, whatever its roles.
pub fn require_authenticated(identity: &Identity) -> Decision {
    if identity.is_anonymous() {
        Decision::RejectUnauthenticated
    } else {
        Decision::Allow
    }
}
