use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

use crate::roles::{RoleMatch, RoleTable};

/// Attributes every anonymous identity exposes, all set to `""`.
///
/// These are the names the authenticating proxy injects for a confirmed identity, so calling
/// code can read `user_id`, `project_id`, ... without first checking which variant it holds.
pub const ANONYMOUS_ATTRIBUTES: &[&str] = &[
    "auth_token",
    "service_token",
    "domain_id",
    "service_domain_id",
    "domain_name",
    "service_domain_name",
    "project_id",
    "service_project_id",
    "project_name",
    "service_project_name",
    "project_domain_id",
    "service_project_domain_id",
    "project_domain_name",
    "service_project_domain_name",
    "user_id",
    "service_user_id",
    "user_name",
    "service_user_name",
    "user_domain_id",
    "service_user_domain_id",
    "user_domain_name",
    "service_user_domain_name",
    "service_roles",
    "is_admin_project",
    "service_catalog",
    "tenant_id",
    "tenant_name",
    "tenant",
    "user",
    "role",
];

/// Identity attributes keyed by normalized header name (`X-Project-Id` → `project_id`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IdentityAttributes(BTreeMap<String, String>);

impl IdentityAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later values replace earlier ones for the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn anonymous() -> Self {
        Self(
            ANONYMOUS_ATTRIBUTES
                .iter()
                .map(|name| (name.to_string(), String::new()))
                .collect(),
        )
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for IdentityAttributes {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// The caller of one request.
///
/// Built once per request by the authentication gate and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identity {
    Authenticated {
        attributes: IdentityAttributes,
        /// Upstream roles in header order.
        roles: Vec<String>,
    },
    Anonymous {
        attributes: IdentityAttributes,
    },
}

impl Identity {
    pub fn authenticated(attributes: IdentityAttributes, roles: Vec<String>) -> Self {
        Self::Authenticated { attributes, roles }
    }

    /// The canonical anonymous identity. Its shape never depends on a request.
    pub fn anonymous() -> Self {
        Self::Anonymous {
            attributes: IdentityAttributes::anonymous(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous { .. })
    }

    pub fn roles(&self) -> &[String] {
        match self {
            Self::Authenticated { roles, .. } => roles,
            Self::Anonymous { .. } => &[],
        }
    }

    pub fn attributes(&self) -> &IdentityAttributes {
        match self {
            Self::Authenticated { attributes, .. } | Self::Anonymous { attributes } => attributes,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes().get(name)
    }

    /// The `user_id` attribute, or `""` when the proxy did not send one.
    pub fn user_id(&self) -> &str {
        self.attribute("user_id").unwrap_or_default()
    }

    /// Whether this identity holds `configured_role` according to `table`.
    ///
    /// Anonymous identities hold no roles. A role missing from the table is a
    /// policy-configuration miss: it is logged and answered with `false`.
    pub fn has_role(&self, table: &RoleTable, configured_role: &str) -> bool {
        let Self::Authenticated { roles, .. } = self else {
            return false;
        };

        match table.check(configured_role, roles.as_slice()) {
            RoleMatch::Granted => true,
            RoleMatch::Missing => false,
            RoleMatch::Unknown => {
                warn!(
                    role = configured_role,
                    user_id = self.user_id(),
                    "Evaluating has_role: configured role does not exist"
                );
                false
            }
        }
    }
}
