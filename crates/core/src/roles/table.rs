use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use super::RoleMapping;
use crate::identity::Identity;

/// Result of checking one configured role against a set of upstream roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleMatch {
    /// At least one mapped upstream role is present.
    Granted,
    /// The configured role exists but none of its upstream roles are present.
    Missing,
    /// The configured role is not in the table (policy-configuration miss).
    Unknown,
}

/// Configured role → set of upstream roles that satisfy it.
///
/// Built once from configuration and shared read-only (behind an `Arc`) by every request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleTable {
    roles: BTreeMap<String, BTreeSet<String>>,
}

impl RoleTable {
    pub fn build<I, U, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (U, C)>,
        U: Into<String>,
        C: Into<String>,
    {
        let mut roles: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (upstream, configured) in pairs {
            roles
                .entry(configured.into())
                .or_default()
                .insert(upstream.into());
        }

        let table = Self { roles };
        table.warn_on_shared_upstream_roles();
        debug!(roles = ?table.roles, "Role table built");
        table
    }

    pub fn from_mapping(mapping: &RoleMapping) -> Self {
        Self::build(
            mapping
                .pairs()
                .iter()
                .map(|(upstream, configured)| (upstream.as_str(), configured.as_str())),
        )
    }

    /// Check `configured_role` against `upstream_roles`.
    pub fn check<S: AsRef<str>>(&self, configured_role: &str, upstream_roles: &[S]) -> RoleMatch {
        let Some(accepted) = self.roles.get(configured_role) else {
            return RoleMatch::Unknown;
        };

        if upstream_roles
            .iter()
            .any(|role| accepted.contains(role.as_ref()))
        {
            RoleMatch::Granted
        } else {
            RoleMatch::Missing
        }
    }

    /// True iff `configured_role` exists and one of its upstream roles is present.
    pub fn satisfies<S: AsRef<str>>(&self, configured_role: &str, upstream_roles: &[S]) -> bool {
        self.check(configured_role, upstream_roles) == RoleMatch::Granted
    }

    pub fn contains(&self, configured_role: &str) -> bool {
        self.roles.contains_key(configured_role)
    }

    pub fn upstream_roles(&self, configured_role: &str) -> Option<&BTreeSet<String>> {
        self.roles.get(configured_role)
    }

    pub fn configured_roles(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Every configured role with whether `identity` holds it.
    ///
    /// This is the enumerated replacement for per-role `is_<role>()` accessors.
    pub fn memberships(&self, identity: &Identity) -> BTreeMap<String, bool> {
        self.roles
            .keys()
            .map(|role| (role.clone(), identity.has_role(self, role)))
            .collect()
    }

    fn warn_on_shared_upstream_roles(&self) {
        let mut owners: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (configured, upstream_roles) in &self.roles {
            for upstream in upstream_roles {
                owners
                    .entry(upstream.as_str())
                    .or_default()
                    .push(configured.as_str());
            }
        }

        for (upstream, configured) in owners.into_iter().filter(|(_, c)| c.len() > 1) {
            warn!(
                upstream_role = upstream,
                configured_roles = ?configured,
                "Upstream role maps to several configured roles; it satisfies all of them"
            );
        }
    }
}
