//! Upstream role → configured role mapping as it appears in configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleMappingError {
    #[error("role mapping entry '{0}' is missing a ':' separator")]
    MissingSeparator(String),

    #[error("role mapping entry '{0}' has an empty upstream role")]
    EmptyUpstreamRole(String),

    #[error("role mapping entry '{0}' has an empty configured role")]
    EmptyConfiguredRole(String),
}

/// Ordered list of `(upstream_role, configured_role)` pairs.
///
/// Written in configuration either flattened (`"admin_role_1:admin,support_role_1:support"`)
/// or as a TOML table (`{ admin_role_1 = "admin" }`). The flattened form is the only one
/// an environment variable can carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "RawRoleMapping", into = "RawRoleMapping")]
pub struct RoleMapping {
    pairs: Vec<(String, String)>,
}

impl RoleMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair. Duplicates are kept here and collapse in the role table.
    pub fn with(mut self, upstream_role: &str, configured_role: &str) -> Self {
        self.pairs
            .push((upstream_role.to_string(), configured_role.to_string()));
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}

impl FromStr for RoleMapping {
    type Err = RoleMappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut pairs = Vec::new();

        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (upstream, configured) = entry
                .split_once(':')
                .ok_or_else(|| RoleMappingError::MissingSeparator(entry.to_string()))?;

            let upstream = upstream.trim();
            let configured = configured.trim();

            if upstream.is_empty() {
                return Err(RoleMappingError::EmptyUpstreamRole(entry.to_string()));
            }
            if configured.is_empty() {
                return Err(RoleMappingError::EmptyConfiguredRole(entry.to_string()));
            }

            pairs.push((upstream.to_string(), configured.to_string()));
        }

        Ok(Self { pairs })
    }
}

impl fmt::Display for RoleMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (upstream, configured) in &self.pairs {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", upstream, configured)?;
            first = false;
        }
        Ok(())
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for RoleMapping {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(u, c)| (u.to_string(), c.to_string()))
                .collect(),
        }
    }
}

/// Wire shapes accepted for `access.roles`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
enum RawRoleMapping {
    Flat(String),
    Table(BTreeMap<String, String>),
}

impl TryFrom<RawRoleMapping> for RoleMapping {
    type Error = RoleMappingError;

    fn try_from(raw: RawRoleMapping) -> Result<Self, Self::Error> {
        match raw {
            RawRoleMapping::Flat(s) => s.parse(),
            RawRoleMapping::Table(table) => {
                let mut pairs = Vec::with_capacity(table.len());
                for (upstream, configured) in table {
                    let entry = format!("{}:{}", upstream, configured);
                    let upstream = upstream.trim();
                    let configured = configured.trim();
                    if upstream.is_empty() {
                        return Err(RoleMappingError::EmptyUpstreamRole(entry));
                    }
                    if configured.is_empty() {
                        return Err(RoleMappingError::EmptyConfiguredRole(entry));
                    }
                    pairs.push((upstream.to_string(), configured.to_string()));
                }
                Ok(Self { pairs })
            }
        }
    }
}

impl From<RoleMapping> for RawRoleMapping {
    fn from(mapping: RoleMapping) -> Self {
        RawRoleMapping::Flat(mapping.to_string())
    }
}
