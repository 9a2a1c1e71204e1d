use rolegate_core::{Authenticator, Config, RoleTable, SanitizedConfig};
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    roles: Arc<RoleTable>,
}

impl AppState {
    pub fn new(config: Config, authenticator: Arc<dyn Authenticator>, roles: RoleTable) -> Self {
        Self {
            config,
            authenticator,
            roles: Arc::new(roles),
        }
    }

    /// Build the role table from `config.access.roles`.
    pub fn from_config(config: Config, authenticator: Arc<dyn Authenticator>) -> Self {
        let roles = RoleTable::from_mapping(&config.access.roles);
        Self::new(config, authenticator, roles)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    /// The role table, shared with route guards.
    pub fn roles(&self) -> &Arc<RoleTable> {
        &self.roles
    }
}
