use slipway_core::{Config, DeployOrchestrator, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: DeployOrchestrator,
}

impl AppState {
    pub fn new(config: Config, orchestrator: DeployOrchestrator) -> Self {
        Self {
            config,
            orchestrator,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    /// Shared secret for mutating endpoints, if one is configured.
    pub fn auth_token(&self) -> Option<&str> {
        self.config
            .auth
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
    }

    pub fn orchestrator(&self) -> &DeployOrchestrator {
        &self.orchestrator
    }
}
