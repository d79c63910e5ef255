//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub agent: AgentSettings,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-request timeout applied by the router
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Agent persona and engine tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Name the agent introduces itself with
    #[serde(default = "default_agent_name")]
    pub agent_name: String,

    /// Company the agent speaks for
    #[serde(default = "default_company_name")]
    pub company_name: String,

    /// How many times a state may re-ask for missing data before the flow
    /// moves on anyway
    #[serde(default = "default_max_clarifications")]
    pub max_clarifications: u32,
}

fn default_agent_name() -> String {
    "Sarah".to_string()
}

fn default_company_name() -> String {
    "Afterhours".to_string()
}

fn default_max_clarifications() -> u32 {
    2
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            agent_name: default_agent_name(),
            company_name: default_company_name(),
            max_clarifications: default_max_clarifications(),
        }
    }
}

impl AgentSettings {
    /// How the agent introduces itself, e.g. "Sarah from Afterhours".
    pub fn persona(&self) -> String {
        format!("{} from {}", self.agent_name, self.company_name)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings before the server starts taking calls.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.max_clarifications == 0 {
            return Err(ConfigError::InvalidValue {
                field: "agent.max_clarifications".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.agent.max_clarifications > 10 {
            return Err(ConfigError::InvalidValue {
                field: "agent.max_clarifications".to_string(),
                message: format!("{} is unreasonably high (maximum 10)", self.agent.max_clarifications),
            });
        }

        if self.agent.agent_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "agent.agent_name".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.request_timeout_secs".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

/// Load settings from files and environment.
///
/// Priority: env vars > `config/{env}.yaml` > `config/default.yaml` > defaults.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder().add_source(File::with_name("config/default").required(false));

    if let Some(env) = env {
        builder = builder.add_source(File::with_name(&format!("config/{env}")).required(false));
    }

    let settings: Settings = builder
        .add_source(
            Environment::with_prefix("AFTERHOURS")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.agent.max_clarifications, 2);
        assert_eq!(settings.agent.persona(), "Sarah from Afterhours");
        assert_eq!(settings.environment, RuntimeEnvironment::Development);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_clarifications() {
        let mut settings = Settings::default();
        settings.agent.max_clarifications = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_agent_name() {
        let mut settings = Settings::default();
        settings.agent.agent_name = "  ".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"agent": {"agent_name": "Maya"}}"#).unwrap();
        assert_eq!(settings.agent.agent_name, "Maya");
        assert_eq!(settings.agent.company_name, "Afterhours");
        assert_eq!(settings.server.port, 8080);
    }
}
