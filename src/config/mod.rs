//! Configuration for dialogate.
//!
//! Settings are resolved once at startup with priority: env var > default.
//! A `.env` file is loaded via dotenvy early in the binary. Components
//! receive their config section explicitly at construction time; nothing
//! reads the environment ad hoc after `Config::resolve` returns.

use std::time::Duration;

use crate::error::ConfigError;

/// Main configuration for the gateway.
#[derive(Debug, Clone)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub agent: AgentConfig,
    pub dispatch: DispatchConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Identity of the conversational agent this gateway fulfills.
///
/// Used to fully qualify context names:
/// `projects/{project}/locations/{location}/agents/{agent_id}/sessions/...`.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub name: String,
    pub project: String,
    pub location: String,
    pub agent_id: String,
    /// Language code applied when a request carries none.
    pub default_language: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "dialogate".to_string(),
            project: "local-project".to_string(),
            location: "global".to_string(),
            agent_id: "default-agent".to_string(),
            default_language: "en".to_string(),
        }
    }
}

/// Dispatcher tuning.
#[derive(Debug, Clone, Default)]
pub struct DispatchConfig {
    /// Optional deadline for a single handler invocation. When it elapses,
    /// the dispatcher contains the timeout like any other handler failure.
    /// `None` (the default) imposes no deadline.
    pub handler_timeout: Option<Duration>,
}

/// Log output configuration.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of the human-readable format.
    pub json: bool,
}

impl Config {
    /// Resolve the full configuration from the environment.
    pub fn resolve() -> Result<Self, ConfigError> {
        Ok(Self {
            gateway: GatewayConfig::resolve()?,
            agent: AgentConfig::resolve()?,
            dispatch: DispatchConfig::resolve()?,
            logging: LoggingConfig::resolve()?,
        })
    }
}

impl GatewayConfig {
    fn resolve() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            host: optional_env("GATEWAY_HOST").unwrap_or(defaults.host),
            port: parse_env("GATEWAY_PORT", defaults.port)?,
        })
    }
}

impl AgentConfig {
    fn resolve() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            name: optional_env("AGENT_NAME").unwrap_or(defaults.name),
            project: optional_env("AGENT_PROJECT").unwrap_or(defaults.project),
            location: optional_env("AGENT_LOCATION").unwrap_or(defaults.location),
            agent_id: optional_env("AGENT_ID").unwrap_or(defaults.agent_id),
            default_language: optional_env("AGENT_DEFAULT_LANGUAGE").unwrap_or(defaults.default_language),
        })
    }
}

impl DispatchConfig {
    fn resolve() -> Result<Self, ConfigError> {
        let handler_timeout = match optional_env("DISPATCH_HANDLER_TIMEOUT_MS") {
            Some(raw) => {
                let millis: u64 = raw.parse().map_err(|e| ConfigError::InvalidValue {
                    key: "DISPATCH_HANDLER_TIMEOUT_MS".to_string(),
                    message: format!("must be a whole number of milliseconds: {e}"),
                })?;
                if millis == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: "DISPATCH_HANDLER_TIMEOUT_MS".to_string(),
                        message: "must be greater than zero (unset the variable to disable)"
                            .to_string(),
                    });
                }
                Some(Duration::from_millis(millis))
            }
            None => None,
        };
        Ok(Self { handler_timeout })
    }
}

impl LoggingConfig {
    fn resolve() -> Result<Self, ConfigError> {
        let json = match optional_env("LOG_FORMAT") {
            Some(raw) => match raw.to_lowercase().as_str() {
                "json" => true,
                "text" | "pretty" => false,
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: "LOG_FORMAT".to_string(),
                        message: format!("expected 'json' or 'text', got '{other}'"),
                    });
                }
            },
            None => false,
        };
        Ok(Self { json })
    }
}

/// Read an env var, treating unset and empty as absent.
fn optional_env(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        Some(raw) => raw.parse().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{e}"),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let agent = AgentConfig::default();
        assert_eq!(agent.default_language, "en");
        assert_eq!(agent.location, "global");

        let gateway = GatewayConfig::default();
        assert_eq!(gateway.port, 8080);

        assert!(DispatchConfig::default().handler_timeout.is_none());
    }

    #[test]
    fn parse_env_falls_back_to_default_when_unset() {
        // Key chosen to not exist in any test environment.
        let port = parse_env("DIALOGATE_TEST_UNSET_PORT", 9090u16).unwrap();
        assert_eq!(port, 9090);
    }
}
