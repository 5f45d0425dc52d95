//! Process configuration read from the environment at cold start.

use std::time::Duration;

use ecs_manager_core::logging::Level;
use ecs_manager_core::settings::{
    ManagerSettings, WaitPolicy, DEFAULT_SECRET_TAG_KEY, DEFAULT_STARTED_BY,
    DEFAULT_WAIT_DELAY, DEFAULT_WAIT_MAX_ATTEMPTS,
};

pub const LOG_LEVEL_VAR: &str = "MANAGER_LOG_LEVEL";
pub const WAIT_DELAY_VAR: &str = "TASK_WAIT_DELAY_SECONDS";
pub const WAIT_MAX_ATTEMPTS_VAR: &str = "TASK_WAIT_MAX_ATTEMPTS";
pub const STARTED_BY_VAR: &str = "RUNTASK_STARTED_BY";
pub const SECRET_TAG_VAR: &str = "SECRET_ENV_VAR_TAG";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be configured")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings shared by every binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    pub log_level: Level,
    pub settings: ManagerSettings,
}

impl ManagerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let log_level = match lookup(LOG_LEVEL_VAR) {
            Some(value) => parse_value(LOG_LEVEL_VAR, &value)?,
            None => Level::Info,
        };
        let delay = match lookup(WAIT_DELAY_VAR) {
            Some(value) => Duration::from_secs(parse_value(WAIT_DELAY_VAR, &value)?),
            None => DEFAULT_WAIT_DELAY,
        };
        let max_attempts = match lookup(WAIT_MAX_ATTEMPTS_VAR) {
            Some(value) => {
                let attempts: u32 = parse_value(WAIT_MAX_ATTEMPTS_VAR, &value)?;
                if attempts == 0 {
                    return Err(ConfigError::Invalid {
                        name: WAIT_MAX_ATTEMPTS_VAR,
                        value,
                        reason: "must be at least 1".to_string(),
                    });
                }
                attempts
            }
            None => DEFAULT_WAIT_MAX_ATTEMPTS,
        };

        Ok(Self {
            log_level,
            settings: ManagerSettings {
                wait: WaitPolicy {
                    delay,
                    max_attempts,
                },
                started_by: lookup(STARTED_BY_VAR)
                    .unwrap_or_else(|| DEFAULT_STARTED_BY.to_string()),
                secret_tag_key: lookup(SECRET_TAG_VAR)
                    .unwrap_or_else(|| DEFAULT_SECRET_TAG_KEY.to_string()),
                runtask_family: None,
            },
        })
    }
}

/// Fixed target of the single-purpose run-task function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTaskTarget {
    pub cluster: String,
    pub service: String,
    pub container: String,
    pub environment: String,
}

impl RunTaskTarget {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        Ok(Self {
            cluster: required("ECS_CLUSTER")?,
            service: required("ECS_SERVICE")?,
            container: required("ECS_CONTAINER")?,
            environment: required("ENVIRONMENT")?,
        })
    }

    /// Family that overridden task definitions are registered under.
    pub fn family(&self) -> String {
        format!("{}-lambda-{}", self.service, self.environment)
    }
}

fn parse_value<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|error: T::Err| ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ManagerConfig::from_lookup(env(&[])).expect("defaults are valid");

        assert_eq!(config.log_level, Level::Info);
        assert_eq!(config.settings, ManagerSettings::default());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = ManagerConfig::from_lookup(env(&[
            (LOG_LEVEL_VAR, "DEBUG"),
            (WAIT_DELAY_VAR, "2"),
            (WAIT_MAX_ATTEMPTS_VAR, "5"),
            (STARTED_BY_VAR, "deploy-bot"),
            (SECRET_TAG_VAR, "ENV_NAME"),
        ]))
        .expect("valid overrides");

        assert_eq!(config.log_level, Level::Debug);
        assert_eq!(config.settings.wait.delay, Duration::from_secs(2));
        assert_eq!(config.settings.wait.max_attempts, 5);
        assert_eq!(config.settings.started_by, "deploy-bot");
        assert_eq!(config.settings.secret_tag_key, "ENV_NAME");
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let error = ManagerConfig::from_lookup(env(&[(WAIT_DELAY_VAR, "soon")]))
            .expect_err("not a number");

        assert!(matches!(
            error,
            ConfigError::Invalid {
                name: WAIT_DELAY_VAR,
                ..
            }
        ));
    }

    #[test]
    fn zero_attempts_are_rejected() {
        let error = ManagerConfig::from_lookup(env(&[(WAIT_MAX_ATTEMPTS_VAR, "0")]))
            .expect_err("zero attempts");

        assert!(error.to_string().contains("must be at least 1"));
    }

    #[test]
    fn unknown_level_is_rejected() {
        let error = ManagerConfig::from_lookup(env(&[(LOG_LEVEL_VAR, "loud")]))
            .expect_err("unknown level");

        assert!(error.to_string().starts_with(LOG_LEVEL_VAR));
    }

    #[test]
    fn run_task_target_requires_every_variable() {
        let error = RunTaskTarget::from_lookup(env(&[
            ("ECS_CLUSTER", "prod"),
            ("ECS_SERVICE", "web"),
            ("ECS_CONTAINER", "app"),
        ]))
        .expect_err("environment missing");

        assert_eq!(error, ConfigError::Missing("ENVIRONMENT"));
        assert_eq!(error.to_string(), "ENVIRONMENT must be configured");
    }

    #[test]
    fn run_task_family_names_service_and_environment() {
        let target = RunTaskTarget::from_lookup(env(&[
            ("ECS_CLUSTER", "prod"),
            ("ECS_SERVICE", "web"),
            ("ECS_CONTAINER", "app"),
            ("ENVIRONMENT", "staging"),
        ]))
        .expect("complete target");

        assert_eq!(target.family(), "web-lambda-staging");
    }
}
