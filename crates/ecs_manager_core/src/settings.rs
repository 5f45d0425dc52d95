use std::time::Duration;

pub const DEFAULT_WAIT_DELAY: Duration = Duration::from_secs(15);
pub const DEFAULT_WAIT_MAX_ATTEMPTS: u32 = 40;
pub const DEFAULT_STARTED_BY: &str = "lambda";
pub const DEFAULT_SECRET_TAG_KEY: &str = "ENV_VAR_NAME";
pub const LOG_STREAM_PREFIX: &str = "lambda";

/// Poll policy for waiting on a task to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub delay: Duration,
    pub max_attempts: u32,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_WAIT_DELAY,
            max_attempts: DEFAULT_WAIT_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerSettings {
    pub wait: WaitPolicy,
    pub started_by: String,
    pub secret_tag_key: String,
    /// Family for task definitions registered by run-task; the service's
    /// own family is reused when unset.
    pub runtask_family: Option<String>,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            wait: WaitPolicy::default(),
            started_by: DEFAULT_STARTED_BY.to_string(),
            secret_tag_key: DEFAULT_SECRET_TAG_KEY.to_string(),
            runtask_family: None,
        }
    }
}
