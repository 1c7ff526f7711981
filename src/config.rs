use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// What to do with a reorder that arrives while another is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderConflictPolicy {
    /// Wait for the running reorder to resolve, then apply
    Queue,
    /// Fail fast with `ReorderInProgress`
    Reject,
}

impl FromStr for ReorderConflictPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "queue" => Ok(ReorderConflictPolicy::Queue),
            "reject" => Ok(ReorderConflictPolicy::Reject),
            other => Err(ConfigError::Invalid {
                key: "REORDER_CONFLICT",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Workflow controller settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Upper bound on a single gateway call; elapsed calls are rolled back
    pub gateway_timeout: Duration,
    /// Whether search also looks at member name, position and email
    pub member_search: bool,
    pub reorder_conflict: ReorderConflictPolicy,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            gateway_timeout: Duration::from_millis(5000),
            member_search: true,
            reorder_conflict: ReorderConflictPolicy::Reject,
        }
    }
}

impl WorkflowConfig {
    /// Reads `GATEWAY_TIMEOUT_MS`, `MEMBER_SEARCH` and `REORDER_CONFLICT`
    /// from the process environment, falling back to defaults for unset keys.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("GATEWAY_TIMEOUT_MS") {
            let millis = value.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                key: "GATEWAY_TIMEOUT_MS",
                value: value.clone(),
            })?;
            config.gateway_timeout = Duration::from_millis(millis);
        }

        if let Some(value) = lookup("MEMBER_SEARCH") {
            config.member_search = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "MEMBER_SEARCH",
                        value,
                    })
                }
            };
        }

        if let Some(value) = lookup("REORDER_CONFLICT") {
            config.reorder_conflict = value.parse()?;
        }

        Ok(config)
    }
}
