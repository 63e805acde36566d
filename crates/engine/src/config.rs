//! Prototyper configuration.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the clone engine does about reference cycles in the source graph.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePolicy {
    /// Track the objects on the current clone path and fail with
    /// `PrototypeError::CycleDetected` when one is reached again.
    #[default]
    Reject,
    /// No tracking. Cloning a cyclic graph does not terminate.
    Unchecked,
}

impl CyclePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            CyclePolicy::Reject => "reject",
            CyclePolicy::Unchecked => "unchecked",
        }
    }
}

impl core::fmt::Display for CyclePolicy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown cycle policy '{0}' (expected 'reject' or 'unchecked')")]
    UnknownCyclePolicy(String),
}

impl FromStr for CyclePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(CyclePolicy::Reject),
            "unchecked" => Ok(CyclePolicy::Unchecked),
            other => Err(ConfigError::UnknownCyclePolicy(other.to_string())),
        }
    }
}

/// Prototyper configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrototyperConfig {
    pub cycle_policy: CyclePolicy,
}

impl PrototyperConfig {
    /// Environment variable read by [`PrototyperConfig::from_env`].
    pub const CYCLE_POLICY_ENV: &'static str = "PROTOTYPER_CYCLE_POLICY";

    pub fn with_cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.cycle_policy = policy;
        self
    }

    /// Reads configuration from the process environment.
    ///
    /// Unset variables keep their defaults; unparseable ones are logged and
    /// ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`PrototyperConfig::from_env`] with a caller-supplied lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(Self::CYCLE_POLICY_ENV) {
            match raw.parse::<CyclePolicy>() {
                Ok(policy) => config.cycle_policy = policy,
                Err(err) => tracing::warn!(
                    "{}: {err}; using '{}'",
                    Self::CYCLE_POLICY_ENV,
                    config.cycle_policy
                ),
            }
        }

        config
    }
}
