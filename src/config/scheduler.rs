//! Scheduler configuration.

use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::AppResult;

/// Environment variable overriding [`SchedulerConfig::poll_interval_ms`].
pub const ENV_POLL_INTERVAL_MS: &str = "START_SCHEDULER_POLL_INTERVAL_MS";
/// Environment variable overriding [`SchedulerConfig::cooldown_ms`].
pub const ENV_COOLDOWN_MS: &str = "START_SCHEDULER_COOLDOWN_MS";
/// Environment variable overriding [`SchedulerConfig::retry_enabled`].
pub const ENV_RETRY_ENABLED: &str = "START_SCHEDULER_RETRY_ENABLED";

const DEFAULT_POLL_INTERVAL_MS: u64 = 3_000;
const DEFAULT_COOLDOWN_MS: u64 = 30_000;

const fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

const fn default_cooldown_ms() -> u64 {
    DEFAULT_COOLDOWN_MS
}

const fn default_retry_enabled() -> bool {
    true
}

/// Timing and retry policy for a scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Milliseconds between drain passes.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Milliseconds all admissions pause after a transient-resource failure.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    /// Whether transient-resource failures are retried at all.
    #[serde(default = "default_retry_enabled")]
    pub retry_enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            retry_enabled: true,
        }
    }
}

impl SchedulerConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.poll_interval_ms == 0 {
            return Err("poll_interval_ms must be greater than 0".into());
        }
        if self.cooldown_ms == 0 {
            return Err("cooldown_ms must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the environment, reading `.env` first if present.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<L>(lookup: L) -> AppResult<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(raw) = lookup(ENV_POLL_INTERVAL_MS) {
            cfg.poll_interval_ms = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_POLL_INTERVAL_MS}={raw} is not a number"))?;
        }
        if let Some(raw) = lookup(ENV_COOLDOWN_MS) {
            cfg.cooldown_ms = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_COOLDOWN_MS}={raw} is not a number"))?;
        }
        if let Some(raw) = lookup(ENV_RETRY_ENABLED) {
            cfg.retry_enabled = parse_flag(&raw)
                .with_context(|| format!("{ENV_RETRY_ENABLED}={raw} is not a boolean"))?;
        }
        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }

    /// Drain period.
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Cooldown window.
    pub const fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_lookup_overrides_defaults() {
        let cfg = SchedulerConfig::from_lookup(lookup(&[
            (ENV_POLL_INTERVAL_MS, "500"),
            (ENV_RETRY_ENABLED, "off"),
        ]))
        .unwrap();
        assert_eq!(cfg.poll_interval_ms, 500);
        assert_eq!(cfg.cooldown_ms, DEFAULT_COOLDOWN_MS);
        assert!(!cfg.retry_enabled);
    }

    #[test]
    fn test_lookup_rejects_garbage() {
        let err = SchedulerConfig::from_lookup(lookup(&[(ENV_COOLDOWN_MS, "soon")])).unwrap_err();
        assert!(err.to_string().contains(ENV_COOLDOWN_MS));

        assert!(SchedulerConfig::from_lookup(lookup(&[(ENV_RETRY_ENABLED, "maybe")])).is_err());
        assert!(SchedulerConfig::from_lookup(lookup(&[(ENV_POLL_INTERVAL_MS, "0")])).is_err());
    }
}
