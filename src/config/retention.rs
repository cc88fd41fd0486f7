//! Audit event retention configuration.
//!
//! # Example
//!
//! ```toml
//! [retention]
//! enabled = true
//! interval_hours = 24
//! audit_events_days = 30
//! dry_run = false
//! ```

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Audit event retention configuration.
///
/// When enabled, a background worker periodically deletes audit events
/// dated before `now - audit_events_days`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct RetentionConfig {
    /// Whether the background retention worker runs.
    /// Default: true
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// How often to run the retention worker (in hours).
    /// Default: 24 (once per day)
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,

    /// Days to keep audit events. Must be positive.
    /// Default: 30
    #[serde(default = "default_audit_events_days")]
    pub audit_events_days: i64,

    /// If true, log how many events would be deleted without deleting them.
    /// Default: false
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_hours: default_interval_hours(),
            audit_events_days: default_audit_events_days(),
            dry_run: false,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_interval_hours() -> u64 {
    24
}

fn default_audit_events_days() -> i64 {
    30
}

impl RetentionConfig {
    /// Get the interval as a Duration.
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_hours.saturating_mul(3600))
    }

    /// Only checked when the worker is enabled. A disabled section may hold
    /// any period; one-shot sweeps re-check it at invocation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        if self.audit_events_days <= 0 {
            return Err(ConfigError::Validation(format!(
                "retention.audit_events_days must be positive, got {}",
                self.audit_events_days
            )));
        }
        if self.interval_hours == 0 {
            return Err(ConfigError::Validation(
                "retention.interval_hours must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
