//! Engine configuration: defaults plus `BIZSENSE_*` environment overrides.

use std::time::Duration;

use chrono::NaiveTime;
use thiserror::Error;

use bizsense_observability::LogFormat;

use crate::jobs::Schedule;

pub const ENV_RUN_HOUR: &str = "BIZSENSE_RUN_HOUR";
pub const ENV_HANDLER_TIMEOUT_SECS: &str = "BIZSENSE_HANDLER_TIMEOUT_SECS";
pub const ENV_LOW_STOCK_THRESHOLD: &str = "BIZSENSE_LOW_STOCK_THRESHOLD";
pub const ENV_INACTIVE_AFTER_DAYS: &str = "BIZSENSE_INACTIVE_AFTER_DAYS";
pub const ENV_LOG_FORMAT: &str = "BIZSENSE_LOG_FORMAT";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for `{key}`: `{value}` ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// Hour of day (UTC) cadence runs are scheduled for.
    pub run_hour: u32,
    /// Upper bound on a single handler run; `None` waits indefinitely.
    pub handler_timeout: Option<Duration>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            run_hour: 6,
            handler_timeout: None,
        }
    }
}

impl SchedulerConfig {
    pub fn schedule(&self) -> Schedule {
        NaiveTime::from_hms_opt(self.run_hour, 0, 0)
            .map(Schedule::new)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobsConfig {
    /// Stores at or below this many tubes are reported as low stock.
    pub low_stock_threshold: f64,
    /// Accounts without an order for this many days are reviewed for churn.
    pub inactive_after_days: u32,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: 10.0,
            inactive_after_days: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineConfig {
    pub scheduler: SchedulerConfig,
    pub jobs: JobsConfig,
    pub log_format: LogFormat,
}

impl EngineConfig {
    /// Defaults overridden by process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_RUN_HOUR) {
            let hour: u32 = parse(ENV_RUN_HOUR, &raw)?;
            if hour > 23 {
                return Err(invalid(ENV_RUN_HOUR, &raw, "hour must be between 0 and 23"));
            }
            config.scheduler.run_hour = hour;
        }

        if let Some(raw) = lookup(ENV_HANDLER_TIMEOUT_SECS) {
            let secs: u64 = parse(ENV_HANDLER_TIMEOUT_SECS, &raw)?;
            config.scheduler.handler_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(raw) = lookup(ENV_LOW_STOCK_THRESHOLD) {
            let threshold: f64 = parse(ENV_LOW_STOCK_THRESHOLD, &raw)?;
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(invalid(
                    ENV_LOW_STOCK_THRESHOLD,
                    &raw,
                    "threshold must be a non-negative number",
                ));
            }
            config.jobs.low_stock_threshold = threshold;
        }

        if let Some(raw) = lookup(ENV_INACTIVE_AFTER_DAYS) {
            config.jobs.inactive_after_days = parse(ENV_INACTIVE_AFTER_DAYS, &raw)?;
        }

        if let Some(raw) = lookup(ENV_LOG_FORMAT) {
            config.log_format = raw
                .parse()
                .map_err(|reason: String| invalid(ENV_LOG_FORMAT, &raw, reason))?;
        }

        Ok(config)
    }
}

fn parse<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| invalid(key, raw, e.to_string()))
}

fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: reason.into(),
    }
}
