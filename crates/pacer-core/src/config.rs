//! Configuration module
//!
//! Environment-driven defaults for workers and logging. Workers built without
//! settings use the same values as the defaults here.

use std::env;
use std::str::FromStr;
use std::time::Duration;

// Common constants
const EXECUTION_PERIOD_SECS: u64 = 60;
const EXECUTION_BURST: u32 = 1;
const RESTART_PERIOD_SECS: u64 = 3600;
const RESTART_BURST: u32 = 5;
const RETRY_DELAY_MS: u64 = 1000;

/// Output format of the tracing subscriber
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow::anyhow!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                other
            )),
        }
    }
}

/// Worker defaults loaded from the environment
#[derive(Clone, Debug, PartialEq)]
pub struct WorkerSettings {
    pub execution_period: Duration,
    pub execution_burst: u32,
    pub restart_period: Duration,
    pub restart_burst: u32,
    pub retry_delay: Duration,
    pub log_format: LogFormat,
    pub environment: String,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            execution_period: Duration::from_secs(EXECUTION_PERIOD_SECS),
            execution_burst: EXECUTION_BURST,
            restart_period: Duration::from_secs(RESTART_PERIOD_SECS),
            restart_burst: RESTART_BURST,
            retry_delay: Duration::from_millis(RETRY_DELAY_MS),
            log_format: LogFormat::Text,
            environment: "development".to_string(),
        }
    }
}

impl WorkerSettings {
    /// Load settings from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    /// Load settings from an arbitrary key lookup.
    ///
    /// Numeric values that fail to parse fall back to their defaults.
    pub fn from_source<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
            value
                .and_then(|v| v.trim().parse::<T>().ok())
                .unwrap_or(default)
        }

        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let log_format = match lookup("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => LogFormat::default(),
        };

        let settings = Self {
            execution_period: Duration::from_secs(parse_or(
                lookup("WORKER_EXECUTION_PERIOD_SECS"),
                EXECUTION_PERIOD_SECS,
            )),
            execution_burst: parse_or(lookup("WORKER_EXECUTION_BURST"), EXECUTION_BURST),
            restart_period: Duration::from_secs(parse_or(
                lookup("WORKER_RESTART_PERIOD_SECS"),
                RESTART_PERIOD_SECS,
            )),
            restart_burst: parse_or(lookup("WORKER_RESTART_BURST"), RESTART_BURST),
            retry_delay: Duration::from_millis(parse_or(
                lookup("WORKER_RETRY_DELAY_MS"),
                RETRY_DELAY_MS,
            )),
            log_format,
            environment,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Check if the worker is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.execution_burst == 0 {
            return Err(anyhow::anyhow!(
                "WORKER_EXECUTION_BURST must be at least 1, otherwise the handler never runs"
            ));
        }

        if self.restart_burst == 0 {
            return Err(anyhow::anyhow!(
                "WORKER_RESTART_BURST must be at least 1, otherwise a failed worker never restarts"
            ));
        }

        // A zero delay turns limiter denials into a busy loop
        if self.is_production() && self.retry_delay.is_zero() {
            return Err(anyhow::anyhow!(
                "WORKER_RETRY_DELAY_MS cannot be 0 in production"
            ));
        }

        Ok(())
    }
}
