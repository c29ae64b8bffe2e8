use crate::domain::services::filter_normalizer::NormalizerContext;
use chrono::{DateTime, Utc};
use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub service_name: String,
    pub log_filter: String,
    pub metrics_port: Option<u16>,
    pub filter_date_columns: Vec<String>,
    pub time_based_sweep_minutes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "deskrules".to_string(),
            log_filter: "deskrules=info".to_string(),
            metrics_port: None,
            filter_date_columns: parse_columns("created_at,updated_at,closed_at"),
            time_based_sweep_minutes: 5,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let service_name = env::var("SERVICE_NAME").unwrap_or(defaults.service_name);

        let log_filter = env::var("LOG_FILTER").unwrap_or(defaults.log_filter);

        let metrics_port = match env::var("METRICS_PORT") {
            Ok(port) => Some(port.parse().map_err(|_| ConfigError::InvalidMetricsPort)?),
            Err(_) => None,
        };

        let filter_date_columns = env::var("FILTER_DATE_COLUMNS")
            .map(|raw| parse_columns(&raw))
            .unwrap_or(defaults.filter_date_columns);

        let time_based_sweep_minutes = match env::var("TIME_BASED_SWEEP_MINUTES") {
            Ok(raw) => parse_sweep_minutes(&raw)?,
            Err(_) => defaults.time_based_sweep_minutes,
        };

        Ok(Config {
            service_name,
            log_filter,
            metrics_port,
            filter_date_columns,
            time_based_sweep_minutes,
        })
    }

    /// How often an external scheduler should re-run time based triggers
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.time_based_sweep_minutes.saturating_mul(60))
    }

    pub fn normalizer_context(&self, now: DateTime<Utc>) -> NormalizerContext {
        NormalizerContext::new(now).with_date_columns(self.filter_date_columns.iter().cloned())
    }
}

fn parse_columns(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}

fn parse_sweep_minutes(raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(minutes) if minutes > 0 => Ok(minutes),
        _ => Err(ConfigError::InvalidSweepInterval(raw.to_string())),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid metrics port number")]
    InvalidMetricsPort,

    #[error("TIME_BASED_SWEEP_MINUTES must be a positive integer, got '{0}'")]
    InvalidSweepInterval(String),
}
