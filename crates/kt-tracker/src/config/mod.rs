use crate::scoring::{ScoringWeights, WeightsError};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the tracker.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringWeights,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = LogFormat::from_str(
            &env::var("APP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
        );

        let scoring = load_scoring_weights()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
            scoring,
        })
    }
}

/// Weights start from the standard rubric; each `KT_*` variable overrides one field.
fn load_scoring_weights() -> Result<ScoringWeights, ConfigError> {
    let defaults = ScoringWeights::default();
    let weights = ScoringWeights {
        progress_weight: env_f64("KT_PROGRESS_WEIGHT", defaults.progress_weight)?,
        coverage_weight: env_f64("KT_COVERAGE_WEIGHT", defaults.coverage_weight)?,
        confidence_weight: env_f64("KT_CONFIDENCE_WEIGHT", defaults.confidence_weight)?,
        operational_weight: env_f64("KT_OPERATIONAL_WEIGHT", defaults.operational_weight)?,
        quality_weight: env_f64("KT_QUALITY_WEIGHT", defaults.quality_weight)?,
        green_threshold: env_f64("KT_GREEN_THRESHOLD", defaults.green_threshold)?,
        amber_threshold: env_f64("KT_AMBER_THRESHOLD", defaults.amber_threshold)?,
        variance_threshold: env_f64("KT_VARIANCE_THRESHOLD", defaults.variance_threshold)?,
    };

    weights.validate()?;
    Ok(weights)
}

fn env_f64(key: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Compact,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
    InvalidWeights(WeightsError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a number (got '{value}')")
            }
            ConfigError::InvalidWeights(err) => write!(f, "invalid scoring weights: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidWeights(err) => Some(err),
        }
    }
}

impl From<WeightsError> for ConfigError {
    fn from(value: WeightsError) -> Self {
        Self::InvalidWeights(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_LOG_FORMAT",
            "KT_PROGRESS_WEIGHT",
            "KT_COVERAGE_WEIGHT",
            "KT_CONFIDENCE_WEIGHT",
            "KT_OPERATIONAL_WEIGHT",
            "KT_QUALITY_WEIGHT",
            "KT_GREEN_THRESHOLD",
            "KT_AMBER_THRESHOLD",
            "KT_VARIANCE_THRESHOLD",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.log_format, LogFormat::Compact);
        assert_eq!(config.scoring, ScoringWeights::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn threshold_overrides_are_applied() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("KT_VARIANCE_THRESHOLD", "15");
        env::set_var("KT_GREEN_THRESHOLD", "80");
        env::set_var("APP_LOG_FORMAT", "JSON");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.scoring.variance_threshold, 15.0);
        assert_eq!(config.scoring.green_threshold, 80.0);
        assert_eq!(config.telemetry.log_format, LogFormat::Json);
        reset_env();
    }

    #[test]
    fn rejects_weights_that_do_not_sum_to_one() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("KT_QUALITY_WEIGHT", "0.5");
        let err = AppConfig::load().expect_err("weights rejected");
        assert!(matches!(
            err,
            ConfigError::InvalidWeights(WeightsError::Sum { .. })
        ));
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_weights() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("KT_AMBER_THRESHOLD", "half");
        let err = AppConfig::load().expect_err("number rejected");
        assert_eq!(err.to_string(), "KT_AMBER_THRESHOLD must be a number (got 'half')");
        reset_env();
    }
}
