//! Application configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use orchestrator::OrchestratorConfig;
use resilience::{CircuitBreakerConfig, DispatchConfig, RetryConfig};

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `DATABASE_URL` — PostgreSQL connection string (unset: in-memory store)
/// - `INVENTORY_FAILURE_THRESHOLD` — consecutive failures before the breaker opens (default: `3`)
/// - `INVENTORY_RECOVERY_TIMEOUT_SECS` — open period before a trial call (default: `10`)
/// - `INVENTORY_CALL_TIMEOUT_MS` — deadline for one inventory check (default: `5000`)
/// - `PAYMENT_MAX_ATTEMPTS` — payment attempts including the first (default: `3`)
/// - `PAYMENT_RETRY_DELAY_MS` — fixed wait between payment attempts (default: `2000`)
/// - `PAYMENT_ATTEMPT_TIMEOUT_MS` — deadline for one payment attempt (default: `5000`)
/// - `NOTIFICATION_TIMEOUT_MS` — deadline for a notification (default: `5000`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub inventory_failure_threshold: u32,
    pub inventory_recovery_timeout: Duration,
    pub inventory_call_timeout: Duration,
    pub payment_max_attempts: u32,
    pub payment_retry_delay: Duration,
    pub payment_attempt_timeout: Duration,
    pub notification_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    ///
    /// Unparseable values fall back to their default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: env_or("PORT", defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            inventory_failure_threshold: env_or(
                "INVENTORY_FAILURE_THRESHOLD",
                defaults.inventory_failure_threshold,
            ),
            inventory_recovery_timeout: Duration::from_secs(env_or(
                "INVENTORY_RECOVERY_TIMEOUT_SECS",
                defaults.inventory_recovery_timeout.as_secs(),
            )),
            inventory_call_timeout: millis_or(
                "INVENTORY_CALL_TIMEOUT_MS",
                defaults.inventory_call_timeout,
            ),
            payment_max_attempts: env_or("PAYMENT_MAX_ATTEMPTS", defaults.payment_max_attempts),
            payment_retry_delay: millis_or("PAYMENT_RETRY_DELAY_MS", defaults.payment_retry_delay),
            payment_attempt_timeout: millis_or(
                "PAYMENT_ATTEMPT_TIMEOUT_MS",
                defaults.payment_attempt_timeout,
            ),
            notification_timeout: millis_or(
                "NOTIFICATION_TIMEOUT_MS",
                defaults.notification_timeout,
            ),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Fault-tolerance settings for the orchestrator.
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            inventory_breaker: CircuitBreakerConfig {
                failure_threshold: self.inventory_failure_threshold,
                recovery_timeout: self.inventory_recovery_timeout,
                call_timeout: Some(self.inventory_call_timeout),
            },
            payment_retry: RetryConfig {
                max_attempts: self.payment_max_attempts,
                delay: self.payment_retry_delay,
                attempt_timeout: Some(self.payment_attempt_timeout),
            },
            notification: DispatchConfig {
                timeout: Some(self.notification_timeout),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            inventory_failure_threshold: 3,
            inventory_recovery_timeout: Duration::from_secs(10),
            inventory_call_timeout: Duration::from_millis(5000),
            payment_max_attempts: 3,
            payment_retry_delay: Duration::from_millis(2000),
            payment_attempt_timeout: Duration::from_millis(5000),
            notification_timeout: Duration::from_millis(5000),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn millis_or(key: &str, default: Duration) -> Duration {
    Duration::from_millis(env_or(key, default.as_millis() as u64))
}
