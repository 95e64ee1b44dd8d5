use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scheduler: SchedulerConfig,
    pub notifications: NotificationConfig,
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

        // The production deployment scanned every six hours.
        let scan_interval_secs = env::var("APP_SCAN_INTERVAL_SECS")
            .unwrap_or_else(|_| "21600".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidScanInterval)?;
        if scan_interval_secs == 0 {
            return Err(ConfigError::InvalidScanInterval);
        }

        let rent_amount = env::var("APP_RENT_AMOUNT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidRentAmount)?;

        let cron_secret = env::var("APP_CRON_SECRET")
            .ok()
            .filter(|value| !value.trim().is_empty());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scheduler: SchedulerConfig {
                scan_interval: Duration::from_secs(scan_interval_secs),
            },
            notifications: NotificationConfig {
                rent_amount,
                cron_secret,
            },
        })
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// How often the background scan fires.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub scan_interval: Duration,
}

/// Rendering defaults and trigger-surface protection.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// Fixed monthly amount (ETB) seeded onto demo rooms.
    pub rent_amount: u32,
    /// Bearer secret guarding the run-now endpoint; unset leaves it open.
    pub cron_secret: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidScanInterval,
    InvalidRentAmount,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidScanInterval => {
                write!(f, "APP_SCAN_INTERVAL_SECS must be a positive integer")
            }
            ConfigError::InvalidRentAmount => {
                write!(f, "APP_RENT_AMOUNT must be a non-negative integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
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
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_SCAN_INTERVAL_SECS");
        env::remove_var("APP_RENT_AMOUNT");
        env::remove_var("APP_CRON_SECRET");
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
        assert_eq!(config.scheduler.scan_interval, Duration::from_secs(21_600));
        assert_eq!(config.notifications.rent_amount, 5000);
        assert!(config.notifications.cron_secret.is_none());
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
    fn rejects_zero_scan_interval() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_SCAN_INTERVAL_SECS", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidScanInterval)
        ));
        reset_env();
    }

    #[test]
    fn blank_cron_secret_counts_as_unset() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_CRON_SECRET", "   ");
        let config = AppConfig::load().expect("config loads");
        assert!(config.notifications.cron_secret.is_none());

        env::set_var("APP_CRON_SECRET", "s3cret");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.notifications.cron_secret.as_deref(), Some("s3cret"));
        reset_env();
    }
}
