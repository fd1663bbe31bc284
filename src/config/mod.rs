use std::env;
use std::fmt;

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
    pub telemetry: TelemetryConfig,
    pub ivr: IvrConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );
        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            ivr: IvrConfig::load()?,
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Tunables for the call flows themselves.
#[derive(Debug, Clone)]
pub struct IvrConfig {
    /// Attempt budget shared by every retried step.
    pub max_attempts: u32,
    /// Upper bound on vouchers attached to a single celebration.
    pub max_vouchers: usize,
    /// A reported date falling more than this many days in the past is
    /// reinterpreted in next year's calendar.
    pub rollover_grace_days: i64,
    /// Read back verbatim to callers who hit the duplicate-event refusal.
    pub support_number: String,
    pub token_min_len: usize,
    pub token_max_len: usize,
}

impl Default for IvrConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            max_vouchers: 3,
            rollover_grace_days: 30,
            support_number: "03-555-0100".to_string(),
            token_min_len: 5,
            token_max_len: 9,
        }
    }
}

impl IvrConfig {
    fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            max_attempts: read_number("IVR_MAX_ATTEMPTS", defaults.max_attempts)?,
            max_vouchers: read_number("IVR_MAX_VOUCHERS", defaults.max_vouchers)?,
            rollover_grace_days: read_number(
                "IVR_ROLLOVER_GRACE_DAYS",
                defaults.rollover_grace_days,
            )?,
            support_number: env::var("IVR_SUPPORT_NUMBER")
                .unwrap_or_else(|_| defaults.support_number),
            token_min_len: read_number("IVR_TOKEN_MIN_LEN", defaults.token_min_len)?,
            token_max_len: read_number("IVR_TOKEN_MAX_LEN", defaults.token_max_len)?,
        };

        if config.max_attempts == 0 {
            return Err(ConfigError::InvalidNumber {
                key: "IVR_MAX_ATTEMPTS",
            });
        }
        if config.token_min_len == 0 || config.token_min_len > config.token_max_len {
            return Err(ConfigError::InvalidTokenWindow);
        }

        Ok(config)
    }
}

fn read_number<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { key: &'static str },
    InvalidTokenWindow,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { key } => {
                write!(f, "{} must be a non-negative number", key)
            }
            ConfigError::InvalidTokenWindow => {
                write!(
                    f,
                    "IVR_TOKEN_MIN_LEN must be at least 1 and no larger than IVR_TOKEN_MAX_LEN"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

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
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("IVR_MAX_ATTEMPTS");
        env::remove_var("IVR_MAX_VOUCHERS");
        env::remove_var("IVR_ROLLOVER_GRACE_DAYS");
        env::remove_var("IVR_SUPPORT_NUMBER");
        env::remove_var("IVR_TOKEN_MIN_LEN");
        env::remove_var("IVR_TOKEN_MAX_LEN");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.ivr.max_attempts, 3);
        assert_eq!(config.ivr.max_vouchers, 3);
        assert_eq!(config.ivr.support_number, "03-555-0100");
    }

    #[test]
    fn overrides_are_read_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("IVR_MAX_ATTEMPTS", "5");
        env::set_var("IVR_SUPPORT_NUMBER", "02-123-4567");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.ivr.max_attempts, 5);
        assert_eq!(config.ivr.support_number, "02-123-4567");
        reset_env();
    }

    #[test]
    fn rejects_zero_attempt_budget() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("IVR_MAX_ATTEMPTS", "0");
        let result = AppConfig::load();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidNumber {
                key: "IVR_MAX_ATTEMPTS"
            })
        ));
        reset_env();
    }

    #[test]
    fn rejects_inverted_token_window() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("IVR_TOKEN_MIN_LEN", "9");
        env::set_var("IVR_TOKEN_MAX_LEN", "5");
        let result = AppConfig::load();
        assert!(matches!(result, Err(ConfigError::InvalidTokenWindow)));
        reset_env();
    }
}
