//! Environment-driven configuration.
//!
//! Values are read once at startup. `.env` is honoured when present and every
//! setting has a default, so a bare `cargo run --bin alert-server` works.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Get the deployment environment (`sandbox` unless overridden).
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Endpoints of the upstream quote sources.
#[derive(Debug, Clone)]
pub struct MarketDataConfig {
    pub tradingview_base_url: String,
    pub alphavantage_base_url: String,
    pub alphavantage_api_key: Option<String>,
    pub coingecko_base_url: String,
    pub timeout: Duration,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            tradingview_base_url: "http://localhost:8000/api/tradingview".to_string(),
            alphavantage_base_url: "https://www.alphavantage.co".to_string(),
            alphavantage_api_key: None,
            coingecko_base_url: "https://api.coingecko.com/api/v3".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Provider accounts and delivery policy for outbound notifications.
///
/// Recipient addressing lives on each alert (or user directory entry); only
/// account-level credentials are process-wide.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub sendgrid_base_url: String,
    pub sendgrid_api_key: Option<String>,
    pub email_from: String,
    pub pushover_base_url: String,
    pub pushover_api_token: Option<String>,
    pub telegram_base_url: String,
    pub twilio_base_url: String,
    pub max_concurrency: usize,
    pub retry_attempts: usize,
    pub retry_min_delay: Duration,
    pub timeout: Duration,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            sendgrid_base_url: "https://api.sendgrid.com".to_string(),
            sendgrid_api_key: None,
            email_from: "alerts@pricewatch.local".to_string(),
            pushover_base_url: "https://api.pushover.net".to_string(),
            pushover_api_token: None,
            telegram_base_url: "https://api.telegram.org".to_string(),
            twilio_base_url: "https://api.twilio.com".to_string(),
            max_concurrency: 4,
            retry_attempts: 2,
            retry_min_delay: Duration::from_millis(200),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    /// `EnvFilter` directives, e.g. `debug` or `pricewatch=debug,info`.
    pub log_level: Option<String>,
    pub port: u16,
    pub poll_interval_seconds: u64,
    pub history_capacity: usize,
    pub broadcast_history: usize,
    pub users_file: Option<PathBuf>,
    pub ws_api_key: Option<String>,
    pub market_data: MarketDataConfig,
    pub notifier: NotifierConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "sandbox".to_string(),
            log_level: None,
            port: 8080,
            poll_interval_seconds: 60,
            history_capacity: 1000,
            broadcast_history: 10,
            users_file: None,
            ws_api_key: None,
            market_data: MarketDataConfig::default(),
            notifier: NotifierConfig::default(),
        }
    }
}

impl Config {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Self {
        let defaults = Config::default();
        let timeout = Duration::from_secs(env_or("HTTP_TIMEOUT_SECONDS", 10u64).max(1));

        let market_data = MarketDataConfig {
            tradingview_base_url: env_string(
                "TRADINGVIEW_BASE_URL",
                &defaults.market_data.tradingview_base_url,
            ),
            alphavantage_base_url: env_string(
                "ALPHAVANTAGE_BASE_URL",
                &defaults.market_data.alphavantage_base_url,
            ),
            alphavantage_api_key: env_optional("ALPHAVANTAGE_API_KEY"),
            coingecko_base_url: env_string(
                "COINGECKO_BASE_URL",
                &defaults.market_data.coingecko_base_url,
            ),
            timeout,
        };

        let notifier = NotifierConfig {
            sendgrid_base_url: env_string("SENDGRID_BASE_URL", &defaults.notifier.sendgrid_base_url),
            sendgrid_api_key: env_optional("SENDGRID_API_KEY"),
            email_from: env_string("EMAIL_FROM", &defaults.notifier.email_from),
            pushover_base_url: env_string("PUSHOVER_BASE_URL", &defaults.notifier.pushover_base_url),
            pushover_api_token: env_optional("PUSHOVER_API_TOKEN"),
            telegram_base_url: env_string("TELEGRAM_BASE_URL", &defaults.notifier.telegram_base_url),
            twilio_base_url: env_string("TWILIO_BASE_URL", &defaults.notifier.twilio_base_url),
            max_concurrency: env_or("NOTIFY_MAX_CONCURRENCY", defaults.notifier.max_concurrency).max(1),
            retry_attempts: env_or("NOTIFY_RETRY_ATTEMPTS", defaults.notifier.retry_attempts),
            retry_min_delay: Duration::from_millis(env_or("NOTIFY_RETRY_MIN_DELAY_MS", 200u64)),
            timeout,
        };

        Self {
            environment: get_environment(),
            log_level: env_optional("LOG_LEVEL"),
            port: env_or("PORT", defaults.port),
            poll_interval_seconds: env_or("ALERT_POLL_INTERVAL_SECONDS", defaults.poll_interval_seconds),
            history_capacity: env_or("ALERT_HISTORY_CAPACITY", defaults.history_capacity).max(1),
            broadcast_history: env_or("ALERT_BROADCAST_HISTORY", defaults.broadcast_history),
            users_file: env_optional("ALERT_USERS_FILE").map(PathBuf::from),
            ws_api_key: env_optional("WS_API_KEY"),
            market_data,
            notifier,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment.as_str(), "production" | "prod")
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}
