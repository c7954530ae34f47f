use crate::error::{Error, Result};
use crate::marketplace::{RetryPolicy, Throttle};
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.ozon.ru";
pub const DEFAULT_WIDGET_PREFIX: &str = "webListReviews";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub base_url: String,
    pub max_reviews: usize,
    pub request_timeout_secs: u64,
    pub throttle_min_ms: u64,
    pub throttle_max_ms: u64,
    pub retry_max_attempts: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_path = env::var("REVIEWS_DB").unwrap_or_else(|_| "reviews.db".to_string());

        let base_url = env::var("REVIEWS_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let max_reviews = parse_var("MAX_REVIEWS", 25)?;
        let request_timeout_secs = parse_var("REQUEST_TIMEOUT_SECS", 10)?;
        let throttle_min_ms = parse_var("THROTTLE_MIN_MS", 500)?;
        let throttle_max_ms = parse_var("THROTTLE_MAX_MS", 2000)?;
        let retry_max_attempts = parse_var("RETRY_MAX_ATTEMPTS", 3)?;

        let config = Self {
            database_path,
            base_url,
            max_reviews,
            request_timeout_secs,
            throttle_min_ms,
            throttle_max_ms,
            retry_max_attempts,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.throttle_min_ms > self.throttle_max_ms {
            return Err(Error::Config(format!(
                "THROTTLE_MIN_MS ({}) is greater than THROTTLE_MAX_MS ({})",
                self.throttle_min_ms, self.throttle_max_ms
            )));
        }
        if self.retry_max_attempts == 0 {
            return Err(Error::Config(
                "RETRY_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "reviews.db".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_reviews: 25,
            request_timeout_secs: 10,
            throttle_min_ms: 500,
            throttle_max_ms: 2000,
            retry_max_attempts: 3,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} has an invalid value: {}", name, value))),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub base_url: String,
    pub widget_prefix: String,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    pub throttle: Throttle,
}

impl FetchConfig {
    // No pauses and no backoff; for local mock servers.
    pub fn immediate(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            widget_prefix: DEFAULT_WIDGET_PREFIX.to_string(),
            request_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default().with_base_delay(Duration::ZERO),
            throttle: Throttle::disabled(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for FetchConfig {
    fn from(config: &Config) -> Self {
        Self {
            base_url: config.base_url.clone(),
            widget_prefix: DEFAULT_WIDGET_PREFIX.to_string(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            retry: RetryPolicy {
                max_attempts: config.retry_max_attempts,
                ..RetryPolicy::default()
            },
            throttle: Throttle::new(
                Duration::from_millis(config.throttle_min_ms),
                Duration::from_millis(config.throttle_max_ms),
            ),
        }
    }
}
