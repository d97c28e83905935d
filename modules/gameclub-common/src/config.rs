use std::env;
use std::time::Duration;

use crate::error::GameClubError;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

const DEFAULT_CRAWL_INTERVAL_DAYS: u64 = 90;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
const MAX_CRAWL_INTERVAL_DAYS: u64 = 3650;
const SECS_PER_DAY: u64 = 86_400;

/// Ingestion configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Crawling
    pub crawl_interval: Duration,
    pub fetch_timeout: Duration,
    pub user_agent: String,
    pub crawl_on_startup: bool,

    // Storage. `None` keeps entities in memory only.
    pub database_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawl_interval: Duration::from_secs(DEFAULT_CRAWL_INTERVAL_DAYS * SECS_PER_DAY),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            crawl_on_startup: true,
            database_url: None,
        }
    }
}

impl Config {
    /// Load configuration from the environment (and `.env` if present).
    pub fn from_env() -> Result<Self, GameClubError> {
        dotenvy::dotenv().ok();

        let crawl_interval = crawl_interval_from_days(parse_env(
            "CRAWL_INTERVAL_DAYS",
            DEFAULT_CRAWL_INTERVAL_DAYS,
        )?)?;
        let fetch_timeout = fetch_timeout_from_secs(parse_env(
            "FETCH_TIMEOUT_SECS",
            DEFAULT_FETCH_TIMEOUT_SECS,
        )?)?;

        let config = Self {
            crawl_interval,
            fetch_timeout,
            user_agent: env::var("CRAWL_USER_AGENT")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            crawl_on_startup: parse_env("CRAWL_ON_STARTUP", true)?,
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
        };

        Ok(config)
    }

    pub fn log_summary(&self) {
        fn redact(url: &Option<String>) -> String {
            match url {
                Some(u) => match u.split_once('@') {
                    Some((_, host)) => format!("postgres://***@{host}"),
                    None => {
                        let head: String = u.chars().take(11).collect();
                        format!("{head}...({} chars)", u.len())
                    }
                },
                None => "<not set, in-memory store>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  CRAWL_INTERVAL_DAYS: {}", self.crawl_interval.as_secs() / SECS_PER_DAY);
        tracing::info!("  FETCH_TIMEOUT_SECS: {}", self.fetch_timeout.as_secs());
        tracing::info!("  CRAWL_USER_AGENT: {}", self.user_agent);
        tracing::info!("  CRAWL_ON_STARTUP: {}", self.crawl_on_startup);
        tracing::info!("  DATABASE_URL: {}", redact(&self.database_url));
    }
}

/// Between 1 and `MAX_CRAWL_INTERVAL_DAYS` days.
fn crawl_interval_from_days(days: u64) -> Result<Duration, GameClubError> {
    if !(1..=MAX_CRAWL_INTERVAL_DAYS).contains(&days) {
        return Err(GameClubError::Config(format!(
            "CRAWL_INTERVAL_DAYS must be between 1 and {MAX_CRAWL_INTERVAL_DAYS}, got {days}"
        )));
    }
    days.checked_mul(SECS_PER_DAY)
        .map(Duration::from_secs)
        .ok_or_else(|| GameClubError::Config(format!("CRAWL_INTERVAL_DAYS overflows: {days}")))
}

fn fetch_timeout_from_secs(secs: u64) -> Result<Duration, GameClubError> {
    if secs == 0 {
        return Err(GameClubError::Config(
            "FETCH_TIMEOUT_SECS must be at least 1".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, GameClubError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| GameClubError::Config(format!("{key} has an invalid value: {raw}"))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_schedule() {
        let config = Config::default();
        assert_eq!(config.crawl_interval, Duration::from_secs(90 * 24 * 3600));
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert!(config.crawl_on_startup);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn interval_days_are_bounded() {
        assert!(matches!(crawl_interval_from_days(0), Err(GameClubError::Config(_))));
        assert!(matches!(
            crawl_interval_from_days(u64::MAX),
            Err(GameClubError::Config(_))
        ));
        assert!(matches!(
            crawl_interval_from_days(MAX_CRAWL_INTERVAL_DAYS + 1),
            Err(GameClubError::Config(_))
        ));
        assert_eq!(
            crawl_interval_from_days(MAX_CRAWL_INTERVAL_DAYS).unwrap(),
            Duration::from_secs(MAX_CRAWL_INTERVAL_DAYS * SECS_PER_DAY)
        );
    }

    #[test]
    fn zero_fetch_timeout_is_rejected() {
        assert!(matches!(fetch_timeout_from_secs(0), Err(GameClubError::Config(_))));
        assert_eq!(fetch_timeout_from_secs(10).unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn parse_env_falls_back_to_default_when_unset() {
        let value: u64 = parse_env("GAMECLUB_TEST_SURELY_UNSET_VAR", 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn parse_env_rejects_garbage() {
        env::set_var("GAMECLUB_TEST_BAD_NUMBER", "ninety");
        let result: Result<u64, _> = parse_env("GAMECLUB_TEST_BAD_NUMBER", 90);
        env::remove_var("GAMECLUB_TEST_BAD_NUMBER");
        assert!(matches!(result, Err(GameClubError::Config(_))));
    }
}
