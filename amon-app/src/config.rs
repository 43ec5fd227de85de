use error_stack::{Report, ResultExt};
use std::str::FromStr;

const PORT_VAR: &str = "AMON_PORT";
const DATABASE_URL_VAR: &str = "DATABASE_URL";
const POOL_SIZE_VAR: &str = "AMON_DB_POOL_SIZE";
const METRICS_VAR: &str = "AMON_METRICS";

const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, thiserror::Error)]
#[error("environment variable {0} has an invalid value")]
pub struct ConfigError(&'static str);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// Postgres connection URL. Without one the service keeps everything in memory.
    pub database_url: Option<String>,
    pub pool_size: Option<usize>,
    pub metrics_enabled: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, Report<ConfigError>> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Report<ConfigError>> {
        Ok(Self {
            port: parse(&lookup, PORT_VAR)?.unwrap_or(DEFAULT_PORT),
            database_url: lookup(DATABASE_URL_VAR).filter(|url| !url.trim().is_empty()),
            pool_size: parse(&lookup, POOL_SIZE_VAR)?,
            metrics_enabled: parse(&lookup, METRICS_VAR)?.unwrap_or(true),
        })
    }
}

fn parse<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, Report<ConfigError>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };

    raw.trim()
        .parse()
        .map(Some)
        .change_context(ConfigError(key))
        .attach_with(|| format!("{key}={raw}"))
}
