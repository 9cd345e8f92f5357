//! Server configuration, read from environment variables:
//!
//!   HOLIDAY_DATABASE_URL             - Postgres connection string (falls back to DATABASE_URL)
//!   HOLIDAY_STORE                    - `postgres` (default) or `memory`
//!   HOLIDAY_BIND_ADDR                - listen address (default: 0.0.0.0:8080)
//!   HOLIDAY_SOURCE_URL               - upstream holiday API base
//!   HOLIDAY_SOURCE_TIMEOUT_SECS      - upstream request timeout (default: 30)
//!   HOLIDAY_DB_POOL_SIZE             - max pool connections (default: 10)
//!   HOLIDAY_DB_ACQUIRE_TIMEOUT_SECS  - pool acquire timeout (default: 30)

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_SOURCE_URL: &str = "https://date.nager.at/api/v3/PublicHolidays";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub store: StoreBackend,
    /// Present whenever `store == Postgres`.
    pub database: Option<DatabaseConfig>,
    pub source_url: String,
    pub source_timeout: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let store = match lookup("HOLIDAY_STORE").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => bail!("HOLIDAY_STORE must be `postgres` or `memory`, got `{other}`"),
        };

        let database = match store {
            StoreBackend::Memory => None,
            StoreBackend::Postgres => {
                let database_url = lookup("HOLIDAY_DATABASE_URL")
                    .or_else(|| lookup("DATABASE_URL"))
                    .ok_or_else(|| anyhow!("HOLIDAY_DATABASE_URL must be set"))?;
                Some(DatabaseConfig {
                    database_url,
                    max_connections: parse_or(&lookup, "HOLIDAY_DB_POOL_SIZE", 10)?,
                    acquire_timeout: Duration::from_secs(parse_or(
                        &lookup,
                        "HOLIDAY_DB_ACQUIRE_TIMEOUT_SECS",
                        30,
                    )?),
                })
            }
        };

        Ok(Self {
            bind_addr: lookup("HOLIDAY_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            store,
            database,
            source_url: lookup("HOLIDAY_SOURCE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_SOURCE_URL.into()),
            source_timeout: Duration::from_secs(parse_or(
                &lookup,
                "HOLIDAY_SOURCE_TIMEOUT_SECS",
                30,
            )?),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value `{raw}`")),
        None => Ok(default),
    }
}

/// Mask the password in a database URL for logging.
/// URLs that cannot carry credentials (no authority part) are replaced by a
/// placeholder, since anything password-like in them sits in the path.
pub fn mask_database_url(raw: &str) -> String {
    const UNPARSEABLE: &str = "<unparseable database url>";
    let mut masked = match url::Url::parse(raw) {
        Ok(parsed) if !parsed.cannot_be_a_base() => parsed,
        _ => return UNPARSEABLE.to_string(),
    };
    if masked.password().is_some() && masked.set_password(Some("***")).is_err() {
        return UNPARSEABLE.to_string();
    }
    masked.to_string()
}
