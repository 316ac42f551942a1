use std::env;
use std::fmt;

use log::debug;

use crate::error::{Error, Result};

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const API_URL_VAR: &str = "WGER_API_URL";
pub const LANGUAGE_VAR: &str = "WGER_LANGUAGE";
pub const PAGE_SIZE_VAR: &str = "WGER_PAGE_SIZE";

pub const DEFAULT_API_URL: &str = "https://wger.de/api/v2";
/// wger language id for English.
pub const DEFAULT_LANGUAGE: u32 = 2;
pub const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub api_base_url: String,
    pub language: u32,
    pub page_size: u32,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup. Blank values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let database_url = get(DATABASE_URL_VAR).ok_or_else(|| {
            Error::Config(format!(
                "{} was not found in the environment or the .env file",
                DATABASE_URL_VAR
            ))
        })?;

        let api_base_url = get(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let language = parse_number(LANGUAGE_VAR, get(LANGUAGE_VAR), DEFAULT_LANGUAGE)?;
        let page_size = parse_number(PAGE_SIZE_VAR, get(PAGE_SIZE_VAR), DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(Error::Config(format!("{} must be at least 1", PAGE_SIZE_VAR)));
        }

        let config = Self {
            database_url,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            language,
            page_size,
        };
        debug!("Loaded configuration: {}", config.redacted());
        Ok(config)
    }

    /// Summary safe to log: the connection string may carry credentials.
    pub fn redacted(&self) -> String {
        format!(
            "database_url=<{} chars> api_base_url={} language={} page_size={}",
            self.database_url.len(),
            self.api_base_url,
            self.language,
            self.page_size
        )
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Config {{ {} }}", self.redacted())
    }
}

fn parse_number(key: &str, value: Option<String>, default: u32) -> Result<u32> {
    match value {
        None => Ok(default),
        Some(raw) => raw.parse::<u32>().map_err(|_| {
            Error::Config(format!("{} must be a positive integer, got {:?}", key, raw))
        }),
    }
}
