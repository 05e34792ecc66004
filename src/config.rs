//! Service configuration, read from the environment with defaults.

use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// RocksDB directory used outside demo mode
    pub database_path: String,
    /// Per-session seeded in-memory databases instead of RocksDB
    pub demo_mode: bool,
    pub bind_addr: String,
    /// Directory served for everything that isn't under /api
    pub static_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let demo_mode = match lookup("DEMO_MODE") {
            None => false,
            Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidValue {
                name: "DEMO_MODE",
                value,
            })?,
        };

        Ok(Config {
            database_path: lookup("DATABASE_PATH").unwrap_or_else(|| "./data".to_string()),
            demo_mode,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            static_dir: lookup("STATIC_DIR").unwrap_or_else(|| "static".to_string()),
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" | "" => Some(false),
        _ => None,
    }
}
