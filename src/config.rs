//! Process-wide configuration, read once from the environment at startup.

use crate::discord::api::API_BASE;
use std::{env, num::ParseIntError};
use thiserror::Error;

/// Port used in the absence of `$PORT`.
const DEFAULT_PORT: u16 = 80;

/// Whether we're running in production. Production suppresses diagnostic
/// detail in error responses, and per-request tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Production,
    Development,
}

impl Mode {
    pub fn is_production(self) -> bool {
        self == Mode::Production
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub mode: Mode,
    pub discord_api_base: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not parse PORT to u16: {0}")]
    InvalidPort(#[from] ParseIntError),
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| env::var(k).ok())
    }

    /// Read configuration via any variable lookup, enabling tests to avoid
    /// mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(x) => x.trim().parse()?,
            None => DEFAULT_PORT,
        };

        let mode = match lookup("APP_ENV").as_deref() {
            Some("production") => Mode::Production,
            _ => Mode::Development,
        };

        let discord_api_base = lookup("DISCORD_API_BASE")
            .filter(|x| !x.is_empty())
            .unwrap_or_else(|| API_BASE.to_owned());

        Ok(Config {
            port,
            mode,
            discord_api_base,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Config::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(
            config(&[]).unwrap(),
            Config {
                port: 80,
                mode: Mode::Development,
                discord_api_base: API_BASE.to_owned(),
            }
        );
    }

    #[test]
    fn test_overrides() {
        let c = config(&[
            ("PORT", "3000"),
            ("APP_ENV", "production"),
            ("DISCORD_API_BASE", "http://localhost:1234"),
        ])
        .unwrap();

        assert_eq!(c.port, 3000);
        assert!(c.mode.is_production());
        assert_eq!(c.discord_api_base, "http://localhost:1234");
    }

    #[test]
    fn test_non_production_modes() {
        assert_eq!(config(&[("APP_ENV", "staging")]).unwrap().mode, Mode::Development);
        assert_eq!(config(&[("APP_ENV", "Production")]).unwrap().mode, Mode::Development);
    }

    #[test]
    fn test_bad_port() {
        assert!(matches!(
            config(&[("PORT", "eighty")]),
            Err(ConfigError::InvalidPort(_))
        ));
        assert!(config(&[("PORT", "70000")]).is_err());
    }
}
