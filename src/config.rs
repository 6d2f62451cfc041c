use crate::constants::{DEFAULT_FETCH_TIMEOUT, DEFAULT_PREFIX};
use crate::Result;
use core::time::Duration;
use lib_config::{Config as LibConfig, Environment};
use requester::pokeapi::{API_ENDPOINT, DEFAULT_VERSION_GROUP};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub discord_token: Option<String>,
    pub prefix: String,
    /// Play in the terminal instead of connecting to discord
    pub console: bool,
    pub version_group: String,
    pub api_endpoint: String,
    pub fetch_timeout_secs: u64,
}

impl Config {
    /// Read the config from the `SLACKEMON_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = LibConfig::new();

        config.set_default("prefix", DEFAULT_PREFIX)?;
        config.set_default("console", false)?;
        config.set_default("version_group", DEFAULT_VERSION_GROUP)?;
        config.set_default("api_endpoint", API_ENDPOINT)?;
        config.set_default("fetch_timeout_secs", DEFAULT_FETCH_TIMEOUT.as_secs() as i64)?;
        config.merge(Environment::with_prefix("SLACKEMON"))?;

        let res = config.try_into()?;
        Ok(res)
    }

    /// The token from the config, or the plain `DISCORD_TOKEN` variable
    pub fn token(&self) -> Option<String> {
        self.discord_token
            .clone()
            .or_else(|| env::var("DISCORD_TOKEN").ok())
            .filter(|v| !v.trim().is_empty())
    }

    #[inline]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }
}
