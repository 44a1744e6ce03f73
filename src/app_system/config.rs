use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::{debug, info};

use crate::effects::RetryPolicy;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid { key: String, value: String, reason: String },
}

/// Runtime settings, read from `CAFE_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// JSON file holding the carts; `None` keeps them in memory.
    pub cart_path: Option<PathBuf>,
    pub channel_buffer: usize,
    pub redirect_delay: Duration,
    pub effect_retry: RetryPolicy,
    pub store_name: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::load`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let cart_path = lookup("CAFE_CART_PATH").filter(|path| !path.trim().is_empty()).map(PathBuf::from);
        match &cart_path {
            Some(path) => info!("CAFE_CART_PATH set, carts persist to {}", path.display()),
            None => info!("CAFE_CART_PATH not set, carts are kept in memory"),
        }

        let channel_buffer: usize = try_load(&lookup, "CAFE_CHANNEL_BUFFER", "32")?;
        if channel_buffer == 0 {
            return Err(invalid("CAFE_CHANNEL_BUFFER", "0", "must be at least 1"));
        }
        let max_attempts: u32 = try_load(&lookup, "CAFE_EFFECT_MAX_ATTEMPTS", "3")?;
        if max_attempts == 0 {
            return Err(invalid("CAFE_EFFECT_MAX_ATTEMPTS", "0", "must be at least 1"));
        }

        Ok(Self {
            cart_path,
            channel_buffer,
            redirect_delay: Duration::from_millis(try_load(&lookup, "CAFE_REDIRECT_DELAY_MS", "2000")?),
            effect_retry: RetryPolicy {
                max_attempts,
                backoff: Duration::from_millis(try_load(&lookup, "CAFE_EFFECT_BACKOFF_MS", "250")?),
            },
            store_name: try_load(&lookup, "CAFE_STORE_NAME", "Café")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cart_path: None,
            channel_buffer: 32,
            redirect_delay: Duration::from_millis(2000),
            effect_retry: RetryPolicy::default(),
            store_name: "Café".to_string(),
        }
    }
}

fn try_load<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        debug!("{key} not set, using default: {default}");
        default.to_string()
    });
    value.trim().parse().map_err(|e: T::Err| invalid(key, &value, &e.to_string()))
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
