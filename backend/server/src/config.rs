use std::{env, fmt::Display, fs::read_to_string, str::FromStr, time::Duration};

use invite::GateStrategy;
use thiserror::Error;
use tracing::{debug, info, warn};

const SECRETS_DIR: &str = "/run/secrets";

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub redis_url: String,
    pub gate_strategy: GateStrategy,
    pub wedding_pin: Option<String>,
    pub resend_api_key: Option<String>,
    pub from_email: String,
    pub sender_name: String,
    pub service_timeout: Duration,
    pub submission_ttl: Duration,
}

#[derive(Debug, Error)]
#[error("Invalid {key} value {value:?}: {reason}")]
pub struct ConfigError {
    key: &'static str,
    value: String,
    reason: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 1111,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            gate_strategy: GateStrategy::Names,
            wedding_pin: None,
            resend_api_key: None,
            from_email: "contact@ongaki.website".to_string(),
            sender_name: "Kimberly & Anesu".to_string(),
            service_timeout: Duration::from_secs(10),
            submission_ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load("RUST_PORT", "1111")?,
            redis_url: try_load("REDIS_URL", "redis://127.0.0.1:6379")?,
            gate_strategy: try_load("GATE_STRATEGY", "names")?,
            wedding_pin: read_secret("WEDDING_PIN"),
            resend_api_key: read_secret("RESEND_API_KEY"),
            from_email: try_load("RESEND_FROM_EMAIL", "contact@ongaki.website")?,
            sender_name: try_load("MAIL_SENDER_NAME", "Kimberly & Anesu")?,
            service_timeout: Duration::from_millis(try_load("SERVICE_TIMEOUT_MS", "10000")?),
            submission_ttl: Duration::from_secs(try_load("SUBMISSION_TTL_SECS", "86400")?),
        })
    }

    /// `From` header value, e.g. `Kimberly & Anesu <contact@ongaki.website>`.
    pub fn sender(&self) -> String {
        format!("{} <{}>", self.sender_name, self.from_email)
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    parse(key, &value)
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    value.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");

        ConfigError {
            key,
            value: value.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Docker secret file first, then a plain environment variable.
fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("{SECRETS_DIR}/{secret_name}");

    match read_to_string(&path) {
        Ok(s) if !s.trim().is_empty() => return Some(s.trim().to_string()),
        Ok(_) => warn!("Secret file {path} is empty"),
        Err(e) => debug!("Failed to read {secret_name} from file: {e}"),
    }

    let secret = var(secret_name).map(|s| s.trim().to_string());
    if secret.is_none() {
        warn!("{secret_name} not configured");
    }

    secret
}
