use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::info;

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_url: String,
    pub store_key: String,
    pub host: String,
    pub port: u16,
    pub rate_limit_window: Duration,
    pub rate_limit_max: u32,
    pub trust_forwarded: bool,
    pub strict_charset: bool,
    pub filter_rules: Option<PathBuf>,
    pub public_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `lookup` stands in for the environment so tests need not mutate it.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            match lookup(key) {
                Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
                _ => bail!("{} is unset", key),
            }
        };

        let store_url = required("DECEMBER_STORE_URL")?;
        let store_key = required("DECEMBER_STORE_KEY")?;

        let window_ms: u64 = parse_or(&lookup, "DECEMBER_RATE_LIMIT_WINDOW_MS", 900_000)?;

        Ok(Self {
            store_url,
            store_key,
            host: lookup("DECEMBER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "DECEMBER_PORT", 5000)?,
            rate_limit_window: Duration::from_millis(window_ms),
            rate_limit_max: parse_or(&lookup, "DECEMBER_RATE_LIMIT_MAX_REQUESTS", 5)?,
            trust_forwarded: parse_or(&lookup, "DECEMBER_TRUST_FORWARDED", false)?,
            strict_charset: parse_or(&lookup, "DECEMBER_STRICT_CHARSET", true)?,
            filter_rules: lookup("DECEMBER_FILTER_RULES").map(PathBuf::from),
            public_dir: lookup("DECEMBER_PUBLIC_DIR")
                .unwrap_or_else(|| "./public".into())
                .into(),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {} value '{}'", key, raw)),
        None => {
            info!("{} not set, using default: {}", key, default);
            Ok(default)
        }
    }
}
