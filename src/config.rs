use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use log::info;
use url::Url;

pub const DEFAULT_PUSH_ENDPOINT: &str = "https://api.line.me/v2/bot/message/push";
const DEFAULT_PORT: u16 = 8787;
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Channel access token used as the bearer secret for the LINE push API.
///
/// Never printed: `Debug` is redacted and there is no `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub channel_access_token: Option<Credential>,
    pub push_endpoint: Url,
    pub upstream_timeout: Duration,
    /// Shared secret guarding the relay routes. `None` leaves them open.
    pub api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let push_endpoint = non_empty("LINE_PUSH_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_PUSH_ENDPOINT.to_string());
        let push_endpoint = Url::parse(&push_endpoint)
            .with_context(|| format!("LINE_PUSH_ENDPOINT is not a valid URL: {push_endpoint}"))?;

        let timeout_secs = try_load(
            &lookup,
            "RELAY_UPSTREAM_TIMEOUT_SECS",
            DEFAULT_UPSTREAM_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            anyhow::bail!("RELAY_UPSTREAM_TIMEOUT_SECS must be at least 1");
        }

        Ok(Self {
            port: try_load(&lookup, "RELAY_PORT", DEFAULT_PORT)?,
            channel_access_token: non_empty("LINE_CHANNEL_ACCESS_TOKEN")
                .map(|token| Credential::new(token.trim())),
            push_endpoint,
            upstream_timeout: Duration::from_secs(timeout_secs),
            api_key: non_empty("RELAY_API_KEY"),
        })
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + fmt::Display,
    T::Err: fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {key} value {raw:?}: {e}")),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
