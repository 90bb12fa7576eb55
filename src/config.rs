//! Service configuration from environment variables.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `BIND_ADDR` | `0.0.0.0` | listen address |
//! | `PORT` | `8080` | listen port |
//! | `ORDER_API_URL` | unset | mirror orders to this remote order resource |
//! | `ORDER_API_TIMEOUT_MS` | `5000` | per-request timeout for the remote |
//! | `ORDER_API_RETRIES` | `2` | extra attempts after a retryable failure |
//! | `ORDER_API_BACKOFF_MS` | `200` | linear backoff step between attempts |
//! | `STRICT_TRANSITIONS` | `true` | `false` lets any status overwrite any other |
//!
//! Unparseable values fall back to the default.

use std::str::FromStr;
use std::time::Duration;

use crate::gateway::RemoteConfig;
use crate::lifecycle::TransitionPolicy;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    pub bind_addr: String,
    pub port: u16,
    /// `None` means in-memory only.
    pub remote: Option<RemoteConfig>,
    pub policy: TransitionPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".into(),
            port: 8080,
            remote: None,
            policy: TransitionPolicy::Strict,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        let remote = lookup("ORDER_API_URL")
            .filter(|url| !url.trim().is_empty())
            .map(|url| {
                let mut remote = RemoteConfig::new(url.trim());
                if let Some(ms) = parsed("ORDER_API_TIMEOUT_MS") {
                    remote.timeout = Duration::from_millis(ms);
                }
                if let Some(n) = parsed("ORDER_API_RETRIES") {
                    remote.retries = u32::try_from(n).unwrap_or(u32::MAX);
                }
                if let Some(ms) = parsed("ORDER_API_BACKOFF_MS") {
                    remote.backoff = Duration::from_millis(ms);
                }
                remote
            });

        let strict = lookup("STRICT_TRANSITIONS")
            .map(|v| !(v == "0" || v.eq_ignore_ascii_case("false")))
            .unwrap_or(true);

        Self {
            bind_addr: lookup("BIND_ADDR")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.bind_addr),
            port: lookup("PORT")
                .and_then(|s| u16::from_str(s.trim()).ok())
                .unwrap_or(defaults.port),
            remote,
            policy: TransitionPolicy::from_strict(strict),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}
