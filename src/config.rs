//! Process configuration read from the environment

use crate::responder::DEFAULT_RESPONSE_DELAY;
use crate::session::DEFAULT_GREETING;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(30 * 60);

/// Configuration for the assistant server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantConfig {
    pub port: u16,
    /// Latency of the simulated responder
    pub response_delay: Duration,
    /// Seeded assistant entry of every new session
    pub greeting: String,
    /// When set, replies come from this HTTP backend instead of the simulator
    pub backend_url: Option<String>,
    pub backend_timeout: Option<Duration>,
    /// Sessions untouched this long with no open stream are ended
    pub session_idle_timeout: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            response_delay: DEFAULT_RESPONSE_DELAY,
            greeting: DEFAULT_GREETING.to_string(),
            backend_url: None,
            backend_timeout: None,
            session_idle_timeout: DEFAULT_SESSION_IDLE,
        }
    }
}

impl AssistantConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            port: parse_or(get("AURORA_PORT"), "AURORA_PORT", defaults.port),
            response_delay: Duration::from_millis(parse_or(
                get("AURORA_RESPONSE_DELAY_MS"),
                "AURORA_RESPONSE_DELAY_MS",
                u64::try_from(defaults.response_delay.as_millis()).unwrap_or(1000),
            )),
            greeting: get("AURORA_GREETING").unwrap_or(defaults.greeting),
            backend_url: get("AURORA_BACKEND_URL"),
            backend_timeout: get("AURORA_BACKEND_TIMEOUT_SECS")
                .and_then(|raw| parse_value::<u64>(&raw, "AURORA_BACKEND_TIMEOUT_SECS"))
                .map(Duration::from_secs),
            session_idle_timeout: Duration::from_secs(parse_or(
                get("AURORA_SESSION_IDLE_SECS"),
                "AURORA_SESSION_IDLE_SECS",
                defaults.session_idle_timeout.as_secs(),
            )),
        }
    }
}

fn parse_or<T: FromStr + Copy>(raw: Option<String>, key: &str, default: T) -> T {
    raw.and_then(|raw| parse_value(&raw, key)).unwrap_or(default)
}

fn parse_value<T: FromStr>(raw: &str, key: &str) -> Option<T> {
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key = %key, value = %raw, "Ignoring invalid config value");
            None
        }
    }
}
