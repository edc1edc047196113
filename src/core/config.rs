use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

/// Path of the chat function relative to the backend host.
pub const CHAT_FUNCTION_PATH: &str = "/functions/v1/study-assistant";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_hostname: String,
    pub api_key: String,
    pub subject: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_hostname: "http://127.0.0.1:54321".to_string(),
            api_key: String::new(),
            subject: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60 * 5),
            idle_timeout: Duration::from_secs(60),
        }
    }
}

impl AppConfig {
    /// Reads `STUDY_ASSISTANT_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup, falling back to defaults for
    /// anything missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let secs = |key: &str, default: Duration| -> Result<Duration> {
            match lookup(key) {
                Some(v) => {
                    let n = v
                        .trim()
                        .parse::<u64>()
                        .with_context(|| format!("Invalid value for {}: {:?}", key, v))?;
                    Ok(Duration::from_secs(n))
                }
                None => Ok(default),
            }
        };

        Ok(Self {
            api_hostname: lookup("STUDY_ASSISTANT_URL").unwrap_or(defaults.api_hostname),
            api_key: lookup("STUDY_ASSISTANT_KEY").unwrap_or(defaults.api_key),
            subject: lookup("STUDY_ASSISTANT_SUBJECT").filter(|s| !s.trim().is_empty()),
            connect_timeout: secs(
                "STUDY_ASSISTANT_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout,
            )?,
            request_timeout: secs(
                "STUDY_ASSISTANT_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout,
            )?,
            idle_timeout: secs("STUDY_ASSISTANT_IDLE_TIMEOUT_SECS", defaults.idle_timeout)?,
        })
    }

    pub fn chat_url(&self) -> String {
        format!(
            "{}{}",
            self.api_hostname.trim_end_matches("/"),
            CHAT_FUNCTION_PATH
        )
    }
}
