use std::env;

use crate::contextual::roster::error::{Result, ToolError};

/// Environment variable holding the bearer credential.
pub const API_KEY_VAR: &str = "CONTEXTUAL_API_KEY";
/// Optional override of the API root.
pub const BASE_URL_VAR: &str = "CONTEXTUAL_API_BASE_URL";
/// Optional per-request timeout in seconds.
pub const TIMEOUT_VAR: &str = "CONTEXTUAL_HTTP_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "https://api.contextual.ai/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings resolved once at startup.
#[derive(Clone)]
pub struct Settings {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds settings from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(API_KEY_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ToolError::MissingCredential(API_KEY_VAR))?;

        let base_url = lookup(BASE_URL_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = match lookup(TIMEOUT_VAR) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ToolError::InvalidSetting {
                    name: TIMEOUT_VAR,
                    value,
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            base_url,
            timeout_secs,
        })
    }
}
