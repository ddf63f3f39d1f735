//! Client settings from the environment.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use quickorder_core::UserId;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_USER_ID: &str = "anonymous";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub auth_token: Option<String>,
    pub user_id: UserId,
    pub timeout: Duration,
    /// Directory of the local layout cache.
    pub cache_dir: PathBuf,
}

impl ClientConfig {
    /// Read `QUICKORDER_*` variables; unset ones take their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_url = var("QUICKORDER_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let timeout_secs = match var("QUICKORDER_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("QUICKORDER_TIMEOUT_SECS must be a number of seconds, got '{raw}'"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let cache_dir = match var("QUICKORDER_CACHE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_cache_dir()?,
        };

        Ok(Self {
            api_url,
            auth_token: var("QUICKORDER_AUTH_TOKEN"),
            user_id: UserId::new(var("QUICKORDER_USER_ID").unwrap_or_else(|| DEFAULT_USER_ID.to_string())),
            timeout: Duration::from_secs(timeout_secs),
            cache_dir,
        })
    }
}

/// `{local_data_dir}/quickorder`, falling back to `~/.local/share/quickorder`.
fn default_cache_dir() -> Result<PathBuf> {
    let mut dir = dirs::data_local_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve a local data directory for the layout cache")?;
    dir.push("quickorder");
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ClientConfig> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ClientConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[("QUICKORDER_CACHE_DIR", "/tmp/qo")]).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.auth_token, None);
        assert_eq!(config.user_id, UserId::new("anonymous"));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/qo"));
    }

    #[test]
    fn overrides_are_read_and_trimmed() {
        let config = config(&[
            ("QUICKORDER_API_URL", "https://tms.example.com/api/"),
            ("QUICKORDER_AUTH_TOKEN", " abc "),
            ("QUICKORDER_USER_ID", "planner-7"),
            ("QUICKORDER_TIMEOUT_SECS", "5"),
            ("QUICKORDER_CACHE_DIR", "/tmp/qo"),
        ])
        .unwrap();
        assert_eq!(config.api_url, "https://tms.example.com/api");
        assert_eq!(config.auth_token.as_deref(), Some("abc"));
        assert_eq!(config.user_id.as_str(), "planner-7");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_timeout_is_an_error() {
        let err = config(&[("QUICKORDER_TIMEOUT_SECS", "soon"), ("QUICKORDER_CACHE_DIR", "/tmp")]).unwrap_err();
        assert!(err.to_string().contains("QUICKORDER_TIMEOUT_SECS"));
    }
}
