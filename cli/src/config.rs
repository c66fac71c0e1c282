//! Where the CLI talks to and where it keeps its token.
//!
//! Resolution order: command-line flag, then the process environment (which
//! `main` has already topped up from `.env` via dotenvy), then the defaults
//! below.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://localhost:5026";
pub const DEFAULT_TOKEN_FILE: &str = ".crm-token";

pub const BASE_URL_VAR: &str = "CRM_BASE_URL";
pub const TOKEN_FILE_VAR: &str = "CRM_TOKEN_FILE";
/// Whole-request timeout in seconds; `0` or unset means none.
pub const TIMEOUT_VAR: &str = "CRM_TIMEOUT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub base_url: String,
    pub token_file: PathBuf,
    pub timeout: Option<Duration>,
}

impl CliConfig {
    /// Resolve against the real process environment.
    pub fn from_env(base_url: Option<String>, token_file: Option<PathBuf>, timeout_secs: Option<u64>) -> Self {
        Self::resolve(base_url, token_file, timeout_secs, |key| std::env::var(key).ok())
    }

    /// An environment timeout that is not a whole number of seconds is
    /// ignored.
    pub fn resolve(
        base_url: Option<String>,
        token_file: Option<PathBuf>,
        timeout_secs: Option<u64>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let non_empty = |value: String| (!value.trim().is_empty()).then_some(value);
        let base_url = base_url
            .and_then(non_empty)
            .or_else(|| env(BASE_URL_VAR).and_then(non_empty))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let token_file = token_file
            .or_else(|| env(TOKEN_FILE_VAR).and_then(non_empty).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE));
        let timeout = timeout_secs
            .or_else(|| env(TIMEOUT_VAR).and_then(|v| v.trim().parse().ok()))
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token_file,
            timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults() {
        let config = CliConfig::resolve(None, None, None, no_env);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.token_file, PathBuf::from(DEFAULT_TOKEN_FILE));
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn env_overrides_defaults() {
        let env = |key: &str| match key {
            BASE_URL_VAR => Some("http://api.local/".to_string()),
            TOKEN_FILE_VAR => Some("/tmp/tok".to_string()),
            TIMEOUT_VAR => Some(" 30 ".to_string()),
            _ => None,
        };
        let config = CliConfig::resolve(None, None, None, env);
        assert_eq!(config.base_url, "http://api.local");
        assert_eq!(config.token_file, PathBuf::from("/tmp/tok"));
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn flags_override_env() {
        let env = |key: &str| match key {
            TIMEOUT_VAR => Some("30".to_string()),
            _ => Some("http://from-env".to_string()),
        };
        let config = CliConfig::resolve(
            Some("http://from-flag".to_string()),
            Some(PathBuf::from("flag-token")),
            Some(5),
            env,
        );
        assert_eq!(config.base_url, "http://from-flag");
        assert_eq!(config.token_file, PathBuf::from("flag-token"));
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn blank_values_fall_through() {
        let env = |_: &str| Some("  ".to_string());
        let config = CliConfig::resolve(Some(String::new()), None, None, env);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.token_file, PathBuf::from(DEFAULT_TOKEN_FILE));
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn zero_or_malformed_timeout_means_none() {
        let env = |_: &str| Some("soon".to_string());
        assert_eq!(CliConfig::resolve(None, None, None, env).timeout, None);
        assert_eq!(CliConfig::resolve(None, None, Some(0), no_env).timeout, None);
    }
}
