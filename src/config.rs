use std::path::PathBuf;

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BIND: &str = "0.0.0.0:5000";
pub const DEFAULT_LANG: &str = "en";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Which "no transcript" strategy this deployment runs. Exactly one is
/// active; they are alternatives, not layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackKind {
    /// Summarize from the raw title alone (response flagged speculative).
    TitleEcho,
    /// YouTube Data API v3 search (requires YOUTUBE_API_KEY).
    SearchApi,
    /// Unauthenticated scrape of the results page.
    #[default]
    Scrape,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub bind: Option<String>,
    pub default_lang: Option<String>,
    pub fallback: Option<FallbackKind>,
    pub model: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    /// Load config from ~/.config/ytsum/config.toml if it exists.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytsum")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
bind = "127.0.0.1:8080"
default_lang = "es"
fallback = "search-api"
model = "gemini-2.0-flash"
request_timeout_secs = 15
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.bind.as_deref(), Some("127.0.0.1:8080"));
        assert_eq!(config.default_lang.as_deref(), Some("es"));
        assert_eq!(config.fallback, Some(FallbackKind::SearchApi));
        assert_eq!(config.model.as_deref(), Some("gemini-2.0-flash"));
        assert_eq!(config.request_timeout_secs, Some(15));
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.bind.is_none());
        assert!(config.fallback.is_none());
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = toml::from_str(r#"fallback = "title-echo""#).unwrap();
        assert_eq!(config.fallback, Some(FallbackKind::TitleEcho));
        assert!(config.model.is_none());
    }

    #[test]
    fn test_default_fallback_is_scrape() {
        assert_eq!(FallbackKind::default(), FallbackKind::Scrape);
    }
}
