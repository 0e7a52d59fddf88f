//! Application configuration and constants.

use std::path::{Path, PathBuf};

use reqwest::Url;

use crate::error::ConfigError;

/// Environment variable holding the generation service base URL
pub const BACKEND_URL_ENV: &str = "CODEBUDDY_BACKEND_URL";

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

pub const DEFAULT_PROJECT_NAME: &str = "my_project";

pub struct Config {
    /// Main loop tick rate in milliseconds (target 60 FPS = ~16ms)
    pub tick_rate_ms: u64,

    /// How many ticks to show notices (180 = ~3s at 60fps)
    pub notice_timeout_ticks: u64,

    /// Modulo for animation frame counter
    pub animation_frame_mod: usize,

    /// Width of the sidebar in characters
    pub sidebar_width: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_rate_ms: 16,
            notice_timeout_ticks: 180,
            animation_frame_mod: 360,
            sidebar_width: 26,
        }
    }
}

/// Where the generation service lives. Resolved once at startup and handed
/// to the client; nothing reads the environment after that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    base_url: Url,
}

impl ServiceConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };

        let url = Url::parse(base_url.trim()).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(Self { base_url: url }),
            other => Err(invalid(format!("unsupported scheme '{}'", other))),
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn generate_url(&self) -> String {
        self.endpoint("generate")
    }

    pub fn health_url(&self) -> String {
        self.endpoint("health")
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }
}

/// Check the directory archives are saved into.
pub fn resolve_output_dir(dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    let dir = dir.unwrap_or_else(|| PathBuf::from("."));
    if is_dir(&dir) {
        Ok(dir)
    } else {
        Err(ConfigError::OutputDirMissing(dir.display().to_string()))
    }
}

fn is_dir(path: &Path) -> bool {
    path.metadata().map(|m| m.is_dir()).unwrap_or(false)
}

/// Global commands list
pub const COMMANDS: &[(&str, &str)] = &[
    ("/help", "Show available commands"),
    ("/clear", "Clear prompt and status"),
    ("/name", "Set project name"),
    ("/quit", "Exit CodeBuddy"),
];

/// Prompt ideas shown under the input box
pub const EXAMPLE_PROMPTS: &[&str] = &[
    "React TODO with Firebase auth",
    "Flask blog with Postgres and Dockerfile",
    "Full-stack e-commerce with Stripe",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_url_joins_path() {
        let config = ServiceConfig::new("http://localhost:5000").unwrap();
        assert_eq!(config.generate_url(), "http://localhost:5000/generate");
        assert_eq!(config.health_url(), "http://localhost:5000/health");
    }

    #[test]
    fn test_generate_url_keeps_base_path() {
        let config = ServiceConfig::new("https://api.example.com/codebuddy/").unwrap();
        assert_eq!(
            config.generate_url(),
            "https://api.example.com/codebuddy/generate"
        );
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(matches!(
            ServiceConfig::new("not a url"),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            ServiceConfig::new("ftp://example.com"),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn test_output_dir_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            resolve_output_dir(Some(dir.path().to_path_buf())).unwrap(),
            dir.path()
        );
        assert!(resolve_output_dir(Some(dir.path().join("missing"))).is_err());
    }
}
