mod json;

use std::{env, path::PathBuf};

use anyhow::Result;

pub use json::FileConfig;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/api";
pub const DEFAULT_CONFIG_PATH: &str = "editor.json";
pub const DEFAULT_LOG_PATH: &str = "editor.log";

pub const CONFIG_ENV: &str = "EDITOR_CONFIG";
pub const API_URL_ENV: &str = "MODEL_API_URL";
pub const LOG_ENV: &str = "EDITOR_LOG";

/// Settings of one editor session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    pub api_url: String,
    /// Prefills the login form.
    pub email: Option<String>,
    pub log_path: PathBuf,
}

impl EditorConfig {
    /// Loads the config file and applies environment overrides.
    ///
    /// A missing config file is not an error.
    ///
    /// # Errors
    /// Returns an error if the config file exists but can't be read or parsed.
    pub fn load() -> Result<Self> {
        let path = env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let file = json::load(&path)?.unwrap_or_default();

        Ok(Self::from_sources(file, |key| env::var(key).ok()))
    }

    /// Merges the sources, environment first, then file, then defaults.
    ///
    /// # Arguments
    /// * `file` - Values read from the config file.
    /// * `env` - Looks up an environment variable, empty values count as unset.
    pub fn from_sources(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let api_url = env(API_URL_ENV)
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let log_path = env(LOG_ENV)
            .map(PathBuf::from)
            .or(file.log_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH));

        Self {
            api_url,
            email: file.email,
            log_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_sources() {
        let config = EditorConfig::from_sources(FileConfig::default(), env_of(&[]));

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.log_path, PathBuf::from(DEFAULT_LOG_PATH));
        assert_eq!(config.email, None);
    }

    #[test]
    fn environment_beats_file() {
        let file = FileConfig {
            api_url: Some("http://file/api".into()),
            email: Some("ann@example.com".into()),
            log_path: Some("file.log".into()),
        };
        let config = EditorConfig::from_sources(
            file,
            env_of(&[(API_URL_ENV, "http://env/api"), (LOG_ENV, "")]),
        );

        assert_eq!(config.api_url, "http://env/api");
        assert_eq!(config.log_path, PathBuf::from("file.log"));
        assert_eq!(config.email.as_deref(), Some("ann@example.com"));
    }
}
