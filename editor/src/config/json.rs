use std::{fs, io, path::PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// The optional `editor.json` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub log_path: Option<PathBuf>,
}

/// Reads a [`FileConfig`] from `path`.
///
/// # Returns
/// `None` if the file does not exist.
///
/// # Errors
/// Returns an error if the file can't be read or is not valid json.
pub fn load(path: &str) -> Result<Option<FileConfig>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("cannot read '{path}'")),
    };

    parse(&content)
        .map(Some)
        .with_context(|| format!("invalid config in '{path}'"))
}

fn parse(content: &str) -> serde_json::Result<FileConfig> {
    serde_json::from_str(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_an_error() {
        assert_eq!(load("definitely/not/here/editor.json").unwrap(), None);
    }

    #[test]
    fn parses_partial_files() {
        let config = parse(r#"{ "api_url": "http://10.0.0.2:5000/api" }"#).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("http://10.0.0.2:5000/api"));
        assert_eq!(config.email, None);
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(parse(r#"{ "apiUrl": "x" }"#).is_err());
    }
}
