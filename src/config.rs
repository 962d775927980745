//! Configuration file and token resolution.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Name of the optional per-repository config file.
pub const CONFIG_FILE: &str = ".todo2issue.toml";

/// Top-level configuration loaded from `.todo2issue.toml`.
///
/// Every field is optional; the tool works with zero config.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    /// Line break used when joining issue body lines. `"\n\n"` renders
    /// multi-line annotations as separate paragraphs.
    #[serde(default = "default_line_break")]
    pub line_break: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// API token. Falls back to `GITHUB_TOKEN`, then `INPUT_TOKEN`.
    pub token: Option<String>,
}

fn default_line_break() -> String {
    "\n".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            github: GitHubConfig::default(),
            line_break: default_line_break(),
        }
    }
}

impl Config {
    /// Load the config file from `dir`, or defaults when absent.
    pub fn load(dir: &Path) -> Result<Config> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Resolve the API token: the config value first, then `GITHUB_TOKEN`,
    /// then `INPUT_TOKEN`.
    pub fn token(&self) -> Result<String> {
        self.github
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .or_else(|| std::env::var("INPUT_TOKEN").ok())
            .ok_or(Error::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.github.token.is_none());
        assert_eq!(config.line_break, "\n");
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
line_break = "\n\n"

[github]
token = "t0ken"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.line_break, "\n\n");
        assert_eq!(config.github.token.as_deref(), Some("t0ken"));
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.line_break, "\n");
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[github]\ntoken = \"abc\"\n").unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.github.token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_token_from_config() {
        let config = Config {
            github: GitHubConfig {
                token: Some("abc".to_string()),
            },
            line_break: "\n".to_string(),
        };
        assert_eq!(config.token().unwrap(), "abc");
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "line_break = [1, 2]\n").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }
}
