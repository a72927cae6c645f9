//! Configuration loaded from `glassline.toml`.
//!
//! Every field has a default, so the file is optional. `GLASSLINE_BASE_URL`
//! and `GLASSLINE_API_TOKEN` take precedence over the file.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::erp::{Anonymous, CredentialProvider, DEFAULT_BASE_URL, StaticToken, Timeouts, TokenFile};

/// Top-level configuration loaded from `glassline.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GlasslineConfig {
    /// Root of the ERP REST API, e.g. `https://erp.example.com/api`.
    pub base_url: String,

    /// Bearer token. Wins over `token_file` when both are set.
    pub api_token: String,

    /// File holding the bearer token, re-read on every request.
    pub token_file: Option<PathBuf>,

    /// Letterhead on printed tags and reports.
    pub organization_name: String,

    pub connect_timeout_secs: u64,

    pub request_timeout_secs: u64,

    /// Where printable documents are written.
    pub spool_dir: PathBuf,

    /// Program that opens spooled documents (`xdg-open`, `open`, a browser).
    pub print_command: Option<String>,
}

impl Default for GlasslineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: String::new(),
            token_file: None,
            organization_name: "Glass Manufacturing Co.".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            spool_dir: PathBuf::from("print-spool"),
            print_command: None,
        }
    }
}

impl GlasslineConfig {
    /// Loads `glassline.toml` from the current directory, falling back to
    /// defaults when it does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("glassline.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str::<GlasslineConfig>(&contents)
                .with_context(|| format!("invalid config in {}", path.display()))?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var("GLASSLINE_BASE_URL")
            && !url.is_empty()
        {
            config.base_url = url;
        }
        if let Ok(token) = std::env::var("GLASSLINE_API_TOKEN")
            && !token.is_empty()
        {
            config.api_token = token;
        }

        Ok(config)
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            connect: Duration::from_secs(self.connect_timeout_secs),
            request: Duration::from_secs(self.request_timeout_secs),
        }
    }

    /// The credential source the client should use.
    pub fn credentials(&self) -> Arc<dyn CredentialProvider> {
        if !self.api_token.trim().is_empty() {
            Arc::new(StaticToken::new(self.api_token.trim()))
        } else if let Some(path) = &self.token_file {
            Arc::new(TokenFile::new(path))
        } else {
            Arc::new(Anonymous)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = GlasslineConfig::default();
        assert_eq!(config.base_url, "http://localhost:5000/api");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.spool_dir, PathBuf::from("print-spool"));
        assert!(config.api_token.is_empty());
        assert!(config.print_command.is_none());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            base_url = "https://erp.example.com/api"
            organization_name = "Shree Glass Works"
            print_command = "xdg-open"
        "#;
        let config: GlasslineConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.base_url, "https://erp.example.com/api");
        assert_eq!(config.organization_name, "Shree Glass Works");
        assert_eq!(config.print_command.as_deref(), Some("xdg-open"));
        assert_eq!(config.connect_timeout_secs, 10);
    }

    #[test]
    fn load_from_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GlasslineConfig::load_from(&dir.path().join("glassline.toml")).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn load_from_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glassline.toml");
        std::fs::write(&path, "request_timeout_secs = \"soon\"").unwrap();
        assert!(GlasslineConfig::load_from(&path).is_err());
    }

    #[test]
    fn token_wins_over_token_file() {
        let config = GlasslineConfig {
            api_token: " abc ".into(),
            token_file: Some(PathBuf::from("/nonexistent")),
            ..Default::default()
        };
        assert_eq!(
            config.credentials().bearer_token().unwrap().as_deref(),
            Some("abc")
        );

        let anonymous = GlasslineConfig::default();
        assert_eq!(anonymous.credentials().bearer_token().unwrap(), None);
    }
}
