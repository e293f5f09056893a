//! Configuration types for tableau-grants
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use crate::util::SecretString;
use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Tableau connection settings
    pub tableau: TableauConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Tableau connection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TableauConfig {
    /// Tableau server URL (e.g., `https://tableau.example.com`)
    pub url: String,

    /// REST API version (default: "3.19")
    pub api_version: String,

    /// Site content URL used for sign-in; empty selects the default site
    pub site: String,

    /// Site LUID, required together with a pre-issued `token`
    pub site_id: Option<String>,

    /// Pre-issued `X-Tableau-Auth` session token
    pub token: Option<SecretString>,

    /// Personal access token name
    pub token_name: Option<String>,

    /// Personal access token secret (prefer env var TABLEAU_TOKEN_SECRET)
    pub token_secret: Option<SecretString>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Whether to verify SSL certificates
    pub verify_ssl: bool,
}

impl Default for TableauConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_version: "3.19".to_string(),
            site: String::new(),
            site_id: None,
            token: None,
            token_name: None,
            token_secret: None,
            timeout_secs: 30,
            verify_ssl: true,
        }
    }
}

impl TableauConfig {
    /// Get the full API base URL
    pub fn api_url(&self) -> String {
        format!(
            "{}/api/{}",
            self.url.trim_end_matches('/'),
            self.api_version
        )
    }

    /// Get the site-scoped API base URL for a site LUID
    pub fn site_url(&self, site_id: &str) -> String {
        format!("{}/sites/{}", self.api_url(), site_id)
    }

    /// Whether personal access token credentials are configured
    pub fn has_pat(&self) -> bool {
        self.token_name.as_deref().is_some_and(|n| !n.is_empty()) && self.token_secret.is_some()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}
