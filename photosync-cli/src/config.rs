use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the CLI, loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,
    #[serde(default)]
    pub google: GoogleConfig,
}

/// OAuth and API settings for the managed photo library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_auth_endpoint")]
    pub auth_endpoint: String,
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_scope")]
    pub scope: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_url: default_catalog_url(),
            google: GoogleConfig::default(),
        }
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            auth_endpoint: default_auth_endpoint(),
            token_endpoint: default_token_endpoint(),
            client_id: String::new(),
            client_secret: String::new(),
            refresh_token: String::new(),
            redirect_uri: default_redirect_uri(),
            scope: default_scope(),
        }
    }
}

impl Config {
    /// Load the config from `path`, or from the default location when no
    /// path is given. A missing file at the default location yields the
    /// built-in defaults so read-only commands still work.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path).await,
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::load_from_file(&path).await
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub async fn load_from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("photosync")
            .join("config.yaml")
    }
}

fn default_catalog_url() -> String {
    "http://localhost:8090".to_string()
}

fn default_api_base() -> String {
    "https://photoslibrary.googleapis.com/v1".to_string()
}

fn default_auth_endpoint() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".to_string()
}

fn default_token_endpoint() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_redirect_uri() -> String {
    "http://127.0.0.1:8080/oauth/callback".to_string()
}

fn default_scope() -> String {
    "https://www.googleapis.com/auth/photoslibrary".to_string()
}
