use serde::{Deserialize, Serialize};
use std::path::Path;
use trakt_feed_models::{ContentCategory, IdScheme};

pub const DEFAULT_API_BASE_URL: &str = "https://api.trakt.tv";

const PLACEHOLDER_CLIENT_ID: &str = "YOUR_CLIENT_ID";
const PLACEHOLDER_CLIENT_SECRET: &str = "YOUR_CLIENT_SECRET";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub trakt: TraktConfig,
    #[serde(default)]
    pub feed: FeedOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraktConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Whose public watchlist/history to read when no token is stored
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

/// How fetched items are rendered
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedOptions {
    #[serde(default)]
    pub id_scheme: IdScheme,
    #[serde(default = "default_true")]
    pub include_media_kind: bool,
    #[serde(default)]
    pub include_title: bool,
    #[serde(default)]
    pub default_category: ContentCategory,
}

fn default_true() -> bool {
    true
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for TraktConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            user_name: None,
            api_base_url: default_api_base_url(),
        }
    }
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            id_scheme: IdScheme::default(),
            include_media_kind: default_true(),
            include_title: false,
            default_category: ContentCategory::default(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads the file if present, otherwise starts from defaults
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.has_client_id() {
            return Err(anyhow::anyhow!("Trakt client_id is not configured"));
        }

        let base = self.trakt.api_base_url.trim();
        if !(base.starts_with("https://") || base.starts_with("http://")) {
            return Err(anyhow::anyhow!("api_base_url must be an http(s) URL: {}", base));
        }

        Ok(())
    }

    pub fn has_client_id(&self) -> bool {
        let id = self.trakt.client_id.trim();
        !id.is_empty() && id != PLACEHOLDER_CLIENT_ID
    }

    /// Client secret is only needed for the OAuth flows
    pub fn is_oauth_configured(&self) -> bool {
        let secret = self.trakt.client_secret.trim();
        self.has_client_id() && !secret.is_empty() && secret != PLACEHOLDER_CLIENT_SECRET
    }
}
