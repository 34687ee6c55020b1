use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

const ACCESS_TOKEN_KEY: &str = "trakt_access_token";
const REFRESH_TOKEN_KEY: &str = "trakt_refresh_token";
const TOKEN_EXPIRES_KEY: &str = "trakt_token_expires";

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

/// Flat key/value file holding OAuth tokens between runs
pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.credentials.remove(key);
    }

    pub fn get_trakt_access_token(&self) -> Option<&String> {
        self.get(ACCESS_TOKEN_KEY)
    }

    pub fn set_trakt_access_token(&mut self, token: String) {
        self.set(ACCESS_TOKEN_KEY.to_string(), token);
    }

    pub fn get_trakt_refresh_token(&self) -> Option<&String> {
        self.get(REFRESH_TOKEN_KEY)
    }

    pub fn set_trakt_refresh_token(&mut self, token: String) {
        self.set(REFRESH_TOKEN_KEY.to_string(), token);
    }

    pub fn get_trakt_token_expires(&self) -> Option<DateTime<Utc>> {
        self.get(TOKEN_EXPIRES_KEY)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn set_trakt_token_expires(&mut self, expires: DateTime<Utc>) {
        self.set(TOKEN_EXPIRES_KEY.to_string(), expires.to_rfc3339());
    }

    /// Drop every Trakt token, keeping any other keys
    pub fn clear_trakt_tokens(&mut self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TOKEN_EXPIRES_KEY] {
            self.remove(key);
        }
    }

    /// Access token, unless it is known to have expired
    pub fn valid_trakt_access_token(&self) -> Option<&String> {
        match self.get_trakt_token_expires() {
            Some(expires_at) if expires_at <= Utc::now() => None,
            _ => self.get_trakt_access_token(),
        }
    }

    pub fn get_all_keys(&self) -> Vec<String> {
        self.credentials.keys().cloned().collect()
    }
}
