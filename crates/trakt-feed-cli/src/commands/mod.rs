pub mod auth;
pub mod clear;
pub mod config;
pub mod fetch;
pub mod invoke;
pub mod prompts;

use crate::output::Output;
use color_eyre::Result;
use owo_colors::OwoColorize;
use std::sync::Arc;
use trakt_feed_config::{Config, CredentialStore, PathManager};
use trakt_feed_sources::{ContentRouter, HttpTransport, NormalizeOptions, ReqwestTransport, TraktAuth};

/// Config file contents, or defaults when no file has been written yet
pub fn load_config(path_manager: &PathManager) -> Result<Config> {
    let config_file = path_manager.config_file();
    Config::load_or_default(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))
}

pub fn load_credentials(path_manager: &PathManager) -> Result<CredentialStore> {
    let mut store = CredentialStore::new(path_manager.credentials_file());
    store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;
    Ok(store)
}

pub fn http_transport() -> Arc<dyn HttpTransport> {
    Arc::new(ReqwestTransport::new())
}

pub fn build_router(config: &Config, options: NormalizeOptions) -> ContentRouter {
    ContentRouter::new(http_transport(), config.trakt.api_base_url.clone()).with_options(options)
}

pub fn build_auth(config: &Config) -> TraktAuth {
    TraktAuth::new(http_transport(), config.trakt.api_base_url.clone())
}

/// Normalization settings from the `[feed]` section
pub fn normalize_options(config: &Config) -> NormalizeOptions {
    NormalizeOptions {
        id_scheme: config.feed.id_scheme,
        media_kind: config.feed.include_media_kind,
        title: config.feed.include_title,
    }
}

/// Treat placeholder and blank values as unset
pub fn configured(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.starts_with("YOUR_") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// Formatting helpers

/// Print a formatted section header
pub fn print_section_header(title: &str, output: &Output) {
    output.println("");
    output.println(format!("{}", title.bold().bright_cyan()));
    output.println(format!("{}", "─".repeat(title.chars().count()).bright_cyan()));
}

/// Print a numbered instruction list
pub fn print_instruction_list(items: &[&str], output: &Output) {
    for (idx, item) in items.iter().enumerate() {
        output.println(format!("  {}. {}", idx + 1, item));
    }
}

/// Print OAuth progress message
pub fn print_oauth_progress(message: &str, output: &Output) {
    output.println(format!("{} {}", "→".bright_blue(), message.bright_white()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_rejects_placeholders() {
        assert_eq!(configured("  abc123  "), Some("abc123".to_string()));
        assert_eq!(configured(""), None);
        assert_eq!(configured("   "), None);
        assert_eq!(configured("YOUR_CLIENT_ID"), None);
    }

    #[test]
    fn test_normalize_options_follow_feed_section() {
        let mut config = Config::default();
        config.feed.include_title = true;
        config.feed.include_media_kind = false;

        let options = normalize_options(&config);
        assert!(options.title);
        assert!(!options.media_kind);
        assert_eq!(options.id_scheme, config.feed.id_scheme);
    }
}
