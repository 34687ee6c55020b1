use super::load_credentials;
use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use serde_json::json;
use trakt_feed_config::{Config, PathManager};

pub fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(full, output),
        ConfigCommands::Set {
            client_id,
            client_secret,
            user,
            api_base_url,
            id_scheme,
            include_media_kind,
            include_title,
            default_category,
        } => {
            let path_manager = PathManager::default();
            let config_file = path_manager.config_file();
            let mut config = Config::load_or_default(&config_file)
                .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

            let changes = ConfigChanges {
                client_id,
                client_secret,
                user,
                api_base_url,
                id_scheme,
                include_media_kind,
                include_title,
                default_category,
            };
            if changes.is_empty() {
                output.warn("Nothing to change. See 'traktfeed config set --help'.");
                return Ok(());
            }
            changes.apply(&mut config);

            if let Err(e) = config.validate() {
                output.warn(format!("Configuration is incomplete: {}", e));
            }

            path_manager
                .ensure_directories()
                .map_err(|e| color_eyre::eyre::eyre!("Failed to create {}: {}", path_manager.config_dir().display(), e))?;
            config
                .save_to_file(&config_file)
                .map_err(|e| color_eyre::eyre::eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

            output.success(format!("Configuration saved to {}", config_file.display()));
            Ok(())
        }
    }
}

struct ConfigChanges {
    client_id: Option<String>,
    client_secret: Option<String>,
    user: Option<String>,
    api_base_url: Option<String>,
    id_scheme: Option<trakt_feed_models::IdScheme>,
    include_media_kind: Option<bool>,
    include_title: Option<bool>,
    default_category: Option<trakt_feed_models::ContentCategory>,
}

impl ConfigChanges {
    fn is_empty(&self) -> bool {
        self.client_id.is_none()
            && self.client_secret.is_none()
            && self.user.is_none()
            && self.api_base_url.is_none()
            && self.id_scheme.is_none()
            && self.include_media_kind.is_none()
            && self.include_title.is_none()
            && self.default_category.is_none()
    }

    fn apply(self, config: &mut Config) {
        if let Some(id) = self.client_id {
            config.trakt.client_id = id.trim().to_string();
        }
        if let Some(secret) = self.client_secret {
            config.trakt.client_secret = secret.trim().to_string();
        }
        if let Some(user) = self.user {
            let user = user.trim();
            config.trakt.user_name = if user.is_empty() { None } else { Some(user.to_string()) };
        }
        if let Some(url) = self.api_base_url {
            config.trakt.api_base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(scheme) = self.id_scheme {
            config.feed.id_scheme = scheme;
        }
        if let Some(include) = self.include_media_kind {
            config.feed.include_media_kind = include;
        }
        if let Some(include) = self.include_title {
            config.feed.include_title = include;
        }
        if let Some(category) = self.default_category {
            config.feed.default_category = category;
        }
    }
}

fn show_config(full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Run 'traktfeed config set --client-id <ID>' to create it.");
        return Ok(());
    }

    let config = Config::load_from_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    let store = load_credentials(&path_manager)?;

    let client_id = if full { config.trakt.client_id.clone() } else { mask_string(&config.trakt.client_id) };
    let client_secret = if full {
        config.trakt.client_secret.clone()
    } else {
        mask_string(&config.trakt.client_secret)
    };
    let token_status = match (store.get_trakt_access_token(), store.valid_trakt_access_token()) {
        (None, _) => "not authorized".to_string(),
        (Some(_), None) => "expired".to_string(),
        (Some(_), Some(_)) => match store.get_trakt_token_expires() {
            Some(expires_at) => format!("valid until {}", expires_at.format("%Y-%m-%d %H:%M UTC")),
            None => "valid".to_string(),
        },
    };

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            let mut info_table = Table::new();
            info_table.set_header(vec![
                Cell::new("Config File").add_attribute(comfy_table::Attribute::Bold),
                Cell::new(config_file.display().to_string()),
            ]);
            info_table.load_preset(comfy_table::presets::UTF8_FULL);
            info_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", info_table);
            println!();

            let mut trakt_table = Table::new();
            trakt_table.set_header(vec![
                Cell::new("Trakt").fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold),
                Cell::new(""),
            ]);
            trakt_table.add_row(vec![Cell::new("Client ID"), Cell::new(client_id)]);
            trakt_table.add_row(vec![Cell::new("Client Secret"), Cell::new(client_secret)]);
            trakt_table.add_row(vec![
                Cell::new("User"),
                Cell::new(config.trakt.user_name.as_deref().unwrap_or("<not set>")),
            ]);
            trakt_table.add_row(vec![Cell::new("API"), Cell::new(&config.trakt.api_base_url)]);
            trakt_table.add_row(vec![Cell::new("Token"), Cell::new(&token_status)]);
            trakt_table.load_preset(comfy_table::presets::UTF8_FULL);
            trakt_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", trakt_table);
            println!();

            let mut feed_table = Table::new();
            feed_table.set_header(vec![
                Cell::new("Feed").fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold),
                Cell::new(""),
            ]);
            feed_table.add_row(vec![Cell::new("ID scheme"), Cell::new(config.feed.id_scheme.as_str())]);
            feed_table.add_row(vec![Cell::new("Media kind"), Cell::new(check(config.feed.include_media_kind))]);
            feed_table.add_row(vec![Cell::new("Titles"), Cell::new(check(config.feed.include_title))]);
            feed_table.add_row(vec![
                Cell::new("Default category"),
                Cell::new(config.feed.default_category.as_str()),
            ]);
            feed_table.load_preset(comfy_table::presets::UTF8_FULL);
            feed_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", feed_table);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "config_file": config_file.display().to_string(),
                "trakt": {
                    "client_id": client_id,
                    "client_secret": client_secret,
                    "user_name": config.trakt.user_name,
                    "api_base_url": config.trakt.api_base_url,
                    "token": token_status,
                },
                "feed": config.feed,
            }));
        }
    }

    Ok(())
}

fn check(enabled: bool) -> String {
    if enabled {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}

fn mask_string(s: &str) -> String {
    if s.is_empty() || s == "YOUR_CLIENT_ID" || s == "YOUR_CLIENT_SECRET" {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}
