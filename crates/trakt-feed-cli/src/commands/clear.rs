use super::load_credentials;
use crate::output::Output;
use color_eyre::Result;
use std::fs;
use trakt_feed_config::PathManager;

pub fn run_clear(credentials: bool, config: bool, all: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();

    if all {
        clear_credentials(&path_manager, output)?;
        clear_config(&path_manager, output)?;
        output.success("All credentials and configuration cleared");
        return Ok(());
    }

    if !credentials && !config {
        output.warn("No clear option specified. Use --credentials, --config, or --all");
        output.println("\nExample: traktfeed clear --credentials");
        return Ok(());
    }

    if credentials {
        clear_credentials(&path_manager, output)?;
    }
    if config {
        clear_config(&path_manager, output)?;
    }

    Ok(())
}

fn clear_credentials(path_manager: &PathManager, output: &Output) -> Result<()> {
    let credentials_file = path_manager.credentials_file();

    if !credentials_file.exists() {
        output.info("No credentials file found to clear");
        return Ok(());
    }

    let mut store = load_credentials(path_manager)?;
    store.clear_trakt_tokens();

    if store.get_all_keys().is_empty() {
        fs::remove_file(&credentials_file).map_err(|e| {
            color_eyre::eyre::eyre!("Failed to remove credentials file at {}: {}", credentials_file.display(), e)
        })?;
    } else {
        store
            .save()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials: {}", e))?;
    }

    output.success(format!("Cleared Trakt tokens: {}", credentials_file.display()));
    Ok(())
}

fn clear_config(path_manager: &PathManager, output: &Output) -> Result<()> {
    let config_file = path_manager.config_file();

    if config_file.exists() {
        fs::remove_file(&config_file).map_err(|e| {
            color_eyre::eyre::eyre!("Failed to remove config file at {}: {}", config_file.display(), e)
        })?;
        output.success(format!("Removed configuration: {}", config_file.display()));
    } else {
        output.info("No configuration file found to clear");
    }

    Ok(())
}
