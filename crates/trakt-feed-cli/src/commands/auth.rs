use super::{
    build_auth, configured, load_config, load_credentials, print_instruction_list, print_oauth_progress,
    print_section_header, prompts,
};
use crate::output::{Output, OutputFormat};
use crate::AuthCommands;
use color_eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use serde_json::json;
use trakt_feed_config::{Config, PathManager};
use trakt_feed_models::{DeviceAuthSession, TokenGrant};
use trakt_feed_sources::trakt::authorization_url;
use trakt_feed_sources::{AuthError, PollPolicy};
use tracing::info;

pub async fn run_auth(cmd: AuthCommands, output: &Output) -> Result<()> {
    match cmd {
        AuthCommands::Device {
            client_id,
            client_secret,
            strict,
            no_save,
        } => device_flow(client_id, client_secret, strict, no_save, output).await,
        AuthCommands::Code { code, no_save } => code_flow(code, no_save, output).await,
        AuthCommands::Refresh => refresh(output).await,
    }
}

async fn device_flow(
    client_id_arg: Option<String>,
    client_secret_arg: Option<String>,
    strict: bool,
    no_save: bool,
    output: &Output,
) -> Result<()> {
    let path_manager = PathManager::default();
    let mut config = load_config(&path_manager)?;

    print_section_header("Trakt Device Authorization", output);

    let mut prompted = false;
    let client_id = match client_id_arg.or_else(|| configured(&config.trakt.client_id)) {
        Some(id) => id,
        None => {
            print_instruction_list(
                &[
                    "Go to https://trakt.tv/oauth/applications and create an application",
                    "Use urn:ietf:wg:oauth:2.0:oob as the redirect URI",
                    "Copy the Client ID and Client Secret",
                ],
                output,
            );
            prompted = true;
            prompts::prompt_string("Trakt Client ID", None)?.trim().to_string()
        }
    };
    let client_secret = match client_secret_arg.or_else(|| configured(&config.trakt.client_secret)) {
        Some(secret) => secret,
        None => {
            prompted = true;
            prompts::prompt_password("Trakt Client Secret")?.trim().to_string()
        }
    };

    let policy = if strict { PollPolicy::Strict } else { PollPolicy::Lenient };
    let auth = build_auth(&config).with_poll_policy(policy);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );

    let result = auth
        .authorize(&client_id, &client_secret, |session| {
            show_device_session(session, output);
            spinner.set_message("Waiting for approval...");
            spinner.enable_steady_tick(std::time::Duration::from_millis(100));
        })
        .await;
    spinner.finish_and_clear();

    let grant = match result {
        Ok(grant) => grant,
        Err(AuthError::Timeout { attempts }) => {
            return Err(color_eyre::eyre::eyre!(
                "Authorization timed out after {} polls. Run 'traktfeed auth device' to get a new code.",
                attempts
            ));
        }
        Err(e) => return Err(color_eyre::eyre::eyre!("Trakt authorization failed: {}", e)),
    };

    info!("Trakt device authorization complete");

    if prompted && !no_save {
        config.trakt.client_id = client_id;
        config.trakt.client_secret = client_secret;
        save_config(&config, &path_manager)?;
    }

    finish_grant(&grant, no_save, &path_manager, output)
}

async fn code_flow(code_arg: Option<String>, no_save: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config = load_config(&path_manager)?;

    let (client_id, client_secret) = require_app_credentials(&config)?;
    let auth = build_auth(&config);

    let code = match code_arg {
        Some(code) => code,
        None => {
            print_section_header("Trakt Authorization Code", output);
            print_instruction_list(
                &[
                    "Open the link below and sign in to Trakt",
                    "Approve access for your application",
                    "Paste the code Trakt shows you",
                ],
                output,
            );
            output.println("");
            output.println(format!("  {}", authorization_url(&client_id).underline()));
            output.println("");
            prompts::prompt_string("Authorization code", None)?
        }
    };

    if code.trim().is_empty() {
        return Err(color_eyre::eyre::eyre!("No authorization code given"));
    }

    print_oauth_progress("Exchanging code for a token...", output);
    let grant = auth
        .exchange_code(&client_id, &client_secret, &code)
        .await
        .map_err(|e| match e {
            AuthError::InvalidCode => color_eyre::eyre::eyre!("Trakt rejected the code; it may be expired or already used"),
            other => color_eyre::eyre::eyre!("Token exchange failed: {}", other),
        })?;

    finish_grant(&grant, no_save, &path_manager, output)
}

async fn refresh(output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config = load_config(&path_manager)?;
    let (client_id, client_secret) = require_app_credentials(&config)?;

    let store = load_credentials(&path_manager)?;
    let refresh_token = store
        .get_trakt_refresh_token()
        .cloned()
        .ok_or_else(|| color_eyre::eyre::eyre!("No refresh token stored. Run 'traktfeed auth device' first."))?;

    print_oauth_progress("Refreshing Trakt access token...", output);
    let grant = build_auth(&config)
        .refresh_token(&client_id, &client_secret, &refresh_token)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Token refresh failed: {}", e))?;

    finish_grant(&grant, false, &path_manager, output)
}

fn require_app_credentials(config: &Config) -> Result<(String, String)> {
    match (configured(&config.trakt.client_id), configured(&config.trakt.client_secret)) {
        (Some(id), Some(secret)) => Ok((id, secret)),
        _ => Err(color_eyre::eyre::eyre!(
            "Trakt client id and secret are not configured. Run 'traktfeed config set --client-id <ID> --client-secret <SECRET>'."
        )),
    }
}

fn show_device_session(session: &DeviceAuthSession, output: &Output) {
    match output.format() {
        OutputFormat::Human => {
            // stderr, so the code is visible even with --quiet
            eprintln!();
            eprintln!("{}", "╔════════════════════════════════════════════╗".bright_white());
            eprintln!("{}  Visit:  {}", "║".bright_white(), session.verification_url.underline());
            eprintln!("{}  Code:   {}", "║".bright_white(), session.user_code.bold().bright_yellow());
            eprintln!("{}", "╚════════════════════════════════════════════╝".bright_white());
            eprintln!(
                "{}",
                format!("Code expires in {} minutes", session.expires_in_secs / 60).bright_black()
            );
            eprintln!();
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "type": "device_code",
                "user_code": session.user_code,
                "verification_url": session.verification_url,
                "expires_in": session.expires_in_secs,
                "interval": session.poll_interval_secs,
            }));
        }
    }
}

fn finish_grant(grant: &TokenGrant, no_save: bool, path_manager: &PathManager, output: &Output) -> Result<()> {
    if no_save {
        match output.format() {
            OutputFormat::Human => {
                output.success("Access token acquired");
                println!("{}", grant.access_token);
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                output.json(&json!({
                    "type": "token",
                    "access_token": grant.access_token,
                    "refresh_token": grant.refresh_token,
                    "expires_at": grant.expires_at.map(|t| t.to_rfc3339()),
                }));
            }
        }
        return Ok(());
    }

    save_grant(grant, path_manager)?;
    output.success("Trakt token saved");
    if let Some(expires_at) = grant.expires_at {
        output.info(format!("Token valid until {}", expires_at.format("%Y-%m-%d %H:%M UTC")));
    }
    Ok(())
}

fn save_grant(grant: &TokenGrant, path_manager: &PathManager) -> Result<()> {
    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create {}: {}", path_manager.config_dir().display(), e))?;

    let mut store = load_credentials(path_manager)?;
    store.clear_trakt_tokens();
    store.set_trakt_access_token(grant.access_token.clone());
    if let Some(refresh) = &grant.refresh_token {
        store.set_trakt_refresh_token(refresh.clone());
    }
    if let Some(expires_at) = grant.expires_at {
        store.set_trakt_token_expires(expires_at);
    }
    store
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials: {}", e))
}

fn save_config(config: &Config, path_manager: &PathManager) -> Result<()> {
    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create {}: {}", path_manager.config_dir().display(), e))?;
    let config_file = path_manager.config_file();
    config
        .save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save config to {}: {}", config_file.display(), e))
}
