use clap::{ArgAction, Parser, Subcommand};
use commands::{auth, clear, config, fetch, invoke};
use std::path::PathBuf;
use trakt_feed_config::PathManager;
use trakt_feed_models::{ContentCategory, IdScheme};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "traktfeed")]
#[command(about = "traktfeed - Trakt lists as IMDb/TMDB identifier feeds")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Write logs to a daily-rotated file instead of stderr (default: <config dir>/logs/traktfeed.log)
    #[arg(long, global = true, value_name = "PATH", num_args = 0..=1)]
    log_file: Option<Option<PathBuf>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one page of a Trakt list as normalized items
    #[command(long_about = "Fetch one page of a Trakt content category and print the IMDb or TMDB identifiers it contains. Without a client id, or when Trakt returns nothing, a fixed demo list is printed instead.")]
    Fetch {
        /// Content category (trending, watchlist, progress, recommendations, history_movies, history_shows, custom_list)
        #[arg(long, short)]
        category: Option<ContentCategory>,

        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Trakt user whose public lists to read
        #[arg(long)]
        user: Option<String>,

        /// List slug, for the custom_list category
        #[arg(long)]
        list: Option<String>,

        /// Override the configured client id
        #[arg(long)]
        client_id: Option<String>,

        /// Override the stored OAuth access token
        #[arg(long)]
        token: Option<String>,

        /// Identifier scheme to emit (imdb or tmdb)
        #[arg(long)]
        id_scheme: Option<IdScheme>,

        /// Include titles in the output
        #[arg(long, action = ArgAction::SetTrue)]
        titles: bool,
    },
    /// Obtain or refresh a Trakt OAuth token
    Auth {
        #[command(subcommand)]
        cmd: AuthCommands,
    },
    /// Print the module manifest as JSON
    Schema,
    /// Invoke a manifest module with key=value parameters
    #[command(long_about = "Invoke a manifest module the way a plugin host would. Parameters are passed as key=value pairs; client_id falls back to the configured one when omitted.")]
    Invoke {
        /// Module function name (see `traktfeed schema`)
        function: String,

        /// Parameter as key=value (repeatable)
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
    /// Remove stored credentials and/or configuration
    Clear {
        /// Clear stored OAuth tokens
        #[arg(long, action = ArgAction::SetTrue)]
        credentials: bool,

        /// Delete the configuration file
        #[arg(long, action = ArgAction::SetTrue)]
        config: bool,

        /// Clear everything
        #[arg(long, action = ArgAction::SetTrue, conflicts_with_all = ["credentials", "config"])]
        all: bool,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Device-code flow: approve on trakt.tv/activate while this waits
    #[command(long_about = "Run the OAuth device flow. A short code and URL are printed; approve access in a browser and the token is saved once Trakt confirms.")]
    Device {
        /// Trakt Client ID (falls back to config, then prompts)
        #[arg(long)]
        client_id: Option<String>,

        /// Trakt Client Secret (falls back to config, then prompts)
        #[arg(long)]
        client_secret: Option<String>,

        /// Stop polling as soon as Trakt reports the code denied, expired or used
        #[arg(long, action = ArgAction::SetTrue)]
        strict: bool,

        /// Print the token instead of saving it
        #[arg(long, action = ArgAction::SetTrue)]
        no_save: bool,
    },
    /// Authorization-code flow using a code pasted from the browser
    Code {
        /// Authorization code (prompts when omitted)
        #[arg(long)]
        code: Option<String>,

        /// Print the token instead of saving it
        #[arg(long, action = ArgAction::SetTrue)]
        no_save: bool,
    },
    /// Exchange the stored refresh token for a new access token
    Refresh,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks secrets)
    Show {
        /// Show secrets unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Update configuration values
    Set {
        #[arg(long)]
        client_id: Option<String>,

        #[arg(long)]
        client_secret: Option<String>,

        /// Default Trakt user for public lists (empty string clears it)
        #[arg(long)]
        user: Option<String>,

        #[arg(long)]
        api_base_url: Option<String>,

        #[arg(long)]
        id_scheme: Option<IdScheme>,

        #[arg(long)]
        include_media_kind: Option<bool>,

        #[arg(long)]
        include_title: Option<bool>,

        #[arg(long)]
        default_category: Option<ContentCategory>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = cli
        .log_file
        .clone()
        .map(|path| path.unwrap_or_else(|| PathManager::default().log_file()));
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    let result = match cli.command {
        Commands::Fetch {
            category,
            page,
            user,
            list,
            client_id,
            token,
            id_scheme,
            titles,
        } => {
            let args = fetch::FetchArgs {
                category,
                page,
                user,
                list,
                client_id,
                token,
                id_scheme,
                titles,
            };
            fetch::run_fetch(args, &output).await
        }
        Commands::Auth { cmd } => auth::run_auth(cmd, &output).await,
        Commands::Schema => invoke::run_schema(&output),
        Commands::Invoke { function, params } => invoke::run_invoke(&function, &params, &output).await,
        Commands::Config { cmd } => config::run_config(cmd, &output),
        Commands::Clear { credentials, config, all } => clear::run_clear(credentials, config, all, &output),
    };

    // JSON consumers get the failure on stdout in the same shape as other messages
    if let Err(e) = &result {
        if output.format() != output::OutputFormat::Human {
            output.error(e.to_string());
            std::process::exit(1);
        }
    }

    result
}
