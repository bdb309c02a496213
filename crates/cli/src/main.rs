// stocksync CLI - match Shopify and Etsy listings, reconcile stock, submit sync

mod exit_codes;
mod matching;
mod reconcile;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use stocksync_client::{ClientError, ClientOptions, SyncClient};
use stocksync_config::{resolve_api_token, Settings};
use stocksync_recon::ReconError;

use exit_codes::{
    client_exit_code, recon_exit_code, EXIT_ERROR, EXIT_IO, EXIT_NOT_CONFIGURED, EXIT_PARSE,
    EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "stocksync")]
#[command(about = "Pair Shopify and Etsy listings and reconcile their stock")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings file (defaults to <config dir>/stocksync/settings.json)
    #[arg(long, env = "STOCKSYNC_SETTINGS", global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a match set from staged product lists
    #[command(after_help = "\
Examples:
  stocksync match --shopify shopify.json --etsy etsy.json --oracle -o matches.json
  stocksync match --shopify shopify.json --etsy etsy.json --suggestions batch.json
  stocksync match --shopify shopify.json --etsy etsy.json --fuzzy --config match.toml")]
    Match(matching::MatchArgs),

    /// Edit a saved match set by hand
    #[command(after_help = "\
Examples:
  stocksync pair --matches matches.json --link s2=e4
  stocksync pair --matches matches.json --single etsy:e9 --remove pair-3")]
    Pair(matching::PairArgs),

    /// List items of a saved match set that no pair claims
    #[command(after_help = "\
Examples:
  stocksync unmatched --matches matches.json --platform etsy
  stocksync unmatched --matches matches.json --platform shopify --search mug")]
    Unmatched(matching::UnmatchedArgs),

    /// Equalize stock across pairs and build the sync payload
    #[command(after_help = "\
Examples:
  stocksync reconcile --matches matches.json
  stocksync reconcile --matches matches.json --sync-all --json
  stocksync reconcile --matches matches.json --set pair-2:etsy=7 --sync pair-1 --submit")]
    Reconcile(reconcile::ReconcileArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Match(args) => matching::cmd_match(args, cli.settings.as_deref()),
        Commands::Pair(args) => matching::cmd_pair(args),
        Commands::Unmatched(args) => matching::cmd_unmatched(args),
        Commands::Reconcile(args) => reconcile::cmd_reconcile(args, cli.settings.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    pub fn not_configured(msg: impl Into<String>) -> Self {
        Self { code: EXIT_NOT_CONFIGURED, message: msg.into(), hint: None }
    }

    /// Create error from a match set / session rejection with proper exit code.
    pub fn recon(err: ReconError) -> Self {
        Self { code: recon_exit_code(&err), message: err.to_string(), hint: None }
    }

    /// Create error from an endpoint failure with proper exit code.
    pub fn client(err: ClientError) -> Self {
        let code = client_exit_code(&err);
        let hint = match &err {
            ClientError::NotConfigured(what) => Some(format!(
                "set \"{what}.url\" in {}",
                Settings::config_path_display()
            )),
            ClientError::Http(401, _) | ClientError::Http(403, _) => {
                Some("check STOCKSYNC_API_TOKEN or \"auth.token\" in settings".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// Shared setup
// ============================================================================

/// Explicit settings file must parse; the default location falls back to defaults.
fn load_settings(path: Option<&std::path::Path>) -> Result<Settings, CliError> {
    match path {
        Some(path) => Settings::load_from(path).map_err(CliError::parse),
        None => Ok(Settings::load()),
    }
}

fn require_user_id(settings: &Settings) -> Result<String, CliError> {
    settings.user_id.clone().ok_or_else(|| {
        CliError::not_configured("user id is not configured")
            .with_hint(format!("set \"user.id\" in {}", Settings::config_path_display()))
    })
}

fn build_client(settings: &Settings) -> Result<SyncClient, CliError> {
    let token = resolve_api_token(settings);
    log::debug!("API token source: {}", token.source.as_str());
    SyncClient::new(ClientOptions {
        oracle_url: settings.oracle_url.clone(),
        sync_url: settings.sync_url.clone(),
        token: token.token,
        timeout: settings.timeout(),
    })
    .map_err(CliError::client)
}
