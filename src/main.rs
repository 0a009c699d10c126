//! Evernote Bridge - operator CLI
//!
//! Runs the OAuth handshake by hand against the configured consumer keys.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use evernote_bridge::oauth::{self, EvernoteOAuthClient};
use evernote_bridge::Config;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "evernote-bridge")]
#[command(about = "Telegram to Evernote bridge tools")]
struct Cli {
    /// Path to the YAML config file (default: ./config.yaml)
    #[arg(short, long, env = "EVERNOTE_BRIDGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Request a token and print the URL the user must open
    Authorize {
        /// Telegram user id
        #[arg(short, long)]
        user_id: i64,

        /// Session key echoed back in the callback URL
        #[arg(short, long, default_value = "cli")]
        session_key: String,

        /// Access type whose consumer credentials are used
        #[arg(short, long, default_value = oauth::flow::DEFAULT_ACCESS)]
        access: String,
    },

    /// Exchange a verified request token for an access token
    AccessToken {
        #[arg(long)]
        oauth_token: String,

        #[arg(long)]
        oauth_token_secret: String,

        #[arg(long)]
        verifier: String,

        #[arg(short, long, default_value = oauth::flow::DEFAULT_ACCESS)]
        access: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,evernote_bridge=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_yaml_and_env(cli.config.as_deref())?;
    let provider = EvernoteOAuthClient::new();

    match cli.command {
        Commands::Authorize {
            user_id,
            session_key,
            access,
        } => {
            let data =
                oauth::get_oauth_data(&provider, user_id, &session_key, &config, Some(&access))
                    .await?;
            println!("callback_key:       {}", data.callback_key);
            println!("oauth_token:        {}", data.oauth_token);
            println!("oauth_token_secret: {}", data.oauth_token_secret);
            println!("authorize at:       {}", data.oauth_url);
            Ok(())
        }
        Commands::AccessToken {
            oauth_token,
            oauth_token_secret,
            verifier,
            access,
        } => {
            let credentials = config
                .access_credentials(&access)
                .with_context(|| format!("No consumer credentials for access type '{access}'"))?;
            let token = oauth::get_access_token(
                &provider,
                &credentials.key,
                &credentials.secret,
                config.sandbox,
                &oauth_token,
                &oauth_token_secret,
                &verifier,
            )
            .await?;
            println!("{token}");
            Ok(())
        }
    }
}
