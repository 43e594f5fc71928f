use anyhow::{Context, Result};
use chrono::{DateTime, Duration};
use clap::{Parser, Subcommand};
use linklens::auth::JwtAuthenticator;
use linklens::config::Config;
use linklens::links::LinkService;
use linklens::storage;

#[derive(Parser)]
#[command(name = "linklens-admin")]
#[command(about = "Linklens admin management CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue a bearer token for an owner
    Token {
        /// Owner id (becomes the token's sub claim)
        owner_id: String,
        /// Token lifetime in hours (defaults to JWT_TOKEN_TTL_HOURS)
        #[arg(long)]
        hours: Option<i64>,
    },
    /// List an owner's links, newest first
    Links {
        /// Owner id
        owner_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Token { owner_id, hours } => {
            let jwt_config = config
                .auth
                .jwt
                .as_ref()
                .context("JWT_SECRET must be set to issue tokens")?;
            let authenticator = JwtAuthenticator::from_config(jwt_config)?;
            let token = match hours {
                Some(hours) => authenticator.issue_with_ttl(&owner_id, Duration::hours(hours))?,
                None => authenticator.issue(&owner_id)?,
            };
            println!("{token}");
        }
        Commands::Links { owner_id } => {
            let storage = storage::connect(&config.database).await?;
            storage.init().await?;

            let service = LinkService::new(storage, config.short_code_max_length);
            let links = service.list(&owner_id).await?;

            if links.is_empty() {
                println!("No links found for owner '{}'.", owner_id);
            } else {
                println!(
                    "{:<8} {:<16} {:<8} {:<22} {}",
                    "ID", "Short code", "Clicks", "Expires", "Original URL"
                );
                println!("{}", "-".repeat(100));
                for link in links {
                    let expires = link
                        .expires_at
                        .and_then(DateTime::from_timestamp_millis)
                        .map(|ts| ts.format("%Y-%m-%d %H:%M UTC").to_string())
                        .unwrap_or_else(|| "never".to_string());
                    println!(
                        "{:<8} {:<16} {:<8} {:<22} {}",
                        link.id, link.short_code, link.click_count, expires, link.original_url
                    );
                }
            }
        }
    }

    Ok(())
}
