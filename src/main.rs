//! gigsync - import paid work from Google Calendar as draft income entries.

mod app_config;
mod commands;
mod google;
mod store;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gigsync")]
#[command(about = "Track freelance income from your Google Calendar")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect a Google account
    Connect,
    /// Pull calendar events and import work events as income drafts
    Sync {
        /// Account to sync (defaults to the only connected account)
        #[arg(long, conflicts_with = "all")]
        account: Option<String>,

        /// Sync every connected account
        #[arg(long)]
        all: bool,

        /// Days to look around today (overrides settings)
        #[arg(long)]
        days: Option<i64>,
    },
    /// Inspect or initialize classification rules
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
    /// Show connection status for each account
    Status,
    /// Remove a stored credential
    Disconnect {
        /// Account to disconnect
        account: String,
    },
}

#[derive(Subcommand)]
pub enum RulesAction {
    /// Print the rules that classification will run with
    List,
    /// Write the built-in default rules to settings.toml for editing
    Init {
        /// Overwrite rules already present in settings.toml
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Connect => commands::connect::run().await,
        Commands::Sync { account, all, days } => commands::sync::run(account, all, days).await,
        Commands::Rules { action } => commands::rules::run(action),
        Commands::Status => commands::status::run().await,
        Commands::Disconnect { account } => commands::disconnect::run(&account),
    }
}
