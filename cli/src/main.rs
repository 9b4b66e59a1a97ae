//! Command-line client for the MD-Easy document server.
//!
//! Commands:
//! - refresh: Tell open viewers that documents changed
//! - version: Show the current generation
//! - files: List documents under the server's root
//! - read: Fetch one document, rendered or raw
//! - watch: Follow change events as they happen
//!
//! Configuration via environment:
//! - MDEASY_URL: Base URL of the server (default: http://localhost:8765)
//! - MDEASY_REFRESH_KEY: Shared key sent with refresh requests

mod commands;

use clap::{Parser, Subcommand};

use commands::{
    files::FilesArgs, read::ReadArgs, refresh::RefreshArgs, version::VersionArgs,
    watch::WatchArgs,
};

/// MD-Easy CLI
///
/// Drive a running MD-Easy server from scripts and agents. Output is JSON
/// unless --human is given.
#[derive(Parser)]
#[command(name = "mdeasy")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output human-readable formatted text instead of JSON
    #[arg(long, global = true)]
    human: bool,

    /// MD-Easy server URL
    #[arg(
        long,
        env = "MDEASY_URL",
        default_value = "http://localhost:8765",
        global = true
    )]
    url: String,

    /// Refresh key, sent as X-Refresh-Key
    #[arg(long, env = "MDEASY_REFRESH_KEY", global = true, hide_env_values = true)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Announce that documents changed
    Refresh(RefreshArgs),

    /// Show the current generation
    Version(VersionArgs),

    /// List documents
    Files(FilesArgs),

    /// Read a document
    Read(ReadArgs),

    /// Follow change events
    Watch(WatchArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let url = cli.url.trim_end_matches('/');

    let client = match commands::build_client(cli.key.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Refresh(args) => commands::refresh::execute(&client, url, cli.human, args).await,
        Commands::Version(args) => commands::version::execute(&client, url, cli.human, args).await,
        Commands::Files(args) => commands::files::execute(&client, url, cli.human, args).await,
        Commands::Read(args) => commands::read::execute(&client, url, cli.human, args).await,
        Commands::Watch(args) => commands::watch::execute(&client, url, cli.human, args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
