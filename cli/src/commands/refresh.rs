//! REFRESH command - Announce that documents changed.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use super::{HumanReadable, make_request, output};

/// Arguments for the refresh command.
#[derive(Args)]
pub struct RefreshArgs {
    /// Short note on what changed, echoed back and logged by the server
    #[arg(short, long)]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

/// Response from the refresh hook.
#[derive(Debug, Deserialize, Serialize)]
pub struct RefreshResponse {
    pub ok: bool,
    pub version: u64,
    #[serde(default)]
    pub reason: String,
}

impl HumanReadable for RefreshResponse {
    fn print_human(&self) {
        println!(
            "{} {} {}",
            "Refreshed".green().bold(),
            "version".dimmed(),
            self.version.to_string().bold()
        );
        if !self.reason.is_empty() {
            println!("  {} {}", "Reason:".cyan(), self.reason);
        }
    }
}

/// Execute the refresh command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: RefreshArgs,
) -> Result<()> {
    let url = format!("{}/refresh", base_url);
    let request = RefreshRequest {
        reason: args.reason.as_deref(),
    };

    let response: RefreshResponse = make_request(client.post(&url).json(&request)).await?;

    output(&response, human)
}
