//! VERSION command - Show the current generation.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use super::{HumanReadable, make_request, output};

/// Arguments for the version command.
#[derive(Args)]
pub struct VersionArgs {
    // No additional arguments needed
}

#[derive(Debug, Deserialize, Serialize)]
pub struct VersionResponse {
    pub version: u64,
}

impl HumanReadable for VersionResponse {
    fn print_human(&self) {
        println!("  {} {}", "Version:".cyan(), self.version);
    }
}

/// Execute the version command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    _args: VersionArgs,
) -> Result<()> {
    let url = format!("{}/api/version", base_url);

    let response: VersionResponse = make_request(client.get(&url)).await?;

    output(&response, human)
}
