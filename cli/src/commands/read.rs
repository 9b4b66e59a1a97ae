//! READ command - Fetch one document.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use super::{HumanReadable, check, make_request, output};

/// Arguments for the read command.
#[derive(Args)]
pub struct ReadArgs {
    /// Document path relative to the server's root
    pub path: String,

    /// Print the Markdown source as-is instead of the rendered response
    #[arg(long)]
    pub raw: bool,
}

/// Response from reading a document.
#[derive(Debug, Deserialize, Serialize)]
pub struct DocResponse {
    pub path: String,
    pub html: String,
    pub raw: String,
}

impl HumanReadable for DocResponse {
    fn print_human(&self) {
        println!("{}", self.path.green().bold());
        println!("{}", "-".repeat(60));
        println!("{}", self.raw.trim_end());
        println!("{}", "-".repeat(60));
        println!(
            "  {} {} bytes source, {} bytes HTML",
            "Size:".cyan(),
            self.raw.len(),
            self.html.len()
        );
    }
}

/// Characters escaped in a path segment; unreserved ones stay readable.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// URL of the raw source, each path segment percent-encoded.
fn raw_url(base_url: &str, path: &str) -> String {
    let encoded = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/");
    format!("{}/raw/{}", base_url, encoded)
}

/// Execute the read command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: ReadArgs,
) -> Result<()> {
    if args.raw {
        let url = raw_url(base_url, &args.path);
        let response = check(client.get(&url).send().await.context("request failed")?).await?;
        print!("{}", response.text().await?);
        return Ok(());
    }

    let url = format!("{}/api/doc", base_url);
    let response: DocResponse =
        make_request(client.get(&url).query(&[("path", args.path.as_str())])).await?;

    output(&response, human)
}
