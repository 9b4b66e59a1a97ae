//! FILES command - List documents under the server's root.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use super::{HumanReadable, make_request, output};

/// Arguments for the files command.
#[derive(Args)]
pub struct FilesArgs {
    /// Only show paths under this directory
    #[arg(long)]
    pub under: Option<String>,
}

/// Response from listing documents.
#[derive(Debug, Deserialize, Serialize)]
pub struct FilesResponse {
    pub files: Vec<String>,
    pub version: u64,
}

impl FilesResponse {
    fn retain_under(&mut self, dir: &str) {
        let prefix = format!("{}/", dir.trim_matches('/'));
        if prefix != "/" {
            self.files.retain(|f| f.starts_with(&prefix));
        }
    }
}

impl HumanReadable for FilesResponse {
    fn print_human(&self) {
        println!("{}", "Documents".green().bold());
        println!("{}", "=".repeat(60));
        println!();

        if self.files.is_empty() {
            println!("  {}", "(No documents)".dimmed());
        }
        for file in &self.files {
            match file.rsplit_once('/') {
                Some((dir, name)) => println!("  {}/{}", dir.dimmed(), name),
                None => println!("  {}", file),
            }
        }

        println!();
        println!(
            "  {} {}  {} {}",
            "Total:".cyan(),
            self.files.len(),
            "Version:".cyan(),
            self.version
        );
    }
}

/// Execute the files command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: FilesArgs,
) -> Result<()> {
    let url = format!("{}/api/files", base_url);

    let mut response: FilesResponse = make_request(client.get(&url)).await?;
    if let Some(dir) = &args.under {
        response.retain_under(dir);
    }

    output(&response, human)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> FilesResponse {
        FilesResponse {
            files: vec![
                "README.md".to_string(),
                "docs/guide/setup.md".to_string(),
                "docs/intro.md".to_string(),
                "docsx/other.md".to_string(),
            ],
            version: 4,
        }
    }

    #[test]
    fn test_retain_under_directory() {
        let mut response = listing();
        response.retain_under("docs/");
        assert_eq!(response.files, vec!["docs/guide/setup.md", "docs/intro.md"]);
    }

    #[test]
    fn test_retain_under_root_keeps_everything() {
        let mut response = listing();
        response.retain_under("/");
        assert_eq!(response.files.len(), 4);
    }
}
