//! WATCH command - Follow change events from the server.
//!
//! Reads the `/api/events` stream and prints one line per change. Pings are
//! skipped unless `--pings` is given.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use super::{HumanReadable, check, format_timestamp, output};

/// Arguments for the watch command.
#[derive(Args)]
pub struct WatchArgs {
    /// Exit after this many change events
    #[arg(short = 'n', long)]
    pub count: Option<u64>,

    /// Resume after this generation (sent as Last-Event-ID)
    #[arg(long)]
    pub since: Option<u64>,

    /// Also print heartbeat pings
    #[arg(long)]
    pub pings: bool,
}

/// One event from the stream.
#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ViewerEvent {
    Changed {
        version: u64,
        timestamp: Option<DateTime<Utc>>,
    },
    Ping {
        ping: bool,
        timestamp: Option<DateTime<Utc>>,
    },
}

impl HumanReadable for ViewerEvent {
    fn print_human(&self) {
        match self {
            ViewerEvent::Changed { version, timestamp } => {
                let at = timestamp.as_ref().map(format_timestamp).unwrap_or_default();
                println!(
                    "  {} [{}] {}",
                    "~".yellow(),
                    version.to_string().bold(),
                    at.dimmed()
                );
            }
            ViewerEvent::Ping { timestamp, .. } => {
                let at = timestamp.as_ref().map(format_timestamp).unwrap_or_default();
                println!("  {} {}", "ping".dimmed(), at.dimmed());
            }
        }
    }
}

/// Accumulates stream bytes and yields the `data` payload of each complete
/// frame. Bytes are only decoded once a frame is complete, so characters and
/// line endings split across chunks survive.
#[derive(Debug, Default)]
struct FrameBuffer {
    pending: Vec<u8>,
}

/// Blank-line separators ending a frame.
const FRAME_ENDS: [&[u8]; 3] = [b"\r\n\r\n", b"\n\n", b"\r\r"];

impl FrameBuffer {
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(end) = self.frame_end() {
            let frame: Vec<u8> = self.pending.drain(..end).collect();
            let text = String::from_utf8_lossy(&frame)
                .replace("\r\n", "\n")
                .replace('\r', "\n");
            let data: Vec<&str> = text
                .lines()
                .filter_map(|line| line.strip_prefix("data:"))
                .map(|d| d.strip_prefix(' ').unwrap_or(d))
                .collect();
            if !data.is_empty() {
                frames.push(data.join("\n"));
            }
        }
        frames
    }

    /// Offset just past the first frame separator.
    fn frame_end(&self) -> Option<usize> {
        FRAME_ENDS
            .iter()
            .filter_map(|sep| {
                self.pending
                    .windows(sep.len())
                    .position(|window| window == *sep)
                    .map(|at| at + sep.len())
            })
            .min()
    }
}

/// Execute the watch command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: WatchArgs,
) -> Result<()> {
    let url = format!("{}/api/events", base_url);
    let mut request = client.get(&url).header("accept", "text/event-stream");
    if let Some(since) = args.since {
        request = request.header("last-event-id", since.to_string());
    }

    let response = check(request.send().await.context("request failed")?).await?;
    if human {
        println!("{} {}", "Watching".green().bold(), url.dimmed());
    }

    let mut body = response.bytes_stream();
    let mut buffer = FrameBuffer::default();
    let mut seen = 0u64;

    while let Some(chunk) = body.next().await {
        let chunk = chunk.context("event stream interrupted")?;
        for data in buffer.push(&chunk) {
            let event: ViewerEvent = serde_json::from_str(&data)
                .with_context(|| format!("unexpected event payload: {}", data))?;

            let is_change = matches!(event, ViewerEvent::Changed { .. });
            if is_change || args.pings {
                output_line(&event, human)?;
            }
            if is_change {
                seen += 1;
                if args.count.is_some_and(|n| seen >= n) {
                    return Ok(());
                }
            }
        }
    }

    bail!("server closed the event stream")
}

/// JSON mode prints one compact object per line so output can be piped.
fn output_line(event: &ViewerEvent, human: bool) -> Result<()> {
    if human {
        return output(event, true);
    }
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_split_across_chunks() {
        let mut buffer = FrameBuffer::default();
        assert!(buffer.push(b"id: 3\ndata: {\"vers").is_empty());
        let frames = buffer.push(b"ion\":3}\n\ndata: {\"ping\":true}\n\n");
        assert_eq!(frames, vec![r#"{"version":3}"#, r#"{"ping":true}"#]);
    }

    #[test]
    fn test_frames_with_crlf_and_comments() {
        let mut buffer = FrameBuffer::default();
        let frames = buffer.push(b": keep-alive\r\n\r\ndata:{\"version\":1}\r\n\r\n");
        assert_eq!(frames, vec![r#"{"version":1}"#]);
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let frame = "data: {\"note\":\"caf\u{e9}\"}\n\n".as_bytes();
        let split = frame.iter().position(|&b| b == 0xc3).unwrap() + 1;

        let mut buffer = FrameBuffer::default();
        assert!(buffer.push(&frame[..split]).is_empty());
        let frames = buffer.push(&frame[split..]);
        assert_eq!(frames, vec!["{\"note\":\"caf\u{e9}\"}"]);
    }

    #[test]
    fn test_crlf_split_across_chunks() {
        let mut buffer = FrameBuffer::default();
        assert!(buffer.push(b"data: {\"version\":2}\r\n\r").is_empty());
        let frames = buffer.push(b"\ndata: {\"version\":3}\r\n\r\n");
        assert_eq!(frames, vec![r#"{"version":2}"#, r#"{"version":3}"#]);
    }

    #[test]
    fn test_event_payloads() {
        let change: ViewerEvent =
            serde_json::from_str(r#"{"version":7,"timestamp":"2026-01-01T00:00:41Z"}"#).unwrap();
        assert!(matches!(change, ViewerEvent::Changed { version: 7, .. }));

        let ping: ViewerEvent = serde_json::from_str(r#"{"ping":true}"#).unwrap();
        assert!(matches!(ping, ViewerEvent::Ping { ping: true, .. }));
    }
}
