//! Append-only JSON-lines diagnostics for engine failures the popup swallows.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use chrono::Utc;
use serde::Serialize;

const MAX_LOG_BYTES: u64 = 1_500_000;
const LOG_FILE: &str = "tracker-diagnostics.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    Registration,
    Rpc,
    Decode,
}

#[derive(Debug, Serialize)]
pub struct DiagnosticEvent<'a> {
    pub ts: String,
    pub kind: DiagnosticKind,
    pub session_id: Option<i64>,
    pub message: &'a str,
}

fn redact(input: &str) -> String {
    input
        .split_whitespace()
        .map(|token| {
            let digits = token.chars().filter(|c| c.is_ascii_digit()).count();
            let hex_like = token.len() >= 32 && token.chars().all(|c| c.is_ascii_hexdigit());
            let path_like = token.starts_with('/') || token.contains(":\\");
            if digits >= 10 || hex_like || path_like {
                "[redacted]"
            } else {
                token
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn log_event(
    log_dir: &Path,
    kind: DiagnosticKind,
    session_id: Option<i64>,
    message: &str,
) -> io::Result<()> {
    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(LOG_FILE);
    trim_log(&path)?;
    let cleaned = redact(message);
    let event = DiagnosticEvent {
        ts: Utc::now().to_rfc3339(),
        kind,
        session_id,
        message: &cleaned,
    };
    let line = serde_json::to_string(&event).map_err(io::Error::other)?;
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    writeln!(file, "{}", line)?;
    Ok(())
}

fn trim_log(path: &Path) -> io::Result<()> {
    if !path.exists() {
        return Ok(());
    }
    if fs::metadata(path)?.len() <= MAX_LOG_BYTES {
        return Ok(());
    }
    let data = fs::read(path)?;
    let mut keep_from = data.len().saturating_sub((MAX_LOG_BYTES / 2) as usize);
    // restart on a line boundary
    if let Some(offset) = data[keep_from..].iter().position(|b| *b == b'\n') {
        keep_from += offset + 1;
    }
    fs::write(path, &data[keep_from..])?;
    Ok(())
}
