mod attendance;
mod calendar;
mod filter;
mod ipc;
mod store;

use std::io::{self, BufRead, Write};

use anyhow::Result;
use serde_json::json;
use tracing_subscriber::{fmt, EnvFilter};

/// Diagnostics go to stderr; stdout carries the wire protocol.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("MAKTABD_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let mut state = ipc::AppState::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't echo a request id we never parsed.
                let reply = json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                writeln!(stdout, "{}", reply)?;
                stdout.flush()?;
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        )?;
        stdout.flush()?;
    }

    Ok(())
}
