//! Logging setup
//!
//! `RUST_LOG` wins when set. Otherwise `-v` raises the level for the vocab
//! crates: warn by default, info with `-v`, debug with `-vv`.
//! Logs go to the configured `log_file` when there is one, stderr otherwise.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;

use tracing::info;
use tracing_subscriber::EnvFilter;

/// Level used for the vocab crates at the given verbosity
fn level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn default_directive(verbosity: u8) -> String {
    let level = level(verbosity);
    format!("vocab_core={},vocab_cli={}", level, level)
}

/// Install the global subscriber (ignored if one is already installed)
pub fn init(verbosity: u8, log_file: Option<&Path>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let Some(log_path) = log_file else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
        return;
    };

    if let Some(parent) = log_path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let file = match File::options().create(true).append(true).open(log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            return;
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();

    info!("Logging to {:?}", log_path);
}
