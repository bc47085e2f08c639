use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use color_eyre::eyre::{eyre, Result};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr,
    /// The dashboard owns the terminal, so logs go to a file instead.
    File(PathBuf),
}

fn env_filter(debug: bool) -> Result<EnvFilter> {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("radar_hidrico={level}")))?;
    Ok(filter)
}

pub fn init(debug: bool, target: LogTarget) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter(debug)?)
        .with_target(false);

    let installed = match target {
        LogTarget::Stderr => subscriber.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| eyre!("Failed to open log file {}: {e}", path.display()))?;
            subscriber
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };
    installed.map_err(|e| eyre!("Failed to initialize logging: {e}"))
}
