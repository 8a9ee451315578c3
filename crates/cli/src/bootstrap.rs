use anyhow::{Context, Result};
use rounds_core::Config;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Logging ───────────────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `log_level` is used as the filter
/// directive, falling back to `"info"` if it does not parse.
pub fn setup_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level.to_lowercase()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    tracing_subscriber::registry().with(filter).with(layer).init();
}

// ── Configuration ─────────────────────────────────────────────────────────────

/// Load the configuration file, or defaults, then apply CLI overrides.
pub fn load_config(path: Option<&Path>, workers: Option<usize>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(workers) = workers {
        config.batch.workers = workers;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

// ── Output ────────────────────────────────────────────────────────────────────

/// Write `value` as pretty JSON, creating parent directories as needed.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("failed to write {}", path.display()))?;
    writer.flush()?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
