use std::{fs::OpenOptions, path::Path};

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};

/// Routes the `log` facade into `path`.
///
/// The terminal belongs to the ui, so records never go to stderr.
/// `RUST_LOG` picks the filter, `info` by default.
///
/// # Errors
/// Returns an error if the log file can't be opened or a logger is already set.
pub fn init(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))?;

    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .context("logger already initialised")?;

    Ok(())
}
