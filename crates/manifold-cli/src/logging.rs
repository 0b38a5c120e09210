use crate::error::{CliError, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_subscriber::{
    Layer, Registry,
    filter::LevelFilter,
    fmt::{self},
    prelude::*,
};

/// Maps `-q` and the number of `-v` flags to the level applied to every output.
///
/// Warnings stay visible by default since they carry the uncovered-component notices.
pub fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbosity) {
        (true, _) => LevelFilter::OFF,
        (false, 0) => LevelFilter::WARN,
        (false, 1) => LevelFilter::INFO,
        (false, 2) => LevelFilter::DEBUG,
        (false, _) => LevelFilter::TRACE,
    }
}

/// Plain-text layer for `--log-file`, with targets and thread ids for later inspection.
fn file_layer(path: &Path, level: LevelFilter) -> Result<Box<dyn Layer<Registry> + Send + Sync>> {
    let file = File::create(path).map_err(CliError::Io)?;
    Ok(fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(level)
        .boxed())
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let level = level_for(verbosity, quiet);
    let file_output = log_file
        .as_deref()
        .map(|path| file_layer(path, level))
        .transpose()?;

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact()
        .with_filter(level);

    tracing_subscriber::registry()
        .with(file_output)
        .with(console_layer)
        .init();

    Ok(())
}
