//! Append-only lifecycle log.
//!
//! Engine code logs through the `log` facade; [`init_file_log`] routes those
//! records into a file, one line per event, prefixed with the local time.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::ChronoLocal;

use crate::mr::Error;

pub const DEFAULT_LOG_FILE: &str = ".mapreduce.log";

pub const TIME_FORMAT: &str = "[%d.%m.%Y %H:%M:%S]";

/// Installs the global subscriber writing to `path` in append mode.
pub fn init_file_log(path: &Path) -> Result<(), Error> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| Error::LogFile {
            path: path.to_path_buf(),
            source,
        })?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_thread_names(true)
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
        .with_max_level(LevelFilter::INFO)
        .try_init()
        .map_err(|e| Error::Subscriber(e.to_string()))
}
