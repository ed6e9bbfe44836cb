//! Logger installation for the numbers service.
//!
//! Logs go to the terminal unless a log file is configured; the file is
//! appended to so restarts keep earlier history.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Destination for log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    /// Write to the terminal.
    Terminal,
    /// Append to the given file.
    File(PathBuf),
}

impl LogDestination {
    pub fn from_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) if !path.as_os_str().is_empty() => LogDestination::File(path),
            _ => LogDestination::Terminal,
        }
    }
}

/// Installs the global logger. A log file that cannot be opened is reported
/// on stderr and logging falls back to the terminal.
pub fn initialize(destination: LogDestination) {
    let level = LevelFilter::Info;
    let config = build_config();

    let logger: Box<dyn SharedLogger> = match destination {
        LogDestination::File(path) => match create_file_logger(level, config.clone(), &path) {
            Some(file_logger) => file_logger,
            None => terminal_logger(level, config),
        },
        LogDestination::Terminal => terminal_logger(level, config),
    };

    let _ = CombinedLogger::init(vec![logger]);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn terminal_logger(level: LevelFilter, config: Config) -> Box<dyn SharedLogger> {
    TermLogger::new(level, config, TerminalMode::Mixed, ColorChoice::Auto)
}

fn create_file_logger(
    level: LevelFilter,
    config: Config,
    path: &Path,
) -> Option<Box<dyn SharedLogger>> {
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(WriteLogger::<File>::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not open log file at {:?}: {}", path, err);
            None
        }
    }
}
