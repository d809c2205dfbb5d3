use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use workon_platform::AppPaths;

/// Append-only log file that is reopened if it disappears between writes.
struct ReopeningLogFile {
    path: PathBuf,
    file: Option<File>,
}

impl ReopeningLogFile {
    fn open(path: PathBuf) -> io::Result<Self> {
        let mut log = Self { path, file: None };
        log.current()?;
        Ok(log)
    }

    fn current(&mut self) -> io::Result<&mut File> {
        if self.file.is_none() || !self.path.exists() {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            self.file = Some(file);
        }
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("log file not available"))
    }
}

impl Write for ReopeningLogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.current()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// Keep the newer half of the log, cut at a line boundary, once it grows
/// past `max_log_size`.
fn trim_log_file_if_oversized(log_path: &Path, max_log_size: u64) {
    if let Ok(metadata) = std::fs::metadata(log_path)
        && metadata.len() > max_log_size
        && let Ok(contents) = std::fs::read(log_path)
    {
        let half = contents.len() / 2;
        let keep_from = contents[half..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(half, |pos| half + pos + 1);
        let _ = std::fs::write(log_path, &contents[keep_from..]);
    }
}

/// Install the global logger. `verbose` logs to stderr; `debug_to_file`
/// appends to the debug log under the data root. stdout carries shell
/// assignments and never receives log lines.
pub fn init_logging(paths: &AppPaths, verbose: bool, debug_to_file: bool, max_log_size: u64) {
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("workon")
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    if verbose {
        loggers.push(TermLogger::new(
            LevelFilter::Debug,
            config.clone(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }

    let log_path = paths.log_file();
    if debug_to_file {
        trim_log_file_if_oversized(&log_path, max_log_size);
        match ReopeningLogFile::open(log_path.clone()) {
            Ok(writer) => loggers.push(WriteLogger::new(LevelFilter::Debug, config, writer)),
            Err(error) => eprintln!(
                "warning: cannot open log file {}: {error}",
                log_path.display()
            ),
        }
    }

    let enabled = !loggers.is_empty();
    if enabled {
        let _ = CombinedLogger::init(loggers);
    }
    set_logging_enabled(enabled);

    if debug_to_file {
        log::info!("Debug logging to {}", log_path.display());
    }
}

pub fn set_logging_enabled(enabled: bool) {
    if enabled {
        log::set_max_level(log::LevelFilter::Debug);
    } else {
        log::set_max_level(log::LevelFilter::Off);
    }
}
