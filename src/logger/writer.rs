//! Log writer module
//!
//! Provides thread-safe log writing to files or stdout/stderr.

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use super::Level;

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

const TIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Log output target
enum LogTarget {
    Stdout,
    Stderr,
    File(Mutex<File>),
}

/// Thread-safe log writer
pub struct LogWriter {
    /// Info and debug log target
    info: LogTarget,
    /// Warning and error log target
    error: LogTarget,
    level: Level,
}

impl LogWriter {
    fn new(level: Level, log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<Self> {
        let info = match log_file {
            Some(path) => LogTarget::File(Mutex::new(open_log_file(path)?)),
            None => LogTarget::Stdout,
        };

        let error = match error_log_file {
            Some(path) => LogTarget::File(Mutex::new(open_log_file(path)?)),
            None => LogTarget::Stderr,
        };

        Ok(Self { info, error, level })
    }

    pub const fn level(&self) -> Level {
        self.level
    }

    pub fn write_error(&self, message: &str) {
        write_to_target(&self.error, message);
    }

    pub fn write_info(&self, message: &str) {
        write_to_target(&self.info, message);
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

fn write_to_target(target: &LogTarget, message: &str) {
    let line = format!("[{}] {message}", Local::now().format(TIME_FORMAT));
    match target {
        LogTarget::Stdout => {
            println!("{line}");
        }
        LogTarget::Stderr => {
            eprintln!("{line}");
        }
        LogTarget::File(file) => {
            if let Ok(mut f) = file.lock() {
                let _ = writeln!(f, "{line}");
            }
        }
    }
}

/// Initialize the global log writer
///
/// This should be called once at application startup.
/// Returns error if log files cannot be opened or the writer is already set.
pub fn init(level: Level, log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<()> {
    let writer = LogWriter::new(level, log_file, error_log_file)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Get the global log writer, if initialized
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_target_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/server.log");
        let path_str = path.to_str().unwrap();

        let writer = LogWriter::new(Level::Info, Some(path_str), None).unwrap();
        writer.write_info("first line");
        writer.write_info("second line");

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('[') && lines[0].ends_with("] first line"));
        assert!(lines[1].ends_with("] second line"));
    }

    #[test]
    fn test_error_target_is_separate() {
        let dir = tempfile::tempdir().unwrap();
        let info = dir.path().join("info.log");
        let error = dir.path().join("error.log");

        let writer =
            LogWriter::new(Level::Warn, info.to_str(), error.to_str()).unwrap();
        writer.write_error("[ERROR] disk full");

        assert!(std::fs::read_to_string(&info).unwrap().is_empty());
        assert!(std::fs::read_to_string(&error)
            .unwrap()
            .ends_with("[ERROR] disk full\n"));
    }
}
