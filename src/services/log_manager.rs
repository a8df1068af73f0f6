// LogManager Service
// File logger, log retention cleanup and reading

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

pub const LOG_FILE_NAME: &str = "core-admin.log";

/// Appends every record to `<log_dir>/core-admin.log`; warnings and errors
/// are echoed to stderr as well
pub struct CliLogger {
    file: Mutex<fs::File>,
    level: LevelFilter,
}

impl CliLogger {
    pub fn new(log_dir: &Path, level: LevelFilter) -> Result<Self, std::io::Error> {
        fs::create_dir_all(log_dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_dir.join(LOG_FILE_NAME))?;
        Ok(Self {
            file: Mutex::new(file),
            level,
        })
    }

    /// Format one record as `[date][time][target][LEVEL] message`
    pub fn format_line(record: &Record) -> String {
        let timestamp = Local::now();
        let date = timestamp.format("%Y-%m-%d");
        let time = timestamp.format("%H:%M:%S");
        format!(
            "[{date}][{time}][{}][{}] {}",
            record.target(),
            record.level(),
            record.args()
        )
    }
}

impl Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = Self::format_line(record);

        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
        }

        if record.level() <= Level::Warn {
            eprintln!("{line}");
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Install `CliLogger` as the global logger
pub fn init_logger(log_dir: &Path, level: LevelFilter) -> Result<(), Box<dyn std::error::Error>> {
    let logger = CliLogger::new(log_dir, level)?;
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(level);
    Ok(())
}

/// Parse a level name such as "debug" or "WARN"
pub fn parse_level(value: &str) -> Option<LevelFilter> {
    value.trim().parse::<LevelFilter>().ok()
}

/// Delete `.log` files older than the retention window; 0 keeps everything
pub fn prune_logs(log_dir: &Path, retention_days: u32) -> Result<usize, String> {
    if retention_days == 0 {
        return Ok(0);
    }

    if !log_dir.exists() {
        return Ok(0);
    }

    let cutoff = SystemTime::now()
        .checked_sub(Duration::from_secs(retention_days as u64 * 24 * 60 * 60))
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let entries = fs::read_dir(log_dir).map_err(|e| format!("Failed to read log dir: {e}"))?;
    let mut removed = 0;

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("log") {
            continue;
        }

        let modified = entry
            .metadata()
            .and_then(|metadata| metadata.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        if modified < cutoff && fs::remove_file(&path).is_ok() {
            removed += 1;
        }
    }

    Ok(removed)
}

/// Last `max_lines` non-empty lines of the newest log file
pub fn read_recent_logs(log_dir: &Path, max_lines: usize) -> Result<Vec<String>, String> {
    let log_file = match find_latest_log_file(log_dir) {
        Some(path) => path,
        None => return Ok(Vec::new()),
    };

    let bytes = fs::read(&log_file).map_err(|e| format!("Failed to read log file: {e}"))?;
    let content = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = content.lines().filter(|line| !line.trim().is_empty()).collect();

    let start = lines.len().saturating_sub(max_lines);
    Ok(lines[start..].iter().map(|line| line.to_string()).collect())
}

fn find_latest_log_file(log_dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(log_dir).ok()?;
    let mut latest: Option<(PathBuf, SystemTime)> = None;

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("log") {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|metadata| metadata.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        match latest {
            Some((_, latest_time)) if modified <= latest_time => {}
            _ => latest = Some((path, modified)),
        }
    }

    latest.map(|(path, _)| path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_recent_logs_skips_blank_lines() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(LOG_FILE_NAME), "one\n\ntwo\nthree\n  \nfour\n").unwrap();

        assert_eq!(read_recent_logs(temp.path(), 2).unwrap(), vec!["three", "four"]);
        assert_eq!(read_recent_logs(temp.path(), 10).unwrap().len(), 4);
    }

    #[test]
    fn test_read_recent_logs_without_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("notes.txt"), "ignored").unwrap();
        assert!(read_recent_logs(temp.path(), 5).unwrap().is_empty());
    }

    #[test]
    fn test_prune_disabled_and_recent_files_kept() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(LOG_FILE_NAME), "fresh").unwrap();

        assert_eq!(prune_logs(temp.path(), 0).unwrap(), 0);
        assert_eq!(prune_logs(temp.path(), 30).unwrap(), 0);
        assert!(temp.path().join(LOG_FILE_NAME).exists());
        assert_eq!(prune_logs(&temp.path().join("missing"), 30).unwrap(), 0);
    }

    #[test]
    fn test_logger_writes_file() {
        let temp = TempDir::new().unwrap();
        let logger = CliLogger::new(temp.path(), LevelFilter::Info).unwrap();

        logger.log(
            &Record::builder()
                .args(format_args!("hello"))
                .level(Level::Info)
                .target("core_admin::test")
                .build(),
        );
        logger.log(
            &Record::builder()
                .args(format_args!("hidden"))
                .level(Level::Debug)
                .target("core_admin::test")
                .build(),
        );
        logger.flush();

        let content = fs::read_to_string(temp.path().join(LOG_FILE_NAME)).unwrap();
        assert!(content.contains("[core_admin::test][INFO] hello"));
        assert!(!content.contains("hidden"));
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some(LevelFilter::Debug));
        assert_eq!(parse_level(" WARN "), Some(LevelFilter::Warn));
        assert_eq!(parse_level("loud"), None);
    }
}
