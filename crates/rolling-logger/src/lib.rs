//! Rolling Logger
//!
//! Installs a `tracing` subscriber writing to `<app>.log` inside a log
//! directory. The file rotates by size (`<app>.log.1` is the newest backup)
//! and the most recent lines are kept in a circular buffer the host can read.

use std::collections::VecDeque;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("log file error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to install subscriber: {0}")]
    Init(String),
}

/// Rotation and buffer limits
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub max_file_bytes: u64,
    pub max_backups: usize,
    pub recent_capacity: usize,
    /// Used when `RUST_LOG` is unset or invalid
    pub default_filter: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 1024 * 1024,
            max_backups: 3,
            recent_capacity: 500,
            default_filter: "info".to_string(),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> io::Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer poisoned"))
}

// ========================
// Recent Lines
// ========================

/// Circular buffer of the latest log lines, oldest first
#[derive(Debug, Clone)]
pub struct RecentLogs {
    lines: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl RecentLogs {
    fn new(capacity: usize) -> Self {
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        lock(&self.lines)
            .map(|lines| lines.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn push(&self, line: String) -> io::Result<()> {
        if self.capacity == 0 {
            return Ok(());
        }
        let mut lines = lock(&self.lines)?;
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
        Ok(())
    }
}

// ========================
// Rolling File
// ========================

struct RollingFile {
    path: PathBuf,
    file: File,
    written: u64,
    max_file_bytes: u64,
    max_backups: usize,
    /// Trailing bytes not yet terminated by a newline
    partial: String,
}

impl RollingFile {
    fn backup_path(&self, n: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{n}"));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.max_backups > 0 {
            for n in (1..self.max_backups).rev() {
                let from = self.backup_path(n);
                if from.exists() {
                    fs::rename(&from, self.backup_path(n + 1))?;
                }
            }
            fs::rename(&self.path, self.backup_path(1))?;
        }
        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.written = 0;
        Ok(())
    }

    /// Complete lines contained in `buf`, joined with any earlier remainder
    fn take_lines(&mut self, buf: &[u8]) -> Vec<String> {
        self.partial.push_str(&String::from_utf8_lossy(buf));
        let mut lines = Vec::new();
        while let Some(end) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=end).collect();
            lines.push(line.trim_end().to_string());
        }
        lines
    }
}

/// Cloneable writer handed to the fmt layer
#[derive(Clone)]
pub struct RollingWriter {
    inner: Arc<Mutex<RollingFile>>,
    recent: RecentLogs,
}

impl RollingWriter {
    pub fn open(log_dir: &Path, app_name: &str, config: &LoggerConfig) -> Result<Self, LoggerError> {
        fs::create_dir_all(log_dir)?;
        let path = log_dir.join(format!("{app_name}.log"));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            inner: Arc::new(Mutex::new(RollingFile {
                path,
                file,
                written,
                max_file_bytes: config.max_file_bytes,
                max_backups: config.max_backups,
                partial: String::new(),
            })),
            recent: RecentLogs::new(config.recent_capacity),
        })
    }

    pub fn recent(&self) -> RecentLogs {
        self.recent.clone()
    }
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = lock(&self.inner)?;
        if inner.written > 0 && inner.written + buf.len() as u64 > inner.max_file_bytes {
            inner.rotate()?;
        }
        inner.file.write_all(buf)?;
        inner.written += buf.len() as u64;

        for line in inner.take_lines(buf) {
            self.recent.push(line)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        lock(&self.inner)?.file.flush()
    }
}

/// Local wall-clock timestamps
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

// ========================
// Initialization
// ========================

/// Install the global subscriber with default limits
pub fn init_logger(log_dir: impl AsRef<Path>, app_name: &str) -> Result<RecentLogs, LoggerError> {
    init_logger_with(log_dir, app_name, &LoggerConfig::default())
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logger_with(
    log_dir: impl AsRef<Path>,
    app_name: &str,
    config: &LoggerConfig,
) -> Result<RecentLogs, LoggerError> {
    let log_dir = log_dir.as_ref();
    let writer = RollingWriter::open(log_dir, app_name, config)?;
    let recent = writer.recent();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(LocalTime)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .try_init()
        .map_err(|e| LoggerError::Init(e.to_string()))?;

    tracing::info!(app = app_name, dir = %log_dir.display(), "logger initialized");
    Ok(recent)
}
