//! File logging for the shortcuts store and its front-ends.
//!
//! # Responsibility
//! - Start one size-rotated `flexi_logger` file backend per process.
//! - Record panics as a single sanitized log line.
//!
//! # Invariants
//! - Calling `init_logging` again with the same level and directory is a no-op.
//! - A different level or directory after start is rejected.
//! - Events carry ids and counts only; URLs and setting values stay out.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Once;

const LOG_BASENAME: &str = "shortcuts";
const ROTATE_AT_BYTES: u64 = 5 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 5;
const PANIC_TEXT_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: Once = Once::new();

struct ActiveLogger {
    level: LevelFilter,
    dir: PathBuf,
    _handle: LoggerHandle,
}

/// Why file logging could not be started.
#[derive(Debug)]
pub enum LoggingError {
    /// `Off` was requested; nothing would be written.
    LevelOff,
    /// Directory is relative or could not be created.
    Directory { dir: PathBuf, reason: String },
    /// Logging already runs with another level or directory.
    AlreadyActive { level: LevelFilter, dir: PathBuf },
    /// The `flexi_logger` backend refused to start.
    Backend(String),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LevelOff => write!(f, "log level `off` disables file logging"),
            Self::Directory { dir, reason } => {
                write!(f, "log directory `{}` is unusable: {reason}", dir.display())
            }
            Self::AlreadyActive { level, dir } => write!(
                f,
                "logging already active at level `{level}` in `{}`",
                dir.display()
            ),
            Self::Backend(reason) => write!(f, "failed to start file logger: {reason}"),
        }
    }
}

impl Error for LoggingError {}

/// Starts rotated file logging (`shortcuts_r*.log`) in `log_dir`.
///
/// `log_dir` must be absolute.
pub fn init_logging(level: LevelFilter, log_dir: &Path) -> Result<(), LoggingError> {
    if level == LevelFilter::Off {
        return Err(LoggingError::LevelOff);
    }
    if !log_dir.is_absolute() {
        return Err(LoggingError::Directory {
            dir: log_dir.to_path_buf(),
            reason: "path must be absolute".to_string(),
        });
    }

    let active = ACTIVE.get_or_try_init(|| start_backend(level, log_dir))?;
    if active.level != level || active.dir != log_dir {
        return Err(LoggingError::AlreadyActive {
            level: active.level,
            dir: active.dir.clone(),
        });
    }
    Ok(())
}

/// Level and directory of the running file logger, if any.
pub fn logging_status() -> Option<(LevelFilter, PathBuf)> {
    ACTIVE.get().map(|active| (active.level, active.dir.clone()))
}

/// `Debug` in debug builds, `Info` in release builds.
pub fn default_log_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

fn start_backend(level: LevelFilter, dir: &Path) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(dir).map_err(|err| LoggingError::Directory {
        dir: dir.to_path_buf(),
        reason: err.to_string(),
    })?;

    let handle = Logger::try_with_str(level.to_string().to_lowercase())
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(FileSpec::default().directory(dir).basename(LOG_BASENAME))
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    PANIC_HOOK.call_once(install_panic_hook);
    info!(
        "event=logging_init module=logging status=ok os={} debug_build={} version={} level={}",
        std::env::consts::OS,
        cfg!(debug_assertions),
        env!("CARGO_PKG_VERSION"),
        level
    );

    Ok(ActiveLogger {
        level,
        dir: dir.to_path_buf(),
        _handle: handle,
    })
}

fn install_panic_hook() {
    let next = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        error!(
            "event=panic module=logging status=error location={} message={}",
            location,
            one_line(&panic_text(info.payload()), PANIC_TEXT_LIMIT)
        );
        next(info);
    }));
}

fn panic_text(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|text| text.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "<non-text payload>".to_string())
}

/// Collapses line breaks and caps `text` at `limit` characters.
fn one_line(text: &str, limit: usize) -> String {
    let mut line: String = text
        .chars()
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .take(limit)
        .collect();
    if text.chars().count() > limit {
        line.push_str("...");
    }
    line
}
