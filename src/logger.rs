//! Logging utilities with colored output and an optional append log.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro for output shown only in verbose mode
//! - `append_line` for writing plain lines to a log file
//!
//! # Example
//!
//! ```ignore
//! log!("conf"; "loaded {} sections", count);
//! debug!("probe"; "querying {}", name);
//! ```

use chrono::Local;
use owo_colors::{OwoColorize, Stream, Style};
use parking_lot::Mutex;
use std::{
    fs::OpenOptions,
    io::{self, Write, stderr},
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Log file every message is mirrored to (set by --log-file or `log.file`)
static LOG_FILE: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Mirror all further log messages to `path`.
pub fn set_log_file(path: impl Into<PathBuf>) {
    *LOG_FILE.lock() = Some(path.into());
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
///
/// Terminal output goes to stderr so command output on stdout stays clean.
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    {
        let mut stderr = stderr().lock();
        writeln!(stderr, "{prefix} {message}").ok();
        stderr.flush().ok();
    }

    if let Some(path) = LOG_FILE.lock().as_deref() {
        append_line(path, &format!("{} [{module}] {message}", now())).ok();
    }
}

/// Apply color to a module prefix based on module type
///
/// Honors `--color` through `owo_colors::set_override`.
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let style = match module_lower {
        "conf" => Style::new().bright_blue().bold(),
        "probe" => Style::new().bright_green().bold(),
        "error" => Style::new().bright_red().bold(),
        _ => Style::new().bright_yellow().bold(),
    };
    format!("[{module}]")
        .if_supports_color(Stream::Stderr, |prefix| prefix.style(style))
        .to_string()
}

/// Append `message` and a newline to `path`, creating the file if needed.
pub fn append_line(path: &Path, message: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{message}")
}

/// Format used to stamp log-file lines.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local date and time for log-file lines.
fn now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_append_line_creates_and_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("osdiag.log");

        append_line(&path, "first").unwrap();
        append_line(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_append_line_missing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("osdiag.log");
        assert!(append_line(&path, "lost").is_err());
    }

    #[test]
    fn test_now_carries_date() {
        let stamp = now();
        assert_eq!(stamp.len(), "2024-01-31 23:59:59".len());
        assert!(chrono::NaiveDateTime::parse_from_str(&stamp, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn test_prefix_contains_module() {
        assert!(colorize_prefix("conf", "conf").contains("[conf]"));
        assert!(colorize_prefix("Probe", "probe").contains("[Probe]"));
    }
}
