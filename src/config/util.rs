//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from current directory
///
/// Starts from cwd and walks up parent directories until finding `config_name`
/// Returns the absolute path to the config file if found
///
/// # Example
/// ```text
/// /opt/platform/logs/      ← cwd
/// /opt/platform/osdiag.toml ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let cwd = std::env::current_dir().ok()?;
    find_config_file_from(&cwd, config_name)
}

/// Walk up from `start` looking for `config_name`.
pub fn find_config_file_from(start: &Path, config_name: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }

        // Move to parent directory
        match current.parent() {
            Some(parent) => current = parent,
            None => return None, // Reached filesystem root
        }
    }
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

// ============================================================================
// tests
// ============================================================================
