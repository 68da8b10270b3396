//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading `osdiag.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file `{0}` not found")]
    NotFound(PathBuf),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_config_error_display() {
        let io_err = ConfigError::Io(
            PathBuf::from("osdiag.toml"),
            Error::new(ErrorKind::PermissionDenied, "denied"),
        );
        let display = format!("{io_err}");
        assert!(display.contains("IO error"));
        assert!(display.contains("osdiag.toml"));

        let validation_err = ConfigError::Validation("platform.version is empty".to_string());
        assert!(format!("{validation_err}").contains("platform.version is empty"));
    }
}
