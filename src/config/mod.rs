//! Tool configuration management for `osdiag.toml`.
//!
//! # Sections
//!
//! | Section      | Purpose                                           |
//! |--------------|---------------------------------------------------|
//! | `[platform]` | Server configuration path and platform version    |
//! | `[log]`      | Append log file and verbosity                     |
//! | `[probe]`    | Default service names for `osdiag service`        |
//!
//! The file is optional. Values resolve in this order: CLI flag, config
//! file, built-in default.

mod error;
mod util;

pub use error::ConfigError;

use util::{find_config_file, resolve_relative};

use crate::{cli::Cli, log};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config file name searched for when `-C` is not given.
pub const DEFAULT_CONFIG_NAME: &str = "osdiag.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing osdiag.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagConfig {
    /// Absolute path to the loaded config file (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Server configuration settings
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,

    /// Probe settings
    #[serde(default)]
    pub probe: ProbeConfig,
}

/// `[platform]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Path to `server.hsconf`
    pub server_conf: PathBuf,
    /// Installed platform version, e.g. `11.0.0`
    pub version: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            server_conf: PathBuf::from("server.hsconf"),
            version: "11.0".to_string(),
        }
    }
}

/// `[log]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Append every log line to this file
    pub file: Option<PathBuf>,
    /// Show debug output
    pub verbose: bool,
}

/// `[probe]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Services checked when `osdiag service` gets no names
    pub services: Vec<String>,
}

impl DiagConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. A missing default file
    /// falls back to built-in defaults; a missing explicit `-C` file is an error.
    pub fn load(cli: &Cli) -> Result<Self> {
        let name = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_NAME));

        let mut config = match find_config_file(&name) {
            Some(path) => Self::from_path(&path)?,
            None if cli.config.is_some() => return Err(ConfigError::NotFound(name).into()),
            None => Self::default(),
        };

        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let (config, _) = Self::parse_with_ignored(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    ///
    /// Relative paths inside the file resolve against its directory.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (mut config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            log!("warning"; "ignoring unknown fields in {}: {}", path.display(), ignored.join(", "));
        }

        if let Some(root) = path.parent() {
            config.normalize_paths(root);
        }
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn normalize_paths(&mut self, root: &Path) {
        self.platform.server_conf = resolve_relative(root, &self.platform.server_conf);
        if let Some(file) = &self.log.file {
            self.log.file = Some(resolve_relative(root, file));
        }
    }

    /// Apply global CLI flags on top of file values.
    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(file) = &cli.log_file {
            self.log.file = Some(file.clone());
        }
        if cli.verbose {
            self.log.verbose = true;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.platform.server_conf.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "platform.server_conf must not be empty".to_string(),
            ));
        }
        if self.platform.version.trim().is_empty() {
            return Err(ConfigError::Validation(
                "platform.version must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = DiagConfig::from_str("").unwrap();
        assert_eq!(config.platform.server_conf, PathBuf::from("server.hsconf"));
        assert_eq!(config.platform.version, "11.0");
        assert!(config.log.file.is_none());
        assert!(config.probe.services.is_empty());
    }

    #[test]
    fn test_parse_all_sections() {
        let config = DiagConfig::from_str(
            r#"
[platform]
server_conf = "/opt/platform/server.hsconf"
version = "10.0.1"

[log]
file = "osdiag.log"
verbose = true

[probe]
services = ["W3SVC", "MSSQLSERVER"]
"#,
        )
        .unwrap();
        assert_eq!(config.platform.version, "10.0.1");
        assert!(config.log.verbose);
        assert_eq!(config.probe.services, vec!["W3SVC", "MSSQLSERVER"]);
    }

    #[test]
    fn test_unknown_fields_are_collected() {
        let (_, ignored) = DiagConfig::parse_with_ignored(
            r#"
[platform]
versoin = "11"

[extra]
key = 1
"#,
        )
        .unwrap();
        assert!(ignored.contains(&"platform.versoin".to_string()));
        assert!(ignored.iter().any(|path| path.starts_with("extra")));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(DiagConfig::from_str("[platform\nversion = ").is_err());
    }

    #[test]
    fn test_from_path_resolves_relative_paths() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_NAME);
        fs::write(
            &path,
            "[platform]\nserver_conf = \"conf/server.hsconf\"\n[log]\nfile = \"osdiag.log\"\n",
        )
        .unwrap();

        let config = DiagConfig::from_path(&path).unwrap();
        assert_eq!(
            config.platform.server_conf,
            dir.path().join("conf/server.hsconf")
        );
        assert_eq!(config.log.file, Some(dir.path().join("osdiag.log")));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_cli_overrides_and_validation() {
        let cli = Cli::try_parse_from(["osdiag", "--log-file", "run.log", "-v", "service"]).unwrap();
        let mut config = DiagConfig::default();
        config.apply_cli(&cli);
        assert_eq!(config.log.file, Some(PathBuf::from("run.log")));
        assert!(config.log.verbose);
        assert!(config.validate().is_ok());

        config.platform.version = " ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        let cli = Cli::try_parse_from([
            "osdiag",
            "-C",
            missing.to_str().unwrap(),
            "service",
        ])
        .unwrap();
        assert!(DiagConfig::load(&cli).is_err());
    }
}
