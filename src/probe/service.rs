//! Operating-system service status lookup.

use crate::{
    debug,
    utils::exec::{cmd, output_text},
};
use regex::Regex;
use std::{fmt, sync::LazyLock};

/// Longest service name the service manager accepts.
const MAX_SERVICE_NAME: usize = 256;

/// `STATE              : 4  RUNNING` in `sc query` output
static SC_STATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*STATE[ \t]*:[ \t]*[0-9]+[ \t]+([A-Z_]+)").expect("valid regex")
});

/// Status of a service as reported to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceStatus {
    Running,
    Stopped,
    Paused,
    Stopping,
    Starting,
    Changing,
    InvalidName,
    Error(String),
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => f.write_str("Running"),
            Self::Stopped => f.write_str("Stopped"),
            Self::Paused => f.write_str("Paused"),
            Self::Stopping => f.write_str("Stopping"),
            Self::Starting => f.write_str("Starting"),
            Self::Changing => f.write_str("Changing status"),
            Self::InvalidName => f.write_str("Invalid service name."),
            Self::Error(message) => write!(f, "Error: {message}"),
        }
    }
}

impl ServiceStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::InvalidName | Self::Error(_))
    }
}

/// Query the current status of a service. Never fails; problems are
/// reported as [`ServiceStatus::InvalidName`] or [`ServiceStatus::Error`].
pub fn service_status(name: &str) -> ServiceStatus {
    if !is_valid_name(name) {
        return ServiceStatus::InvalidName;
    }
    debug!("probe"; "querying service {}", name);
    query(name)
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= MAX_SERVICE_NAME && !name.contains(['/', '\\'])
}

#[cfg(windows)]
fn query(name: &str) -> ServiceStatus {
    match cmd("sc").args(["query", name]).run() {
        Ok(output) if output.status.success() => parse_sc_query(&output_text(&output)),
        Ok(output) => ServiceStatus::Error(output_text(&output)),
        Err(err) => ServiceStatus::Error(err.to_string()),
    }
}

#[cfg(not(windows))]
fn query(name: &str) -> ServiceStatus {
    let output = cmd("systemctl")
        .args(["show", name, "--property=LoadState,ActiveState,SubState"])
        .env("LC_ALL", "C")
        .run();
    match output {
        Ok(output) if output.status.success() => parse_systemctl_show(&output_text(&output)),
        Ok(output) => ServiceStatus::Error(output_text(&output)),
        Err(err) => ServiceStatus::Error(err.to_string()),
    }
}

/// Map the `STATE` line of `sc query` output.
#[cfg_attr(not(windows), allow(dead_code))]
pub fn parse_sc_query(output: &str) -> ServiceStatus {
    let Some(state) = SC_STATE.captures(output).and_then(|c| c.get(1)) else {
        return ServiceStatus::Error(format!("unrecognized sc output: {}", output.trim()));
    };
    match state.as_str() {
        "RUNNING" => ServiceStatus::Running,
        "STOPPED" => ServiceStatus::Stopped,
        "PAUSED" => ServiceStatus::Paused,
        "STOP_PENDING" => ServiceStatus::Stopping,
        "START_PENDING" => ServiceStatus::Starting,
        _ => ServiceStatus::Changing,
    }
}

/// Map `systemctl show` key/value output.
#[cfg_attr(windows, allow(dead_code))]
pub fn parse_systemctl_show(output: &str) -> ServiceStatus {
    let value = |key: &str| {
        output.lines().find_map(|line| {
            line.split_once('=')
                .filter(|(k, _)| k.trim() == key)
                .map(|(_, v)| v.trim())
        })
    };

    if value("LoadState") == Some("not-found") {
        return ServiceStatus::Error("service not found".to_string());
    }
    match (value("ActiveState"), value("SubState")) {
        (Some("active"), Some("paused")) => ServiceStatus::Paused,
        (Some("active"), _) => ServiceStatus::Running,
        (Some("inactive" | "failed"), _) => ServiceStatus::Stopped,
        (Some("activating"), _) => ServiceStatus::Starting,
        (Some("deactivating"), _) => ServiceStatus::Stopping,
        (Some(_), _) => ServiceStatus::Changing,
        (None, _) => ServiceStatus::Error(format!(
            "unrecognized systemctl output: {}",
            output.trim()
        )),
    }
}

// ============================================================================
// tests
// ============================================================================
