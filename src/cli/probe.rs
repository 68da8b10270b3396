//! `osdiag service`, `osdiag suspend` and `osdiag resume`.

use crate::{config::DiagConfig, log, probe};
use anyhow::{Context, Result, bail};
use owo_colors::{OwoColorize, Stream};

/// Print the status of each named service, or of `probe.services`.
///
/// Fails only after all services were printed, if any lookup failed.
pub fn show_service_status(names: &[String], config: &DiagConfig) -> Result<()> {
    let names = if names.is_empty() {
        config.probe.services.as_slice()
    } else {
        names
    };
    if names.is_empty() {
        bail!("no service names given and `probe.services` is empty");
    }

    let mut failed = 0;
    for name in names {
        let status = probe::service_status(name);
        let symbol = if status.is_running() {
            "✓".if_supports_color(Stream::Stdout, |s| s.green()).to_string()
        } else if status.is_error() {
            failed += 1;
            "✗".if_supports_color(Stream::Stdout, |s| s.red()).to_string()
        } else {
            "•".if_supports_color(Stream::Stdout, |s| s.yellow()).to_string()
        };
        println!("{symbol} {name}: {status}");
    }

    if failed > 0 {
        bail!("{failed} of {} service lookups failed", names.len());
    }
    Ok(())
}

pub fn suspend_process(pid: u32) -> Result<()> {
    probe::suspend(pid).with_context(|| format!("failed to suspend process {pid}"))?;
    log!("probe"; "suspended process {}", pid);
    Ok(())
}

pub fn resume_process(pid: u32) -> Result<()> {
    probe::resume(pid).with_context(|| format!("failed to resume process {pid}"))?;
    log!("probe"; "resumed process {}", pid);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_service_names() {
        let err = show_service_status(&[], &DiagConfig::default()).unwrap_err();
        assert!(err.to_string().contains("probe.services"));
    }

    #[test]
    fn test_invalid_names_fail_after_printing() {
        let names = vec!["bad/name".to_string(), String::new()];
        let err = show_service_status(&names, &DiagConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "2 of 2 service lookups failed");
    }

    #[test]
    fn test_config_services_are_used() {
        let mut config = DiagConfig::default();
        config.probe.services = vec!["a\\b".to_string()];
        let err = show_service_status(&[], &config).unwrap_err();
        assert_eq!(err.to_string(), "1 of 1 service lookups failed");
    }

    #[test]
    fn test_suspend_unknown_process() {
        let err = suspend_process(u32::MAX).unwrap_err();
        assert!(err.to_string().contains("failed to suspend process"));
    }
}
