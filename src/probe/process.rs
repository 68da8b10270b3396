//! Process suspend and resume.

use crate::debug;
use sysinfo::{Pid, Signal, System};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no process with pid {0}")]
    NoSuchProcess(u32),

    #[error("signal {signal:?} is not supported on this platform")]
    Unsupported { signal: Signal },

    #[error("process {pid} refused signal {signal:?}")]
    SignalRefused { pid: u32, signal: Signal },
}

/// Stop every thread of the process.
pub fn suspend(pid: u32) -> Result<(), ProbeError> {
    let system = load_process(pid)?;
    deliver(&system, pid, Signal::Stop)
}

/// Continue a stopped process. A process without a name is left alone.
pub fn resume(pid: u32) -> Result<(), ProbeError> {
    let system = load_process(pid)?;
    let unnamed = system
        .process(Pid::from_u32(pid))
        .is_some_and(|process| process.name().is_empty());
    if unnamed {
        debug!("probe"; "process {} has no name, not resuming", pid);
        return Ok(());
    }
    deliver(&system, pid, Signal::Continue)
}

/// Refresh only the requested process.
fn load_process(pid: u32) -> Result<System, ProbeError> {
    let mut system = System::new();
    if !system.refresh_process(Pid::from_u32(pid)) {
        return Err(ProbeError::NoSuchProcess(pid));
    }
    Ok(system)
}

fn deliver(system: &System, pid: u32, signal: Signal) -> Result<(), ProbeError> {
    let process = system
        .process(Pid::from_u32(pid))
        .ok_or(ProbeError::NoSuchProcess(pid))?;

    debug!("probe"; "sending {:?} to {} ({})", signal, pid, process.name());
    match process.kill_with(signal) {
        Some(true) => Ok(()),
        Some(false) => Err(ProbeError::SignalRefused { pid, signal }),
        None => Err(ProbeError::Unsupported { signal }),
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_pid() {
        // pid_max on Linux never reaches u32::MAX
        assert!(matches!(
            suspend(u32::MAX),
            Err(ProbeError::NoSuchProcess(u32::MAX))
        ));
        assert!(matches!(
            resume(u32::MAX),
            Err(ProbeError::NoSuchProcess(u32::MAX))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_suspend_and_resume_child() {
        use std::process::Command;

        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id();

        suspend(pid).unwrap();
        resume(pid).unwrap();

        child.kill().unwrap();
        child.wait().unwrap();
    }

    #[test]
    fn test_error_display() {
        let err = ProbeError::NoSuchProcess(42);
        assert_eq!(err.to_string(), "no process with pid 42");
    }
}
