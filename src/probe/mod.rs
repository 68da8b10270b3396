//! Operating-system probes used alongside the configuration check.
//!
//! - [`service_status`]: status of a named service
//! - [`suspend`] / [`resume`]: stop and continue a process by pid

mod process;
mod service;

pub use process::{ProbeError, resume, suspend};
pub use service::{ServiceStatus, service_status};
