//! External command execution utilities.
//!
//! Provides a Builder-based API for running system tools and capturing
//! their output.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! let output = Cmd::new("sc").args(["query", "W3SVC"]).run()?;
//! let output = cmd("systemctl").arg("show").arg("nginx").run()?;
//! ```

use crate::debug;
use anyhow::{Context, Result};
use std::{
    ffi::{OsStr, OsString},
    process::{Command, Output},
};

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Debug, Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    envs: Vec<(String, String)>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Add a single argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    /// Set an environment variable for the subprocess.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Execute the command and capture its output.
    ///
    /// A non-zero exit status is not an error here; callers inspect
    /// `Output::status` since system tools report lookups that way.
    pub fn run(self) -> Result<Output> {
        let name = self.program.to_string_lossy().to_string();
        let args: Vec<_> = self.args.iter().map(|a| a.to_string_lossy()).collect();
        debug!("exec"; "{} {}", name, args.join(" "));

        Command::new(&self.program)
            .args(&self.args)
            .envs(self.envs.iter().cloned())
            .output()
            .with_context(|| format!("Failed to execute `{name}`"))
    }
}

/// Create a command from a single program name.
#[inline]
pub fn cmd<S: AsRef<OsStr>>(program: S) -> Cmd {
    Cmd::new(program)
}

/// Decode captured stdout and stderr as one lossy string.
pub fn output_text(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    match (stdout.trim().is_empty(), stderr.trim().is_empty()) {
        (false, false) => format!("{}\n{}", stdout.trim_end(), stderr.trim_end()),
        (false, true) => stdout.trim_end().to_string(),
        (true, _) => stderr.trim_end().to_string(),
    }
}

// ============================================================================
// tests
// ============================================================================
