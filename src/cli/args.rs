//! Command-line interface definitions.

use crate::hsconf::SectionKind;
use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Platform server diagnostics CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: osdiag.toml, searched upward from cwd)
    #[arg(short = 'C', long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Append every log line to this file
    #[arg(long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Read the server configuration file and print its sections
    #[command(visible_alias = "c")]
    Conf {
        #[command(flatten)]
        args: ConfArgs,
    },

    /// Show the status of operating-system services
    #[command(visible_alias = "s")]
    Service {
        /// Service names. If omitted, uses `probe.services` from the config.
        #[arg(value_name = "NAME")]
        names: Vec<String>,
    },

    /// Suspend every thread of a process
    Suspend {
        /// Process id
        pid: u32,
    },

    /// Resume a suspended process
    Resume {
        /// Process id
        pid: u32,
    },
}

/// Conf command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct ConfArgs {
    /// Server configuration file (default: `platform.server_conf`)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub path: Option<PathBuf>,

    /// Platform version; versions starting with `10.` have no logging database section
    #[arg(short = 'p', long)]
    pub platform_version: Option<String>,

    /// Only print these sections (repeatable)
    #[arg(short, long = "section", value_enum)]
    pub sections: Vec<SectionKind>,

    /// Output JSON instead of text
    #[arg(short, long)]
    pub json: bool,

    /// Pretty-print JSON output
    #[arg(short = 'P', long, requires = "json")]
    pub pretty: bool,

    /// Write output to file instead of stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}
