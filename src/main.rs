//! osdiag - diagnostics for a platform server installation.

#![allow(dead_code)]

mod cli;
mod config;
mod hsconf;
mod logger;
mod probe;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::DiagConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = DiagConfig::load(&cli)?;
    logger::set_verbose(config.log.verbose);
    if let Some(file) = &config.log.file {
        logger::set_log_file(file);
    }
    if let Some(path) = &config.config_path {
        debug!("config"; "using {}", path.display());
    }

    let result = match &cli.command {
        Commands::Conf { args } => cli::conf::show_server_conf(args, &config),
        Commands::Service { names } => cli::probe::show_service_status(names, &config),
        Commands::Suspend { pid } => cli::probe::suspend_process(*pid),
        Commands::Resume { pid } => cli::probe::resume_process(*pid),
    };

    // Mirror the failure into the log file before exiting
    if let Err(err) = result {
        log!("error"; "{:#}", err);
        std::process::exit(1);
    }
    Ok(())
}
