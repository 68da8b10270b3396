//! CLI command implementations.

pub mod args;
pub mod conf;
pub mod probe;

pub use args::{Cli, Commands};
