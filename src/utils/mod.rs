//! Shared helpers.

pub mod exec;
