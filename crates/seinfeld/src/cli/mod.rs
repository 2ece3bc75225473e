//! Command-line interface module.
//!
//! This module provides the CLI structure and handlers for the seinfeld binary.

mod commands;
mod display;
mod run;

pub use commands::Cli;
pub use run::run_generator;
