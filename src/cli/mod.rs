//! CLI module for the datamaker binary

pub mod commands;
pub mod error;
pub mod output;

pub use error::CliError;
