//! CLI module
//!
//! Command-line interface for exporting records.
//!
//! # Commands
//!
//! - `describe` - Show an object's label and fields
//! - `export` - Write records to JSON and CSV
//! - `updated` - List records changed in a preset window
//! - `query` - Run a REST query into files
//! - `presets` - Show the date preset table

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{build_request, Runner};
