//! CLI commands and argument parsing

use crate::presets::DatePreset;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Salesforce record export CLI
#[derive(Parser, Debug)]
#[command(name = "crm-extract")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Root directory for results (overrides the config file)
    #[arg(long, global = true)]
    pub output_root: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show an object's label and fields
    Describe {
        /// Object API name, e.g. Account
        object: String,
    },

    /// Export records of an object to JSON and CSV
    Export {
        /// Object API name
        object: String,

        /// Fields to select (comma-separated, default = all)
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,

        /// Membership filter, repeatable
        #[arg(long = "where", value_name = "FIELD=V1,V2")]
        conditions: Vec<String>,

        /// Named last-modified window
        #[arg(long, value_enum)]
        preset: Option<DatePreset>,

        /// Window start (RFC 3339 or YYYY-MM-DD)
        #[arg(long, requires = "end")]
        start: Option<String>,

        /// Window end (RFC 3339 or YYYY-MM-DD)
        #[arg(long, requires = "start")]
        end: Option<String>,
    },

    /// List ids of records changed in a preset window
    Updated {
        /// Object API name
        object: String,

        /// Named window
        #[arg(long, value_enum)]
        preset: DatePreset,
    },

    /// Run a SOQL query through the REST API and write the records
    Query {
        /// SOQL statement
        soql: String,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// File name without extension
        #[arg(long, default_value = "query_results")]
        name: String,
    },

    /// Show the date preset table
    Presets,
}

impl Commands {
    /// Subcommand name as typed on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Describe { .. } => "describe",
            Commands::Export { .. } => "export",
            Commands::Updated { .. } => "updated",
            Commands::Query { .. } => "query",
            Commands::Presets => "presets",
        }
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
