use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::etl::LoadMode;

#[derive(Parser)]
#[command(name = "csvload")]
#[command(about = "Load delimited files into PostgreSQL or MySQL tables and verify row counts.")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    // Configuration file path
    #[arg(short, long, default_value = "csvload.yaml")]
    pub config: PathBuf,

    // Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    // Load a delimited file into a database table
    Load {
        // Path to the source file
        file: PathBuf,

        // Target table name
        table: String,

        // Write mode for an existing table
        #[arg(short, long, value_enum, default_value_t = LoadMode::Replace)]
        mode: LoadMode,

        // Field delimiter; falls back to the configured one
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    // Print the row count of a table
    Count {
        // Table name to count
        table: String,
    },

    // Generate default configuration file
    InitConfig {
        #[arg(short, long, default_value = "csvload.yaml")]
        output: PathBuf,
    },
}
