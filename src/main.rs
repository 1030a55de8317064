// Main entry point for the CLI application

use anyhow::Result;
use clap::Parser;
use csvload::args::{Cli, Commands};
use csvload::config::AppConfig;
use csvload::db;
use csvload::etl::{LoadMode, Loader};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stderr, so `count` output stays a bare integer on stdout
    if !cli.config.exists() {
        eprintln!("⚠️  Configuration file not found, using defaults");
    }
    let config = AppConfig::load(&cli.config)?;

    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Load {
            file,
            table,
            mode,
            delimiter,
        } => run_load_command(&config, file, table, mode, delimiter),

        Commands::Count { table } => run_count_command(&config, table),

        Commands::InitConfig { output } => {
            let default_config = AppConfig::default();
            default_config.save_to_file(&output)?;
            println!("✅ Created default configuration at: {}", output.display());
            Ok(())
        }
    }
}

fn init_logging(config: &AppConfig, verbose: bool) {
    let default_level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_load_command(
    config: &AppConfig,
    file: PathBuf,
    table: String,
    mode: LoadMode,
    delimiter: Option<char>,
) -> Result<()> {
    println!("📂 Loading file: {}", file.display());

    let delimiter = delimiter.unwrap_or(config.load.delimiter);
    let Ok(delimiter) = u8::try_from(delimiter) else {
        anyhow::bail!("delimiter must be a single-byte character");
    };

    let loader = Loader::new()
        .with_mode(mode)
        .with_delimiter(delimiter)
        .with_headers(config.load.has_headers);

    let start = Instant::now();
    let result = db::connect(&config.connection)
        .and_then(|mut dest| loader.load_csv(&file, dest.as_mut(), &table));
    let duration = start.elapsed();

    match result {
        Ok(count) => {
            println!(
                "✅ Data from '{}' successfully loaded into {} table '{}'",
                file.display(),
                config.connection.driver.scheme(),
                table
            );
            println!("📊 {} rows in {:.2}s", count, duration.as_secs_f64());
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Failed to load '{}': {}", file.display(), e);
            std::process::exit(1);
        }
    }
}

fn run_count_command(config: &AppConfig, table: String) -> Result<()> {
    let result = db::connect(&config.connection).and_then(|mut dest| dest.count_rows(&table));

    match result {
        // Bare integer on stdout so callers can capture it
        Ok(count) => {
            println!("{}", count);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Failed to count '{}': {}", table, e);
            std::process::exit(1);
        }
    }
}
