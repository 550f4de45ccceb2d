//! bibman CLI
//!
//! Command-line interface for bibman - bibliography entry management.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use bibman_core::{Config, RecordStore, StoreError};

mod commands;
mod logging;
mod output;
mod prompt;

use commands::entry::EntryFields;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "bibman")]
#[command(about = "bibman - Manage bibliography entries")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/bibman/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all entries
    #[command(alias = "ls")]
    List,
    /// Add a new entry
    Add {
        #[arg(short = 'T', long, default_value = "")]
        title: String,
        #[arg(short, long, default_value = "")]
        author: String,
        #[arg(short, long, default_value = "0")]
        year: String,
        #[arg(short, long, default_value = "")]
        journal: String,
    },
    /// Show an entry
    Show {
        /// Entry ID
        id: String,
    },
    /// Edit an entry (prompts for each field when none are given)
    Edit {
        /// Entry ID
        id: String,
        #[arg(short = 'T', long)]
        title: Option<String>,
        #[arg(short, long)]
        author: Option<String>,
        #[arg(short, long)]
        year: Option<String>,
        #[arg(short, long)]
        journal: Option<String>,
    },
    /// Delete an entry
    #[command(alias = "rm")]
    Delete {
        /// Entry ID
        id: String,
    },
    /// Search title, author and journal (and year, for numeric queries)
    Search {
        /// Search text
        query: String,
    },
    /// Import one entry from a .bib file
    Import {
        /// File to import
        file: PathBuf,
    },
    /// Export an entry to a .bib file
    Export {
        /// Entry ID
        id: String,
        /// Directory to write to (defaults to export_dir or the current directory)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show status (storage location, entry count)
    Status,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, table_name, export_dir, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    match run(cli, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(hint) = e
                .downcast_ref::<StoreError>()
                .and_then(StoreError::recovery_suggestion)
            {
                eprintln!("Hint: {}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, output: &Output) -> Result<()> {
    let config_path = cli.config.as_ref();

    // Config commands work on the file itself and never open the store
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), config_path, output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    logging::init_logging(&config, cli.verbose);

    let store = RecordStore::open(&config).context("Failed to open entry store")?;

    match cli.command {
        Commands::List => commands::entry::list(&store, output),
        Commands::Add {
            title,
            author,
            year,
            journal,
        } => commands::entry::add(&store, title, author, year, journal, output),
        Commands::Show { id } => commands::entry::show(&store, id, output),
        Commands::Edit {
            id,
            title,
            author,
            year,
            journal,
        } => {
            let fields = EntryFields {
                title,
                author,
                year,
                journal,
            };
            commands::entry::edit(&store, id, fields, output)
        }
        Commands::Delete { id } => commands::entry::delete(&store, id, output),
        Commands::Search { query } => commands::entry::search(&store, query, output),
        Commands::Import { file } => commands::transfer::import(&store, file, output),
        Commands::Export { id, out_dir } => {
            let dir = out_dir.unwrap_or_else(|| config.export_dir_or_current());
            commands::transfer::export(&store, id, dir, output)
        }
        Commands::Status => commands::status::show(&store, &config, output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}
