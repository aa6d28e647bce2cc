//! shelf CLI
//!
//! Command-line interface for shelf - a personal book catalog.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use shelf_core::{open_store, BackendKind, Catalog, Config, StoreError};

mod commands;
mod output;
mod prompt;

use commands::book::BookEdits;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "shelf - A personal book catalog")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file (defaults to ~/.config/shelf/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage backend for this invocation (local, remote, file)
    #[arg(long, global = true)]
    backend: Option<BackendKind>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List books, optionally filtered
    #[command(alias = "ls")]
    List {
        /// Case-insensitive search over title, author and year
        query: Option<String>,
        /// Only titles starting with this letter
        #[arg(short, long)]
        letter: Option<char>,
    },
    /// Show one book
    Show {
        /// Book ID (full UUID or prefix)
        id: String,
    },
    /// Add a book (admin)
    Add {
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        author: String,
        #[arg(short, long, allow_negative_numbers = true)]
        year: Option<i32>,
    },
    /// Edit a book (admin); prompts when no fields are given
    Edit {
        /// Book ID (full UUID or prefix)
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        author: Option<String>,
        #[arg(short, long, allow_negative_numbers = true, conflicts_with = "clear_year")]
        year: Option<i32>,
        /// Remove the year
        #[arg(long)]
        clear_year: bool,
    },
    /// Delete a book (admin)
    #[command(alias = "rm")]
    Delete {
        /// Book ID (full UUID or prefix)
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Replace the collection with a JSON file (admin)
    Import {
        /// JSON file containing an array of books
        file: PathBuf,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Export the collection as books-export.json (admin)
    Export {
        /// Directory to write into (defaults to the current directory)
        #[arg(short, long, conflicts_with = "stdout")]
        output: Option<PathBuf>,
        /// Print the JSON instead of writing a file
        #[arg(long)]
        stdout: bool,
    },
    /// Log in as admin on this device
    Login {
        #[arg(short, long)]
        username: Option<String>,
        /// Password (visible in shell history; omit to be prompted without echo)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Log out on this device
    Logout,
    /// Print a password hash for the config file
    HashPassword {
        /// Password to hash (prompted without echo if omitted)
        password: Option<String>,
    },
    /// Serve the books file over HTTP
    Serve {
        /// Address to listen on (defaults to config `bind`)
        #[arg(long)]
        bind: Option<String>,
        /// Books file to serve (defaults to config `books_file`)
        #[arg(long)]
        books_file: Option<PathBuf>,
    },
    /// Show status (backend, collection size, session)
    Status,
    /// Show configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    match run(cli, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, output: &Output) -> Result<()> {
    // Needs neither config nor storage
    if let Commands::HashPassword { password } = cli.command {
        return commands::session::hash_password(password, output);
    }

    let mut config = Config::load_with_cli_override(cli.config.as_ref())?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }

    init_logging(&config, matches!(cli.command, Commands::Serve { .. }));

    match cli.command {
        Commands::HashPassword { .. } => unreachable!(), // Handled above
        Commands::Serve { bind, books_file } => commands::serve::run(&config, bind, books_file),
        Commands::Config { command } => match command {
            Some(ConfigCommands::Show) | None => {
                commands::config::show(&config, cli.config.as_ref(), output)
            }
        },
        Commands::Status => commands::status::show(&config, output),
        Commands::Login { username, password } => {
            commands::session::login(&config, username, password, output)
        }
        Commands::Logout => commands::session::logout(&config, output),
        Commands::List { query, letter } => {
            let catalog = open_catalog(&config)?;
            commands::book::list(&catalog, query, letter, output)
        }
        Commands::Show { id } => {
            let catalog = open_catalog(&config)?;
            commands::book::show(&catalog, id, output)
        }
        command => {
            commands::session::require_admin(&config)?;
            let mut catalog = open_catalog(&config)?;
            handle_admin_command(command, &mut catalog, output)
        }
    }
}

fn handle_admin_command(command: Commands, catalog: &mut Catalog, output: &Output) -> Result<()> {
    match command {
        Commands::Add {
            title,
            author,
            year,
        } => commands::book::add(catalog, title, author, year, output),
        Commands::Edit {
            id,
            title,
            author,
            year,
            clear_year,
        } => {
            let edits = BookEdits {
                title,
                author,
                year,
                clear_year,
            };
            commands::book::edit(catalog, id, edits, output)
        }
        Commands::Delete { id, yes } => commands::book::delete(catalog, id, yes, output),
        Commands::Import { file, yes } => commands::transfer::import(catalog, &file, yes, output),
        Commands::Export {
            output: dir,
            stdout,
        } => commands::transfer::export(catalog, dir, stdout, output),
        _ => unreachable!(), // Non-admin commands are dispatched in `run`
    }
}

fn open_catalog(config: &Config) -> Result<Catalog> {
    let store = open_store(config)?;
    Ok(Catalog::open(store)?)
}

/// Print an error chain, with a recovery hint for storage errors
fn report_error(error: &anyhow::Error) {
    eprintln!("Error: {:#}", error);

    let hint = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<StoreError>())
        .and_then(StoreError::recovery_suggestion);
    if let Some(hint) = hint {
        eprintln!("Hint: {}", hint);
    }
}

/// Initialize logging
///
/// `serve` logs to stderr; every other command appends to the log file
/// (config.log_file or {data_dir}/shelf.log). The level comes from
/// SHELF_LOG and defaults to info.
fn init_logging(config: &Config, to_stderr: bool) {
    let log_level = std::env::var("SHELF_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::new(format!(
        "shelf_core={},shelf_cli={}",
        log_level, log_level
    ));

    if to_stderr {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .try_init();
        return;
    }

    let log_path = config.log_file_path();
    let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            return;
        }
    };

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .try_init();

    info!("Logging to {:?}", log_path);
}
