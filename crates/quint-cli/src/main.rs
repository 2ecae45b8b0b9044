// crates/quint-cli/src/main.rs
// ============================================================================
// Module: Quint CLI Entry Point
// Description: Command dispatcher for the `quint` binary.
// Purpose: Scaffold a project directory and run the JSON-RPC engine.
// Dependencies: clap, quint-core, quint-mcp, quint-store-sqlite, thiserror.
// ============================================================================

//! ## Overview
//! The Quint CLI is deliberately thin: `init` scaffolds the `.quint/`
//! project layout and opens the store once to run migrations; `serve` opens
//! the store and runs the line-delimited JSON-RPC dispatcher over stdio.
//! There is no config file and no network transport — both are explicit
//! non-goals of the engine this CLI fronts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use quint_core::ContextId;
use quint_mcp::Dispatcher;
use quint_mcp::serve_stdio;
use quint_store_sqlite::SqliteStore;
use quint_store_sqlite::SqliteStoreConfig;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "quint", arg_required_else_help = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Scaffold the `.quint/` project layout and run migrations.
    Init(InitCommand),
    /// Run the JSON-RPC engine over stdio against a project directory.
    Serve(ServeCommand),
}

/// Arguments for the `init` command.
#[derive(Args, Debug)]
struct InitCommand {
    /// Project root to scaffold (defaults to the current directory).
    #[arg(long, value_name = "PATH", default_value = ".")]
    path: PathBuf,
    /// Keep the store local to the project's `.quint/` directory. This is
    /// currently the only supported mode; the flag is accepted for
    /// forward compatibility and has no other effect.
    #[arg(long)]
    local: bool,
}

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Project root to serve (defaults to the current directory).
    #[arg(long, value_name = "PATH", default_value = ".")]
    project: PathBuf,
    /// Context identifier this engine instance serves.
    #[arg(long, value_name = "ID", default_value = "default")]
    context: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => report_fatal(&err.message),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(command) => command_init(&command),
        Commands::Serve(command) => command_serve(&command),
    }
}

// ============================================================================
// SECTION: Init Command
// ============================================================================

/// Relative subdirectories scaffolded under `.quint/` by `init`.
const SCAFFOLD_DIRS: &[&str] = &[
    "knowledge/L0",
    "knowledge/L1",
    "knowledge/L2",
    "knowledge/invalid",
    "decisions",
    "sessions",
    "evidence",
];

/// Database filename under `.quint/`.
const DB_FILE_NAME: &str = "quint.db";

/// Executes the `init` command.
fn command_init(command: &InitCommand) -> CliResult<ExitCode> {
    if !command.local {
        write_stderr_line("note: --local is the only supported mode; proceeding as if it were set")
            .map_err(|err| CliError::new(output_error(&err)))?;
    }

    let quint_dir = command.path.join(".quint");
    for relative in SCAFFOLD_DIRS {
        let dir = quint_dir.join(relative);
        fs::create_dir_all(&dir)
            .map_err(|err| CliError::new(format!("failed to create {}: {err}", dir.display())))?;
    }

    let db_path = quint_dir.join(DB_FILE_NAME);
    let config = SqliteStoreConfig::new(db_path.clone());
    SqliteStore::open(&config).map_err(|err| CliError::new(format!("failed to initialise store: {err}")))?;

    write_stdout_line(&format!("Initialised Quint project at {}", quint_dir.display()))
        .map_err(|err| CliError::new(output_error(&err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
fn command_serve(command: &ServeCommand) -> CliResult<ExitCode> {
    let db_path = command.project.join(".quint").join(DB_FILE_NAME);
    ensure_initialised(&command.project, &db_path)?;

    let config = SqliteStoreConfig::new(db_path);
    let store = SqliteStore::open(&config).map_err(|err| CliError::new(format!("failed to open store: {err}")))?;
    let mut dispatcher = Dispatcher::new(store, ContextId::new(command.context.clone()));

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut reader = stdin.lock();
    let mut writer = stdout.lock();
    serve_stdio(&mut dispatcher, &mut reader, &mut writer)
        .map_err(|err| CliError::new(format!("engine loop failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Returns an error if `project` has not been scaffolded with `quint init`.
fn ensure_initialised(project: &Path, db_path: &Path) -> CliResult<()> {
    if db_path.exists() {
        return Ok(());
    }
    Err(CliError::new(format!(
        "no Quint project found at {} (run `quint init --path {}` first)",
        project.display(),
        project.display()
    )))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> io::Result<()> {
    use std::io::Write;
    let mut stdout = io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> io::Result<()> {
    use std::io::Write;
    let mut stderr = io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an I/O failure writing CLI output.
fn output_error(error: &io::Error) -> String {
    format!("failed to write output: {error}")
}

/// Emits a fatal error message to stderr and returns a failure exit code.
fn report_fatal(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
