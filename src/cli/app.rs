//! Main CLI application structure

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::{log, shift, task, user};
use crate::storage::{Config, Workspace};

/// Environment variable holding the log filter
pub const LOG_ENV_VAR: &str = "EDITDESK_LOG";

#[derive(Parser)]
#[command(name = "editdesk")]
#[command(author, version, about = "Task, shift and work-log tracking for editorial teams")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Workspace directory (defaults to searching upward from the current directory)
    #[arg(long, short = 'w', global = true)]
    pub workspace: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new editdesk workspace
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Manage team members
    #[command(subcommand)]
    User(user::UserCommands),

    /// Manage tasks
    #[command(subcommand)]
    Task(task::TaskCommands),

    /// Manage shifts
    #[command(subcommand)]
    Shift(shift::ShiftCommands),

    /// Record and list work logs
    #[command(subcommand)]
    Log(log::LogCommands),
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose)?;

    let format = match cli.format {
        Some(format) => format,
        None => Config::load_global()?.default_format,
    };
    let output = Output::new(format, cli.verbose);

    output.verbose("editdesk starting");

    let result = dispatch(cli.command, &output, cli.workspace.as_deref());

    if let Err(err) = &result {
        // Text mode errors are printed by main
        if output.is_json() {
            output.error(&format!("{:#}", err));
        }
    } else {
        output.verbose("Command completed successfully");
    }

    result
}

fn dispatch(command: Commands, output: &Output, workspace: Option<&Path>) -> Result<()> {
    match command {
        Commands::Init { path } => {
            let root = workspace.map(Path::to_path_buf).unwrap_or(path);
            output.verbose_ctx("init", &format!("Initializing workspace at: {}", root.display()));

            let ws = Workspace::init(&root)?;
            output.verbose_ctx("init", &format!("Database at: {}", ws.database_path()?.display()));

            if output.is_json() {
                output.data(&serde_json::json!({
                    "root": ws.root().display().to_string(),
                    "database": ws.database_path()?.display().to_string(),
                }));
            } else {
                output.success(&format!("Initialized editdesk workspace at {}", ws.root().display()));
            }
            Ok(())
        }

        Commands::User(cmd) => user::run(cmd, output, workspace),
        Commands::Task(cmd) => task::run(cmd, output, workspace),
        Commands::Shift(cmd) => shift::run(cmd, output, workspace),
        Commands::Log(cmd) => log::run(cmd, output, workspace),
    }
}

/// Installs the stderr log subscriber
///
/// `$EDITDESK_LOG` takes a filter directive; otherwise `--verbose` enables
/// debug events and the default is warnings only.
fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };

    let env_filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid {} filter: {e}", LOG_ENV_VAR))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        tracing::debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
