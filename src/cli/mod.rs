//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Workspace setup | `init` |
//! | User | Team members | `user add`, `user list`, `user deactivate` |
//! | Task | Editorial work | `task add`, `task list --today`, `task update` |
//! | Shift | Working hours | `shift add`, `shift list --week-start` |
//! | Log | Daily work records | `log add`, `log list` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! editdesk --verbose task list
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod user;
mod task;
mod shift;
mod log;

pub use app::{Cli, Commands, run, LOG_ENV_VAR};
pub use output::{Output, OutputFormat};
