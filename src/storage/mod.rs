//! # Storage Layer
//!
//! Persistence for editdesk: a local SQLite database plus TOML configuration.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Members, tasks, shifts, work logs | SQLite | `.editdesk/editdesk.db` |
//! | Workspace config | TOML | `.editdesk/config.toml` |
//! | Global config | TOML | `<config dir>/editdesk/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - The database runs in WAL mode so reads don't block on a writer
//! - Updates read, derive and write inside one `IMMEDIATE` transaction
//!
//! ## Workspace Structure
//!
//! ```text
//! .editdesk/
//! ├── config.toml           # Workspace configuration
//! ├── editdesk.db           # SQLite database (name configurable)
//! └── .gitignore            # Ignores the database files
//! ```
//!
//! ## Key Types
//!
//! - [`Workspace`] - Entry point for locating config and the database
//! - [`Database`] - Open/close handle with typed queries
//! - [`Config`] - Workspace and global configuration

mod config;
mod database;
mod workspace;

pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, WorkspaceConfig, DATABASE_ENV_VAR, WORKSPACE_DIR};
pub use database::{Database, DatabaseError};
pub use workspace::{Workspace, WorkspaceError};
