//! Workspace management
//!
//! Handles workspace initialization and hands out database handles.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::{Config, WorkspaceConfig, WORKSPACE_DIR};
use super::Database;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Not in an editdesk workspace. Run 'editdesk init' first.")]
    NotInWorkspace,

    #[error("Not an editdesk workspace: {0}")]
    NotAWorkspace(PathBuf),
}

/// An editdesk workspace
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    /// Opens an existing workspace at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(WORKSPACE_DIR).is_dir() {
            return Err(WorkspaceError::NotAWorkspace(root).into());
        }

        let config = Config::for_workspace(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the workspace at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_workspace_root().ok_or(WorkspaceError::NotInWorkspace)?;

        Self::open(root)
    }

    /// Opens `dir` when given, otherwise searches upward from the current directory
    pub fn open_or_current(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::open(dir),
            None => Self::open_current(),
        }
    }

    /// Initializes a new workspace at the given path
    ///
    /// Existing configuration is left untouched, so running this twice is safe.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let desk_dir = root.join(WORKSPACE_DIR);

        fs::create_dir_all(&desk_dir).with_context(|| {
            format!("Failed to create {} directory: {}", WORKSPACE_DIR, desk_dir.display())
        })?;

        let config_path = desk_dir.join("config.toml");
        if !config_path.exists() {
            let config = Config {
                workspace: WorkspaceConfig::default(),
                global: Config::load_global()?,
                workspace_root: Some(root.clone()),
            };
            config.save_workspace()?;
        }

        let gitignore_path = desk_dir.join(".gitignore");
        if !gitignore_path.exists() {
            let gitignore = r#"# Local database and SQLite side files
*.db
*.db-wal
*.db-shm
"#;
            fs::write(&gitignore_path, gitignore).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        let workspace = Self::open(root)?;

        // Create the schema up front so the first command doesn't pay for it
        workspace.database()?.close()?;

        Ok(workspace)
    }

    /// Returns the workspace root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .editdesk directory path
    pub fn desk_dir(&self) -> PathBuf {
        self.root.join(WORKSPACE_DIR)
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolved database file location
    pub fn database_path(&self) -> Result<PathBuf> {
        self.config.database_path()
    }

    /// Acquires a database handle for this workspace
    pub fn database(&self) -> Result<Database> {
        let path = self.database_path()?;
        Database::open(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_structure() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::init(dir.path()).unwrap();

        assert!(workspace.desk_dir().is_dir());
        assert!(workspace.desk_dir().join("config.toml").is_file());
        assert!(workspace.desk_dir().join(".gitignore").is_file());
        assert!(workspace.desk_dir().join("editdesk.db").is_file());
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();

        Workspace::init(dir.path()).unwrap();
        Workspace::init(dir.path()).unwrap();

        assert!(dir.path().join(WORKSPACE_DIR).is_dir());
    }

    #[test]
    fn init_keeps_existing_config() {
        let dir = TempDir::new().unwrap();
        let desk_dir = dir.path().join(WORKSPACE_DIR);
        fs::create_dir_all(&desk_dir).unwrap();
        fs::write(desk_dir.join("config.toml"), "database = \"custom.db\"\n").unwrap();

        let workspace = Workspace::init(dir.path()).unwrap();
        assert_eq!(workspace.config().workspace.database, "custom.db");
        assert!(desk_dir.join("custom.db").is_file());
    }

    #[test]
    fn open_existing_workspace() {
        let dir = TempDir::new().unwrap();
        Workspace::init(dir.path()).unwrap();

        let workspace = Workspace::open(dir.path()).unwrap();
        assert_eq!(workspace.root(), dir.path());
    }

    #[test]
    fn open_non_workspace_fails() {
        let dir = TempDir::new().unwrap();
        let result = Workspace::open(dir.path());

        assert!(result.is_err());
    }
}
