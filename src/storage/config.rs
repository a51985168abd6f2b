//! Configuration handling for editdesk
//!
//! Configuration is stored in `.editdesk/config.toml` (workspace) and
//! `~/.config/editdesk/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{TaskStatus, TaskType, DEFAULT_ROLE};

/// Name of the workspace directory
pub const WORKSPACE_DIR: &str = ".editdesk";

/// Environment variable that overrides the database location
pub const DATABASE_ENV_VAR: &str = "EDITDESK_DATABASE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Workspace-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Database file name, relative to `.editdesk/`
    pub database: String,

    /// Role for members added without `--role`
    pub default_role: String,

    /// Type for tasks added without `--type`
    pub default_task_type: TaskType,

    /// Status for tasks added without `--status`
    pub default_task_status: TaskStatus,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            database: "editdesk.db".to_string(),
            default_role: DEFAULT_ROLE.to_string(),
            default_task_type: TaskType::NewArticle,
            default_task_status: TaskStatus::NotStarted,
        }
    }
}

impl WorkspaceConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let db = self.database.trim();
        if db.is_empty() {
            return Err(ConfigError::Invalid("database must not be empty".to_string()));
        }
        if Path::new(db).is_absolute() || db.contains("..") {
            return Err(ConfigError::Invalid(format!(
                "database must be a file name inside {}: '{}'",
                WORKSPACE_DIR, db
            )));
        }
        Ok(())
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + workspace)
#[derive(Debug, Clone)]
pub struct Config {
    pub workspace: WorkspaceConfig,
    pub global: GlobalConfig,
    pub workspace_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration for a specific workspace
    pub fn for_workspace(workspace_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let workspace = Self::load_workspace_config(workspace_root)?;

        Ok(Self {
            workspace,
            global,
            workspace_root: Some(workspace_root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "editdesk", "editdesk").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    pub fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads workspace configuration from a specific root
    fn load_workspace_config(workspace_root: &Path) -> Result<WorkspaceConfig> {
        let config_path = workspace_root.join(WORKSPACE_DIR).join("config.toml");

        if !config_path.exists() {
            return Ok(WorkspaceConfig::default());
        }

        let content = fs::read_to_string(&config_path).with_context(|| {
            format!("Failed to read workspace config: {}", config_path.display())
        })?;

        let config: WorkspaceConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse workspace config")?;
        config.validate()?;

        Ok(config)
    }

    /// Finds the workspace root by looking for `.editdesk/` upward from the current directory
    pub fn find_workspace_root() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            if current.join(WORKSPACE_DIR).is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Returns the workspace root, or an error if not in a workspace
    pub fn require_workspace_root(&self) -> Result<&Path> {
        self.workspace_root
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Not in an editdesk workspace. Run 'editdesk init' first."))
    }

    /// Resolves the database path: `$EDITDESK_DATABASE`, then the configured file
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Ok(raw) = std::env::var(DATABASE_ENV_VAR) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        let root = self.require_workspace_root()?;
        Ok(root.join(WORKSPACE_DIR).join(self.workspace.database.trim()))
    }

    /// Saves the workspace configuration
    pub fn save_workspace(&self) -> Result<()> {
        let root = self.require_workspace_root()?;
        let config_path = root.join(WORKSPACE_DIR).join("config.toml");

        let content = toml::to_string_pretty(&self.workspace)
            .context("Failed to serialize workspace config")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write workspace config: {}", config_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config {
            workspace: WorkspaceConfig::default(),
            global: GlobalConfig::default(),
            workspace_root: None,
        };

        assert_eq!(config.workspace.database, "editdesk.db");
        assert_eq!(config.workspace.default_role, "writer");
        assert_eq!(config.workspace.default_task_type, TaskType::NewArticle);
        assert_eq!(config.global.default_format, OutputFormat::Text);
    }

    #[test]
    fn parse_workspace_config() {
        let toml = r#"
database = "desk.db"
default_role = "editor"
default_task_type = "rewrite"
default_task_status = "in_progress"
"#;

        let config: WorkspaceConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.database, "desk.db");
        assert_eq!(config.default_role, "editor");
        assert_eq!(config.default_task_type, TaskType::Rewrite);
        assert_eq!(config.default_task_status, TaskStatus::InProgress);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_workspace_config_keeps_defaults() {
        let config: WorkspaceConfig = toml::from_str("default_role = \"checker\"").unwrap();
        assert_eq!(config.database, "editdesk.db");
        assert_eq!(config.default_role, "checker");
    }

    #[test]
    fn rejects_database_outside_workspace() {
        let config = WorkspaceConfig {
            database: "../shared.db".to_string(),
            ..WorkspaceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn parse_global_config() {
        let config: GlobalConfig = toml::from_str("default_format = \"json\"").unwrap();
        assert_eq!(config.default_format, OutputFormat::Json);
    }

    #[test]
    fn for_workspace_reads_file() {
        let dir = TempDir::new().unwrap();
        let desk_dir = dir.path().join(WORKSPACE_DIR);
        fs::create_dir_all(&desk_dir).unwrap();
        fs::write(desk_dir.join("config.toml"), "database = \"team.db\"\n").unwrap();

        let config = Config::for_workspace(dir.path()).unwrap();
        assert_eq!(config.workspace.database, "team.db");
        assert_eq!(config.workspace_root.as_deref(), Some(dir.path()));
    }

    #[test]
    fn config_not_in_workspace() {
        let config = Config {
            workspace: WorkspaceConfig::default(),
            global: GlobalConfig::default(),
            workspace_root: None,
        };

        assert!(config.require_workspace_root().is_err());
    }
}
