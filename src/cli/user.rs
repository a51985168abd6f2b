//! Team member CLI commands

use std::path::Path;

use anyhow::{anyhow, Result};
use clap::Subcommand;

use super::output::Output;
use crate::domain::date::now_local;
use crate::domain::{NewUser, User};
use crate::storage::Workspace;

#[derive(Subcommand)]
pub enum UserCommands {
    /// Add a team member
    Add {
        /// Display name
        name: String,

        /// Role (defaults to the workspace's default_role)
        #[arg(long)]
        role: Option<String>,

        /// Create the member as inactive
        #[arg(long)]
        inactive: bool,
    },

    /// List team members
    List {
        /// Include inactive members
        #[arg(long)]
        all: bool,
    },

    /// Mark a member as active
    Activate {
        /// Member ID
        id: i64,
    },

    /// Mark a member as inactive (history is kept)
    Deactivate {
        /// Member ID
        id: i64,
    },
}

pub fn run(cmd: UserCommands, output: &Output, workspace: Option<&Path>) -> Result<()> {
    let ws = Workspace::open_or_current(workspace)?;

    match cmd {
        UserCommands::Add { name, role, inactive } => add_user(output, &ws, &name, role.as_deref(), inactive),
        UserCommands::List { all } => list_users(output, &ws, all),
        UserCommands::Activate { id } => set_active(output, &ws, id, true),
        UserCommands::Deactivate { id } => set_active(output, &ws, id, false),
    }
}

fn add_user(output: &Output, ws: &Workspace, name: &str, role: Option<&str>, inactive: bool) -> Result<()> {
    let role = role.or(Some(ws.config().workspace.default_role.as_str()));
    let mut new_user = NewUser::new(name, role).ok_or_else(|| anyhow!("Member name is required"))?;
    new_user.is_active = !inactive;

    let db = ws.database()?;
    let user = db.create_user(&new_user, now_local())?;
    db.close()?;

    if output.is_json() {
        output.data(&user);
    } else {
        output.success(&format!("Added member {}: {} ({})", user.id, user.name, user.role));
    }

    Ok(())
}

fn list_users(output: &Output, ws: &Workspace, include_inactive: bool) -> Result<()> {
    let db = ws.database()?;
    let users = db.list_users(include_inactive)?;
    db.close()?;

    output.verbose_ctx("user", &format!("Found {} members (include_inactive={})", users.len(), include_inactive));

    if output.is_json() {
        output.data(&users);
    } else if users.is_empty() {
        println!("No members");
    } else {
        println!("{:<6} {:<24} {:<12} ACTIVE", "ID", "NAME", "ROLE");
        println!("{}", "-".repeat(52));

        for user in &users {
            println!(
                "{:<6} {:<24} {:<12} {}",
                user.id,
                user.name,
                user.role,
                if user.is_active { "yes" } else { "no" }
            );
        }
    }

    Ok(())
}

fn set_active(output: &Output, ws: &Workspace, id: i64, is_active: bool) -> Result<()> {
    let db = ws.database()?;
    let user: User = db.set_user_active(id, is_active, now_local())?;
    db.close()?;

    if output.is_json() {
        output.data(&user);
    } else if is_active {
        output.success(&format!("Activated member {}: {}", user.id, user.name));
    } else {
        output.success(&format!("Deactivated member {}: {}", user.id, user.name));
    }

    Ok(())
}
