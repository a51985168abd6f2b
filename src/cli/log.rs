//! Work log CLI commands

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;

use super::output::{fmt_day, Output};
use crate::domain::date::{day_range, now_local, parse_calendar_date, parse_instant, start_of_day, today_local};
use crate::domain::{NewWorkLog, TaskStatus};
use crate::storage::Workspace;

#[derive(Subcommand)]
pub enum LogCommands {
    /// Record work on a task
    Add {
        /// Member ID
        #[arg(long)]
        user: i64,

        /// Task ID
        #[arg(long)]
        task: i64,

        /// Day of the work (defaults to today)
        #[arg(long)]
        date: Option<String>,

        #[arg(long, default_value = "")]
        note: String,

        /// Status to record (defaults to the task's current status)
        #[arg(long)]
        status_snapshot: Option<TaskStatus>,
    },

    /// List work logs, newest first
    List {
        /// Only logs for this day
        #[arg(long)]
        date: Option<String>,

        /// Only logs by this member
        #[arg(long)]
        user: Option<i64>,
    },
}

pub fn run(cmd: LogCommands, output: &Output, workspace: Option<&Path>) -> Result<()> {
    let ws = Workspace::open_or_current(workspace)?;

    match cmd {
        LogCommands::Add { user, task, date, note, status_snapshot } => {
            let work_date = match date.as_deref() {
                Some(raw) => parse_instant(raw).context("Invalid --date")?,
                None => start_of_day(today_local()),
            };
            let log = NewWorkLog {
                user_id: user,
                task_id: task,
                work_date,
                note,
                status_snapshot: status_snapshot.map(|s| s.to_string()),
            };
            add_log(output, &ws, &log)
        }
        LogCommands::List { date, user } => list_logs(output, &ws, date.as_deref(), user),
    }
}

fn add_log(output: &Output, ws: &Workspace, log: &NewWorkLog) -> Result<()> {
    let mut db = ws.database()?;
    let created = db.create_work_log(log, now_local())?;
    db.close()?;

    if output.is_json() {
        output.data(&created);
    } else {
        output.success(&format!(
            "Logged work on task {} for {} ({})",
            created.task_id,
            fmt_day(Some(created.work_date)),
            created.status_snapshot
        ));
    }

    Ok(())
}

fn list_logs(output: &Output, ws: &Workspace, date: Option<&str>, user: Option<i64>) -> Result<()> {
    let range = date
        .map(|raw| parse_calendar_date(raw).context("Invalid --date").map(day_range))
        .transpose()?;

    let db = ws.database()?;
    let logs = db.list_work_logs(range.as_ref(), user)?;
    db.close()?;

    output.verbose_ctx("log", &format!("Found {} work logs", logs.len()));

    if output.is_json() {
        output.data(&logs);
    } else if logs.is_empty() {
        println!("No work logs");
    } else {
        println!("{:<6} {:<11} {:<16} {:<24} {:<14} NOTE", "ID", "DATE", "MEMBER", "TASK", "STATUS");
        println!("{}", "-".repeat(90));

        for log in &logs {
            println!(
                "{:<6} {:<11} {:<16} {:<24} {:<14} {}",
                log.id,
                fmt_day(Some(log.work_date)),
                log.user_name.as_deref().unwrap_or("?"),
                log.task_title.as_deref().unwrap_or("?"),
                log.status_snapshot,
                log.note
            );
        }
    }

    Ok(())
}
