//! Task CLI commands

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::{Args, Subcommand};

use super::output::{fmt_day, fmt_instant, Output};
use crate::domain::date::{month_range, now_local, parse_instant, today_local};
use crate::domain::{Patch, Task, TaskDraft, TaskFilter, TaskPatch, TaskSort, TaskStatus, TaskType};
use crate::storage::Workspace;

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task
    ///
    /// Examples:
    ///   editdesk task add "Spring guide" --assignee 1 --author 2 --checker 3 --due 2024-04-01
    ///   editdesk task add "Rewrite FAQ" --type rewrite --status done --published-at 2024-03-20 ...
    Add {
        /// Task title
        title: String,

        /// Member doing the work
        #[arg(long)]
        assignee: Option<i64>,

        /// Member who requested the work
        #[arg(long)]
        author: Option<i64>,

        /// Member reviewing the work
        #[arg(long)]
        checker: Option<i64>,

        /// Due date (YYYY-MM-DD or YYYY-MM-DDTHH:MM)
        #[arg(long)]
        due: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// new_article, rewrite or other (defaults to the workspace's default_task_type)
        #[arg(long = "type")]
        task_type: Option<TaskType>,

        /// Initial status (defaults to the workspace's default_task_status)
        #[arg(long)]
        status: Option<TaskStatus>,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        feedback1: Option<String>,

        #[arg(long)]
        feedback2: Option<String>,

        /// Publish date, only used when the task is created as done
        #[arg(long)]
        published_at: Option<String>,

        /// Article URL
        #[arg(long)]
        url: Option<String>,

        /// Article slug
        #[arg(long)]
        slug: Option<String>,
    },

    /// List tasks
    List(ListArgs),

    /// Show task details, including work logs
    Show {
        /// Task ID
        id: i64,
    },

    /// Update a task
    ///
    /// Field flags set values, --clear-* flags remove them. --json takes a
    /// partial update body; flags given alongside it win.
    Update {
        /// Task ID
        id: i64,

        #[command(flatten)]
        fields: UpdateArgs,

        /// Partial update as JSON, e.g. '{"status": "done", "publishedAt": "2024-03-20"}'
        #[arg(long)]
        json: Option<String>,
    },

    /// Delete a task and its work logs
    Delete {
        /// Task ID
        id: i64,
    },
}

#[derive(Args, Default)]
pub struct ListArgs {
    /// Filter by assignee
    #[arg(long)]
    assignee: Option<i64>,

    /// Filter by checker
    #[arg(long)]
    checker: Option<i64>,

    /// Filter by status
    #[arg(long)]
    status: Option<TaskStatus>,

    /// Filter by type
    #[arg(long = "type")]
    task_type: Option<TaskType>,

    /// Filter by publish state (true or false)
    #[arg(long)]
    published: Option<bool>,

    /// Only tasks published in this month (YYYY-MM)
    #[arg(long)]
    published_month: Option<String>,

    /// Start date on or after
    #[arg(long)]
    start_from: Option<String>,

    /// Start date on or before
    #[arg(long)]
    start_before: Option<String>,

    /// Due on or before
    #[arg(long)]
    due_by: Option<String>,

    /// Hide finished tasks (overrides --status)
    #[arg(long)]
    exclude_done: bool,

    /// Only unfinished tasks that have started by today
    #[arg(long)]
    today: bool,

    /// Sort order: due, start or created
    #[arg(long, default_value = "due")]
    sort: TaskSort,
}

#[derive(Args, Default)]
pub struct UpdateArgs {
    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    clear_description: bool,

    #[arg(long)]
    status: Option<TaskStatus>,

    #[arg(long = "type")]
    task_type: Option<TaskType>,

    #[arg(long)]
    start: Option<String>,

    #[arg(long)]
    clear_start: bool,

    #[arg(long)]
    due: Option<String>,

    #[arg(long)]
    feedback1: Option<String>,

    #[arg(long)]
    clear_feedback1: bool,

    #[arg(long)]
    feedback2: Option<String>,

    #[arg(long)]
    clear_feedback2: bool,

    /// Publish date; only kept while the task stays published
    #[arg(long)]
    published_at: Option<String>,

    #[arg(long)]
    url: Option<String>,

    #[arg(long)]
    clear_url: bool,

    #[arg(long)]
    slug: Option<String>,

    #[arg(long)]
    clear_slug: bool,

    #[arg(long)]
    assignee: Option<i64>,

    #[arg(long)]
    author: Option<i64>,

    #[arg(long)]
    checker: Option<i64>,
}

impl UpdateArgs {
    /// Layers the flags over a base patch
    fn apply_to(self, patch: &mut TaskPatch) {
        overlay(&mut patch.title, Patch::from_cli(self.title, false));
        overlay(&mut patch.description, Patch::from_cli(self.description, self.clear_description));
        overlay(&mut patch.status, Patch::from_cli(self.status, false));
        overlay(&mut patch.task_type, Patch::from_cli(self.task_type, false));
        overlay(&mut patch.start_date, Patch::from_cli(self.start, self.clear_start));
        overlay(&mut patch.due_date, Patch::from_cli(self.due, false));
        overlay(&mut patch.feedback_date1, Patch::from_cli(self.feedback1, self.clear_feedback1));
        overlay(&mut patch.feedback_date2, Patch::from_cli(self.feedback2, self.clear_feedback2));
        overlay(&mut patch.published_at, Patch::from_cli(self.published_at, false));
        overlay(&mut patch.article_url, Patch::from_cli(self.url, self.clear_url));
        overlay(&mut patch.article_slug, Patch::from_cli(self.slug, self.clear_slug));
        overlay(&mut patch.assignee_id, Patch::from_cli(self.assignee, false));
        overlay(&mut patch.author_id, Patch::from_cli(self.author, false));
        overlay(&mut patch.checker_id, Patch::from_cli(self.checker, false));
    }
}

fn overlay<T>(target: &mut Patch<T>, flag: Patch<T>) {
    if !flag.is_unset() {
        *target = flag;
    }
}

pub fn run(cmd: TaskCommands, output: &Output, workspace: Option<&Path>) -> Result<()> {
    let ws = Workspace::open_or_current(workspace)?;

    match cmd {
        TaskCommands::Add {
            title,
            assignee,
            author,
            checker,
            due,
            description,
            task_type,
            status,
            start,
            feedback1,
            feedback2,
            published_at,
            url,
            slug,
        } => {
            let draft = TaskDraft {
                title,
                description,
                status,
                task_type,
                start_date: start,
                due_date: due,
                feedback_date1: feedback1,
                feedback_date2: feedback2,
                published_at,
                article_url: url,
                article_slug: slug,
                assignee_id: assignee,
                author_id: author,
                checker_id: checker,
            };
            add_task(output, &ws, draft)
        }
        TaskCommands::List(args) => list_tasks(output, &ws, args),
        TaskCommands::Show { id } => show_task(output, &ws, id),
        TaskCommands::Update { id, fields, json } => {
            let mut patch = match json {
                Some(payload) => TaskPatch::from_json(&payload)?,
                None => TaskPatch::default(),
            };
            fields.apply_to(&mut patch);
            update_task(output, &ws, id, &patch)
        }
        TaskCommands::Delete { id } => delete_task(output, &ws, id),
    }
}

fn add_task(output: &Output, ws: &Workspace, draft: TaskDraft) -> Result<()> {
    let defaults = &ws.config().workspace;
    let now = now_local();
    let new_task = draft.validate(defaults.default_task_type, defaults.default_task_status, now)?;

    output.verbose_ctx(
        "task",
        &format!(
            "Creating {} task, status={}, published={}",
            new_task.task_type, new_task.status, new_task.publish.is_published
        ),
    );

    let mut db = ws.database()?;
    let task = db.create_task(&new_task, now)?;
    db.close()?;

    if output.is_json() {
        output.data(&task);
    } else {
        output.success(&format!("Created task {}: {}", task.id, task.title));
    }

    Ok(())
}

fn parse_date_flag(raw: Option<&str>, flag: &str) -> Result<Option<NaiveDateTime>> {
    raw.map(|raw| parse_instant(raw).with_context(|| format!("Invalid --{}", flag)))
        .transpose()
}

fn build_filter(args: ListArgs) -> Result<TaskFilter> {
    let published_in = args
        .published_month
        .as_deref()
        .map(|month| month_range(month).context("Invalid --published-month"))
        .transpose()?;

    Ok(TaskFilter {
        assignee_id: args.assignee,
        checker_id: args.checker,
        status: args.status,
        task_type: args.task_type,
        is_published: args.published,
        published_in,
        start_from: parse_date_flag(args.start_from.as_deref(), "start-from")?,
        start_before: parse_date_flag(args.start_before.as_deref(), "start-before")?,
        due_by: parse_date_flag(args.due_by.as_deref(), "due-by")?,
        exclude_done: args.exclude_done,
        active_on: args.today.then(today_local),
        sort: args.sort,
    })
}

fn list_tasks(output: &Output, ws: &Workspace, args: ListArgs) -> Result<()> {
    let filter = build_filter(args)?;
    output.verbose_ctx("task", &format!("Listing tasks with {:?}", filter));

    let db = ws.database()?;
    let tasks = db.list_tasks(&filter)?;
    db.close()?;

    if output.is_json() {
        output.data(&tasks);
    } else if tasks.is_empty() {
        println!("No tasks");
    } else {
        println!(
            "{:<6} {:<14} {:<12} {:<11} {:<11} TITLE",
            "ID", "STATUS", "TYPE", "DUE", "PUBLISHED"
        );
        println!("{}", "-".repeat(80));

        for task in &tasks {
            println!(
                "{:<6} {:<14} {:<12} {:<11} {:<11} {}",
                task.id,
                task.status,
                task.task_type,
                fmt_day(Some(task.due_date)),
                fmt_day(task.published_at),
                task.title
            );
        }
    }

    Ok(())
}

fn show_task(output: &Output, ws: &Workspace, id: i64) -> Result<()> {
    let db = ws.database()?;
    let detail = db.get_task_detail(id)?;
    db.close()?;

    if output.is_json() {
        output.data(&detail);
        return Ok(());
    }

    let task = &detail.task;
    print_task(task);

    if !detail.work_logs.is_empty() {
        println!("\nWork logs:");
        for log in &detail.work_logs {
            println!(
                "  {}  {:<16} {:<14} {}",
                fmt_day(Some(log.work_date)),
                log.user_name.as_deref().unwrap_or("?"),
                log.status_snapshot,
                log.note
            );
        }
    }

    Ok(())
}

fn print_task(task: &Task) {
    println!("Task: {}", task.id);
    println!("Title: {}", task.title);
    println!("Status: {}", task.status);
    println!("Type: {}", task.task_type);
    println!("Assignee: {}", task.assignee_id);
    println!("Author: {}", task.author_id);
    println!("Checker: {}", task.checker_id);
    if let Some(start) = task.start_date {
        println!("Start: {}", fmt_instant(start));
    }
    println!("Due: {}", fmt_instant(task.due_date));
    if let Some(feedback) = task.feedback_date1 {
        println!("Feedback 1: {}", fmt_instant(feedback));
    }
    if let Some(feedback) = task.feedback_date2 {
        println!("Feedback 2: {}", fmt_instant(feedback));
    }
    match task.published_at {
        Some(at) if task.is_published => println!("Published: {}", fmt_instant(at)),
        _ => println!("Published: no"),
    }
    if let Some(url) = &task.article_url {
        println!("URL: {}", url);
    }
    if let Some(slug) = &task.article_slug {
        println!("Slug: {}", slug);
    }
    println!("Created: {}", fmt_instant(task.created_at));
    println!("Updated: {}", fmt_instant(task.updated_at));

    if !task.description.is_empty() {
        println!("\nDescription:");
        println!("{}", task.description);
    }
}

fn update_task(output: &Output, ws: &Workspace, id: i64, patch: &TaskPatch) -> Result<()> {
    if patch.is_empty() {
        bail!("Nothing to update; pass a field flag or --json");
    }

    let now = now_local();
    let mut db = ws.database()?;
    let task = db.update_task(id, |current| {
        let next = current.patched(patch, now)?;
        if next.is_published != current.is_published {
            tracing::debug!(id, published = next.is_published, "publish state changed");
        }
        Ok(next)
    })?;
    db.close()?;

    if output.is_json() {
        output.data(&task);
    } else {
        output.success(&format!("Updated task {}: {} [{}]", task.id, task.title, task.status));
    }

    Ok(())
}

fn delete_task(output: &Output, ws: &Workspace, id: i64) -> Result<()> {
    let db = ws.database()?;
    db.delete_task(id)?;
    db.close()?;

    if output.is_json() {
        output.data(&serde_json::json!({ "id": id, "deleted": true }));
    } else {
        output.success(&format!("Deleted task {}", id));
    }

    Ok(())
}
