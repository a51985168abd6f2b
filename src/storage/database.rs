//! SQLite database for tasks, shifts and work logs
//!
//! The database sits in `.editdesk/editdesk.db` unless the workspace config
//! or `$EDITDESK_DATABASE` points elsewhere. Instants are stored as
//! `YYYY-MM-DDTHH:MM:SS` text so that lexical order matches time order.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, ToSql, TransactionBehavior};
use thiserror::Error;

use crate::domain::{
    DateRange, NewShift, NewTask, NewUser, NewWorkLog, Shift, Task, TaskDetail, TaskFilter,
    TaskSort, TaskStatus, TaskType, User, WorkLog,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Unsupported database schema version {found} (expected {expected})")]
    SchemaVersion { found: i32, expected: i32 },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Malformed stored timestamp: '{0}'")]
    Timestamp(String),
}

fn not_found(entity: &'static str, id: i64) -> anyhow::Error {
    DatabaseError::NotFound { entity, id }.into()
}

/// Handle to the workspace database
///
/// Acquire with [`Database::open`], release with [`Database::close`].
/// Every command opens its own handle.
pub struct Database {
    /// Path to the SQLite file, `None` for in-memory databases
    path: Option<PathBuf>,

    conn: Connection,
}

impl Database {
    /// Schema version - bump when the schema changes
    const SCHEMA_VERSION: i32 = 1;

    /// Opens (and if needed creates) the database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        // WAL lets readers proceed while another command writes
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        tracing::debug!(path = %path.display(), "opened database");
        Self::init(conn, Some(path.to_path_buf()))
    }

    /// Opens a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.busy_timeout(Duration::from_secs(5))?;

        let db = Self { path, conn };
        db.ensure_schema()?;

        Ok(db)
    }

    /// Closes the connection, flushing pending work
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, err)| DatabaseError::Sqlite(err))?;
        Ok(())
    }

    /// Returns the database file path
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Ensures the schema is up to date
    fn ensure_schema(&self) -> Result<()> {
        let current_version = self.schema_version()?;

        match current_version {
            0 => self.create_schema(),
            v if v == Self::SCHEMA_VERSION => Ok(()),
            found => Err(DatabaseError::SchemaVersion {
                found,
                expected: Self::SCHEMA_VERSION,
            }
            .into()),
        }
    }

    fn schema_version(&self) -> Result<i32> {
        let version: Option<i32> = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .optional()?;

        Ok(version.unwrap_or(0))
    }

    fn create_schema(&self) -> Result<()> {
        tracing::debug!(version = Self::SCHEMA_VERSION, "creating database schema");

        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                role TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL,
                task_type TEXT NOT NULL,
                start_date TEXT,
                due_date TEXT NOT NULL,
                feedback_date1 TEXT,
                feedback_date2 TEXT,
                is_published INTEGER NOT NULL DEFAULT 0,
                published_at TEXT,
                article_url TEXT,
                article_slug TEXT,
                assignee_id INTEGER NOT NULL REFERENCES users(id),
                author_id INTEGER NOT NULL REFERENCES users(id),
                checker_id INTEGER NOT NULL REFERENCES users(id),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                CHECK (is_published = (published_at IS NOT NULL))
            );

            CREATE TABLE IF NOT EXISTS shifts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                memo TEXT,
                is_working INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS work_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                work_date TEXT NOT NULL,
                note TEXT NOT NULL DEFAULT '',
                status_snapshot TEXT NOT NULL,
                user_id INTEGER NOT NULL REFERENCES users(id),
                task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_assignee ON tasks(assignee_id);
            CREATE INDEX IF NOT EXISTS idx_tasks_due ON tasks(due_date);
            CREATE INDEX IF NOT EXISTS idx_tasks_published ON tasks(published_at);
            CREATE INDEX IF NOT EXISTS idx_shifts_date ON shifts(date);
            CREATE INDEX IF NOT EXISTS idx_work_logs_date ON work_logs(work_date);
            CREATE INDEX IF NOT EXISTS idx_work_logs_task ON work_logs(task_id);
            ",
        )?;

        self.conn
            .pragma_update(None, "user_version", Self::SCHEMA_VERSION)?;

        Ok(())
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub fn create_user(&self, user: &NewUser, now: NaiveDateTime) -> Result<User> {
        let now = encode_timestamp(now);
        self.conn.execute(
            "INSERT INTO users (name, role, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![user.name, user.role, user.is_active, now],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, name = %user.name, "created user");
        self.get_user(id)
    }

    pub fn get_user(&self, id: i64) -> Result<User> {
        fetch_user(&self.conn, id)?.ok_or_else(|| not_found("User", id))
    }

    /// Lists members by name; inactive ones only when asked for
    pub fn list_users(&self, include_inactive: bool) -> Result<Vec<User>> {
        let sql = if include_inactive {
            format!("SELECT {USER_COLUMNS} FROM users ORDER BY name, id")
        } else {
            format!("SELECT {USER_COLUMNS} FROM users WHERE is_active = 1 ORDER BY name, id")
        };

        let mut stmt = self.conn.prepare(&sql)?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(users)
    }

    pub fn set_user_active(&self, id: i64, is_active: bool, now: NaiveDateTime) -> Result<User> {
        let changed = self.conn.execute(
            "UPDATE users SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
            params![is_active, encode_timestamp(now), id],
        )?;
        if changed == 0 {
            return Err(not_found("User", id));
        }

        tracing::debug!(id, is_active, "updated user");
        self.get_user(id)
    }

    // ========================================================================
    // Tasks
    // ========================================================================

    pub fn create_task(&mut self, task: &NewTask, now: NaiveDateTime) -> Result<Task> {
        let tx = self.conn.transaction()?;

        for id in [task.assignee_id, task.author_id, task.checker_id] {
            require_user(&tx, id)?;
        }

        let now = encode_timestamp(now);
        tx.execute(
            "INSERT INTO tasks (
                title, description, status, task_type, start_date, due_date,
                feedback_date1, feedback_date2, is_published, published_at,
                article_url, article_slug, assignee_id, author_id, checker_id,
                created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16)",
            params![
                task.title,
                task.description,
                task.status,
                task.task_type,
                task.start_date.map(encode_timestamp),
                encode_timestamp(task.due_date),
                task.feedback_date1.map(encode_timestamp),
                task.feedback_date2.map(encode_timestamp),
                task.publish.is_published,
                task.publish.published_at.map(encode_timestamp),
                task.article_url,
                task.article_slug,
                task.assignee_id,
                task.author_id,
                task.checker_id,
                now,
            ],
        )?;

        let id = tx.last_insert_rowid();
        let created = fetch_task(&tx, id)?.ok_or_else(|| not_found("Task", id))?;
        tx.commit()?;

        tracing::debug!(id, status = %created.status, published = created.is_published, "created task");
        Ok(created)
    }

    pub fn get_task(&self, id: i64) -> Result<Task> {
        fetch_task(&self.conn, id)?.ok_or_else(|| not_found("Task", id))
    }

    /// Loads a task with its work logs, newest first
    pub fn get_task_detail(&self, id: i64) -> Result<TaskDetail> {
        let task = self.get_task(id)?;

        let sql = format!(
            "SELECT {WORK_LOG_COLUMNS} {WORK_LOG_FROM}
             WHERE w.task_id = ?1
             ORDER BY w.work_date DESC, w.id DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let work_logs = stmt
            .query_map(params![id], work_log_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(TaskDetail { task, work_logs })
    }

    pub fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let (sql, values) = task_query(filter);
        tracing::debug!(%sql, params = values.len(), "listing tasks");

        let mut stmt = self.conn.prepare(&sql)?;
        let tasks = stmt
            .query_map(params_from_iter(values), task_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(tasks)
    }

    /// Applies an update to a task inside a single write transaction
    ///
    /// `apply` sees the stored task and returns its replacement. The read,
    /// the derivation and the write happen under one lock, so concurrent
    /// updates can't interleave between them.
    pub fn update_task<F>(&mut self, id: i64, apply: F) -> Result<Task>
    where
        F: FnOnce(&Task) -> Result<Task>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = fetch_task(&tx, id)?.ok_or_else(|| not_found("Task", id))?;
        let next = apply(&current)?;

        for user_id in [next.assignee_id, next.author_id, next.checker_id] {
            require_user(&tx, user_id)?;
        }

        tx.execute(
            "UPDATE tasks SET
                title = ?1, description = ?2, status = ?3, task_type = ?4,
                start_date = ?5, due_date = ?6, feedback_date1 = ?7, feedback_date2 = ?8,
                is_published = ?9, published_at = ?10, article_url = ?11, article_slug = ?12,
                assignee_id = ?13, author_id = ?14, checker_id = ?15, updated_at = ?16
             WHERE id = ?17",
            params![
                next.title,
                next.description,
                next.status,
                next.task_type,
                next.start_date.map(encode_timestamp),
                encode_timestamp(next.due_date),
                next.feedback_date1.map(encode_timestamp),
                next.feedback_date2.map(encode_timestamp),
                next.is_published,
                next.published_at.map(encode_timestamp),
                next.article_url,
                next.article_slug,
                next.assignee_id,
                next.author_id,
                next.checker_id,
                encode_timestamp(next.updated_at),
                id,
            ],
        )?;

        let updated = fetch_task(&tx, id)?.ok_or_else(|| not_found("Task", id))?;
        tx.commit()?;

        tracing::debug!(id, status = %updated.status, published = updated.is_published, "updated task");
        Ok(updated)
    }

    /// Deletes a task and its work logs
    pub fn delete_task(&self, id: i64) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(not_found("Task", id));
        }

        tracing::debug!(id, "deleted task");
        Ok(())
    }

    // ========================================================================
    // Shifts
    // ========================================================================

    pub fn create_shift(&mut self, shift: &NewShift, now: NaiveDateTime) -> Result<Shift> {
        let tx = self.conn.transaction()?;
        require_user(&tx, shift.user_id)?;

        let now = encode_timestamp(now);
        tx.execute(
            "INSERT INTO shifts (user_id, date, start_time, end_time, memo, is_working, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                shift.user_id,
                encode_date(shift.window.date),
                encode_timestamp(shift.window.start),
                encode_timestamp(shift.window.end),
                shift.memo,
                shift.is_working,
                now,
            ],
        )?;

        let id = tx.last_insert_rowid();
        let created = fetch_shift(&tx, id)?.ok_or_else(|| not_found("Shift", id))?;
        tx.commit()?;

        tracing::debug!(id, user_id = shift.user_id, date = %shift.window.date, "created shift");
        Ok(created)
    }

    pub fn get_shift(&self, id: i64) -> Result<Shift> {
        fetch_shift(&self.conn, id)?.ok_or_else(|| not_found("Shift", id))
    }

    /// Lists shifts whose date falls inside `range`, grouped by member name then date
    pub fn list_shifts(&self, range: &DateRange) -> Result<Vec<Shift>> {
        let sql = format!(
            "SELECT {SHIFT_COLUMNS} {SHIFT_FROM}
             WHERE s.date >= ?1 AND s.date < ?2
             ORDER BY u.name, s.date, s.start_time, s.id"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let shifts = stmt
            .query_map(
                params![encode_date(range.start.date()), encode_date(range.end.date())],
                shift_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(shifts)
    }

    /// Applies an update to a shift inside a single write transaction
    pub fn update_shift<F>(&mut self, id: i64, apply: F) -> Result<Shift>
    where
        F: FnOnce(&Shift) -> Result<Shift>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = fetch_shift(&tx, id)?.ok_or_else(|| not_found("Shift", id))?;
        let next = apply(&current)?;
        if next.user_id != current.user_id {
            require_user(&tx, next.user_id)?;
        }

        tx.execute(
            "UPDATE shifts SET
                user_id = ?1, date = ?2, start_time = ?3, end_time = ?4,
                memo = ?5, is_working = ?6, updated_at = ?7
             WHERE id = ?8",
            params![
                next.user_id,
                encode_date(next.date),
                encode_timestamp(next.start_time),
                encode_timestamp(next.end_time),
                next.memo,
                next.is_working,
                encode_timestamp(next.updated_at),
                id,
            ],
        )?;

        let updated = fetch_shift(&tx, id)?.ok_or_else(|| not_found("Shift", id))?;
        tx.commit()?;

        tracing::debug!(id, date = %updated.date, "updated shift");
        Ok(updated)
    }

    pub fn delete_shift(&self, id: i64) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM shifts WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(not_found("Shift", id));
        }

        tracing::debug!(id, "deleted shift");
        Ok(())
    }

    // ========================================================================
    // Work logs
    // ========================================================================

    /// Records a work log; a missing status snapshot takes the task's current status
    pub fn create_work_log(&mut self, log: &NewWorkLog, now: NaiveDateTime) -> Result<WorkLog> {
        let tx = self.conn.transaction()?;
        require_user(&tx, log.user_id)?;
        let task = fetch_task(&tx, log.task_id)?.ok_or_else(|| not_found("Task", log.task_id))?;

        let snapshot = log
            .status_snapshot
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(task.status.as_str());

        tx.execute(
            "INSERT INTO work_logs (work_date, note, status_snapshot, user_id, task_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                encode_timestamp(log.work_date),
                log.note,
                snapshot,
                log.user_id,
                log.task_id,
                encode_timestamp(now),
            ],
        )?;

        let id = tx.last_insert_rowid();
        let created = fetch_work_log(&tx, id)?.ok_or_else(|| not_found("Work log", id))?;
        tx.commit()?;

        tracing::debug!(id, task_id = log.task_id, user_id = log.user_id, "created work log");
        Ok(created)
    }

    /// Lists work logs newest first, optionally restricted to a range and a member
    pub fn list_work_logs(&self, range: Option<&DateRange>, user_id: Option<i64>) -> Result<Vec<WorkLog>> {
        let mut conditions = Vec::new();
        let mut values = Vec::new();

        if let Some(range) = range {
            conditions.push("w.work_date >= ? AND w.work_date < ?");
            values.push(Value::Text(encode_timestamp(range.start)));
            values.push(Value::Text(encode_timestamp(range.end)));
        }
        if let Some(user_id) = user_id {
            conditions.push("w.user_id = ?");
            values.push(Value::Integer(user_id));
        }

        let sql = format!(
            "SELECT {WORK_LOG_COLUMNS} {WORK_LOG_FROM}{} ORDER BY w.work_date DESC, w.id DESC",
            where_clause(&conditions)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let logs = stmt
            .query_map(params_from_iter(values), work_log_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(logs)
    }
}

// ============================================================================
// Queries
// ============================================================================

const USER_COLUMNS: &str = "id, name, role, is_active, created_at, updated_at";

const TASK_COLUMNS: &str = "id, title, description, status, task_type, start_date, due_date, \
     feedback_date1, feedback_date2, is_published, published_at, article_url, article_slug, \
     assignee_id, author_id, checker_id, created_at, updated_at";

const SHIFT_COLUMNS: &str = "s.id, s.user_id, u.name, s.date, s.start_time, s.end_time, \
     s.memo, s.is_working, s.created_at, s.updated_at";
const SHIFT_FROM: &str = "FROM shifts s JOIN users u ON u.id = s.user_id";

const WORK_LOG_COLUMNS: &str = "w.id, w.work_date, w.note, w.status_snapshot, w.user_id, \
     w.task_id, u.name, t.title, w.created_at";
const WORK_LOG_FROM: &str =
    "FROM work_logs w JOIN users u ON u.id = w.user_id JOIN tasks t ON t.id = w.task_id";

fn where_clause(conditions: &[&str]) -> String {
    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

/// Builds the task listing query for a filter
fn task_query(filter: &TaskFilter) -> (String, Vec<Value>) {
    let mut conditions: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(id) = filter.assignee_id {
        conditions.push("assignee_id = ?");
        values.push(Value::Integer(id));
    }
    if let Some(id) = filter.checker_id {
        conditions.push("checker_id = ?");
        values.push(Value::Integer(id));
    }

    if filter.exclude_done {
        conditions.push("status != 'done'");
    } else if let Some(status) = filter.status {
        conditions.push("status = ?");
        values.push(Value::Text(status.as_str().to_string()));
    }

    if let Some(task_type) = filter.task_type {
        conditions.push("task_type = ?");
        values.push(Value::Text(task_type.as_str().to_string()));
    }
    if let Some(published) = filter.is_published {
        conditions.push("is_published = ?");
        values.push(Value::Integer(i64::from(published)));
    }
    if let Some(range) = &filter.published_in {
        conditions.push("published_at >= ? AND published_at < ?");
        values.push(Value::Text(encode_timestamp(range.start)));
        values.push(Value::Text(encode_timestamp(range.end)));
    }
    if let Some(from) = filter.start_from {
        conditions.push("start_date >= ?");
        values.push(Value::Text(encode_timestamp(from)));
    }
    if let Some(before) = filter.start_before {
        conditions.push("start_date <= ?");
        values.push(Value::Text(encode_timestamp(before)));
    }
    if let Some(due) = filter.due_by {
        conditions.push("due_date <= ?");
        values.push(Value::Text(encode_timestamp(due)));
    }
    if let Some(day) = filter.active_on {
        conditions.push("(start_date IS NULL OR start_date < ?) AND status != 'done'");
        values.push(Value::Text(encode_timestamp(crate::domain::date::day_range(day).end)));
    }

    let order = match filter.sort {
        TaskSort::DueDateAsc => "due_date ASC, id ASC",
        // Tasks without a start date go last
        TaskSort::StartDateAsc => "start_date IS NULL, start_date ASC, id ASC",
        TaskSort::CreatedAtDesc => "created_at DESC, id DESC",
    };

    let sql = format!(
        "SELECT {TASK_COLUMNS} FROM tasks{} ORDER BY {order}",
        where_clause(&conditions)
    );

    (sql, values)
}

fn require_user(conn: &Connection, id: i64) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )?;

    if exists {
        Ok(())
    } else {
        Err(not_found("User", id))
    }
}

fn fetch_user(conn: &Connection, id: i64) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id], user_from_row).optional()?)
}

fn fetch_task(conn: &Connection, id: i64) -> Result<Option<Task>> {
    let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id], task_from_row).optional()?)
}

fn fetch_shift(conn: &Connection, id: i64) -> Result<Option<Shift>> {
    let sql = format!("SELECT {SHIFT_COLUMNS} {SHIFT_FROM} WHERE s.id = ?1");
    Ok(conn.query_row(&sql, params![id], shift_from_row).optional()?)
}

fn fetch_work_log(conn: &Connection, id: i64) -> Result<Option<WorkLog>> {
    let sql = format!("SELECT {WORK_LOG_COLUMNS} {WORK_LOG_FROM} WHERE w.id = ?1");
    Ok(conn.query_row(&sql, params![id], work_log_from_row).optional()?)
}

// ============================================================================
// Row mapping
// ============================================================================

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        role: row.get(2)?,
        is_active: row.get(3)?,
        created_at: timestamp_column(row, 4)?,
        updated_at: timestamp_column(row, 5)?,
    })
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        task_type: row.get(4)?,
        start_date: optional_timestamp_column(row, 5)?,
        due_date: timestamp_column(row, 6)?,
        feedback_date1: optional_timestamp_column(row, 7)?,
        feedback_date2: optional_timestamp_column(row, 8)?,
        is_published: row.get(9)?,
        published_at: optional_timestamp_column(row, 10)?,
        article_url: row.get(11)?,
        article_slug: row.get(12)?,
        assignee_id: row.get(13)?,
        author_id: row.get(14)?,
        checker_id: row.get(15)?,
        created_at: timestamp_column(row, 16)?,
        updated_at: timestamp_column(row, 17)?,
    })
}

fn shift_from_row(row: &Row<'_>) -> rusqlite::Result<Shift> {
    Ok(Shift {
        id: row.get(0)?,
        user_id: row.get(1)?,
        user_name: row.get(2)?,
        date: date_column(row, 3)?,
        start_time: timestamp_column(row, 4)?,
        end_time: timestamp_column(row, 5)?,
        memo: row.get(6)?,
        is_working: row.get(7)?,
        created_at: timestamp_column(row, 8)?,
        updated_at: timestamp_column(row, 9)?,
    })
}

fn work_log_from_row(row: &Row<'_>) -> rusqlite::Result<WorkLog> {
    Ok(WorkLog {
        id: row.get(0)?,
        work_date: timestamp_column(row, 1)?,
        note: row.get(2)?,
        status_snapshot: row.get(3)?,
        user_id: row.get(4)?,
        task_id: row.get(5)?,
        user_name: row.get(6)?,
        task_title: row.get(7)?,
        created_at: timestamp_column(row, 8)?,
    })
}

// ============================================================================
// Column encoding
// ============================================================================

fn encode_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

fn encode_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn decode_timestamp(raw: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|_| DatabaseError::Timestamp(raw.to_string()))
}

fn decode_date(raw: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| DatabaseError::Timestamp(raw.to_string()))
}

fn conversion_error(idx: usize, err: DatabaseError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    decode_timestamp(&raw).map_err(|err| conversion_error(idx, err))
}

fn optional_timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDateTime>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| decode_timestamp(&raw).map_err(|err| conversion_error(idx, err)))
        .transpose()
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    decode_date(&raw).map_err(|err| conversion_error(idx, err))
}

impl ToSql for TaskStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TaskStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}

impl ToSql for TaskType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TaskType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}
