//! Work logs
//!
//! A work log records that a member worked on a task on a given day,
//! along with a free-form note and the task status at the time.

use chrono::NaiveDateTime;
use serde::Serialize;

/// A stored work log entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkLog {
    pub id: i64,
    pub work_date: NaiveDateTime,
    pub note: String,
    pub status_snapshot: String,
    pub user_id: i64,
    pub task_id: i64,
    /// Joined in on reads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Joined in on reads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_title: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Input for creating a work log
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkLog {
    pub user_id: i64,
    pub task_id: i64,
    pub work_date: NaiveDateTime,
    pub note: String,
    /// Defaults to the task's current status when omitted
    pub status_snapshot: Option<String>,
}
