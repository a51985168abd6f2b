//! Task domain model
//!
//! A task is one piece of editorial work (an article, a rewrite, or
//! anything else) moving through a small status workflow. Each task has an
//! assignee who does the work, an author who requested it, and a checker
//! who reviews it.
//!
//! Publish fields are derived, see [`super::publish`].

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::date::{parse_instant, DateRange};
use super::patch::{self, Patch, PatchError};
use super::publish::{self, PublishState, PublishedAtInput};
use super::work_log::WorkLog;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("Task {0} is required")]
    MissingField(&'static str),

    #[error("Invalid {field}: '{value}'")]
    InvalidDate { field: &'static str, value: String },

    #[error("Unknown task status: '{0}' (expected one of: not_started, in_progress, check_request, done, on_hold)")]
    UnknownStatus(String),

    #[error("Unknown task type: '{0}' (expected one of: new_article, rewrite, other)")]
    UnknownType(String),
}

/// Workflow status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    CheckRequest,
    Done,
    OnHold,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::NotStarted,
        TaskStatus::InProgress,
        TaskStatus::CheckRequest,
        TaskStatus::Done,
        TaskStatus::OnHold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not_started",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::CheckRequest => "check_request",
            TaskStatus::Done => "done",
            TaskStatus::OnHold => "on_hold",
        }
    }

    /// Returns true if this status represents completion
    pub fn is_complete(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| TaskError::UnknownStatus(s.to_string()))
    }
}

/// Kind of editorial work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    #[default]
    NewArticle,
    Rewrite,
    Other,
}

impl TaskType {
    pub const ALL: [TaskType; 3] = [TaskType::NewArticle, TaskType::Rewrite, TaskType::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::NewArticle => "new_article",
            TaskType::Rewrite => "rewrite",
            TaskType::Other => "other",
        }
    }

    /// Returns true if tasks of this type carry a publish date once done
    pub fn is_publishable(&self) -> bool {
        matches!(self, TaskType::NewArticle | TaskType::Rewrite)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|task_type| task_type.as_str() == s)
            .ok_or_else(|| TaskError::UnknownType(s.to_string()))
    }
}

/// A stored task
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub start_date: Option<NaiveDateTime>,
    pub due_date: NaiveDateTime,
    pub feedback_date1: Option<NaiveDateTime>,
    pub feedback_date2: Option<NaiveDateTime>,
    pub is_published: bool,
    pub published_at: Option<NaiveDateTime>,
    pub article_url: Option<String>,
    pub article_slug: Option<String>,
    pub assignee_id: i64,
    pub author_id: i64,
    pub checker_id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Task {
    pub fn publish_state(&self) -> PublishState {
        PublishState {
            is_published: self.is_published,
            published_at: self.published_at,
        }
    }

    /// Returns the task as it looks after applying `patch`
    ///
    /// Publish state is re-derived when the patch touches type, status or
    /// the publish date, with the stored publish instant as the fallback.
    pub fn patched(&self, patch: &TaskPatch, now: NaiveDateTime) -> Result<Task, TaskError> {
        let mut next = self.clone();

        next.title = patch.title.clone().apply_required(next.title);
        next.description = match &patch.description {
            Patch::Set(v) => v.clone(),
            Patch::SetNull => String::new(),
            Patch::Unset => next.description,
        };
        next.status = patch.status.clone().apply_required(next.status);
        next.task_type = patch.task_type.clone().apply_required(next.task_type);

        next.start_date = optional_date(&patch.start_date, "start date")?.apply(next.start_date);
        next.due_date = optional_date(&patch.due_date, "due date")?.apply_required(next.due_date);
        next.feedback_date1 =
            optional_date(&patch.feedback_date1, "feedback date 1")?.apply(next.feedback_date1);
        next.feedback_date2 =
            optional_date(&patch.feedback_date2, "feedback date 2")?.apply(next.feedback_date2);

        next.article_url = patch.article_url.clone().blank_as_null().apply(next.article_url);
        next.article_slug = patch.article_slug.clone().blank_as_null().apply(next.article_slug);

        next.assignee_id = patch.assignee_id.clone().apply_required(next.assignee_id);
        next.author_id = patch.author_id.clone().apply_required(next.author_id);
        next.checker_id = patch.checker_id.clone().apply_required(next.checker_id);

        if patch.touches_publish_state() {
            let explicit = patch.published_at.as_set().cloned().map(PublishedAtInput::Raw);
            let state = publish::resolve(
                next.task_type,
                next.status,
                explicit.as_ref(),
                self.published_at,
                now,
            );
            next.is_published = state.is_published;
            next.published_at = state.published_at;
        }

        next.updated_at = now;
        Ok(next)
    }
}

/// Parses a patched date field; a blank string clears it
fn optional_date(
    patch: &Patch<String>,
    field: &'static str,
) -> Result<Patch<NaiveDateTime>, TaskError> {
    patch.clone().blank_as_null().try_map(|raw| {
        parse_instant(&raw).map_err(|_| TaskError::InvalidDate { field, value: raw })
    })
}

fn required_date(raw: Option<&str>, field: &'static str) -> Result<NaiveDateTime, TaskError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_instant(raw).map_err(|_| TaskError::InvalidDate {
            field,
            value: raw.to_string(),
        }),
        None => Err(TaskError::MissingField(field)),
    }
}

fn nullable_date(raw: Option<&str>, field: &'static str) -> Result<Option<NaiveDateTime>, TaskError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_instant(raw)
            .map(Some)
            .map_err(|_| TaskError::InvalidDate {
                field,
                value: raw.to_string(),
            }),
        None => Ok(None),
    }
}

/// A task together with its work logs, newest first
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub work_logs: Vec<WorkLog>,
}

/// Raw input for creating a task
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub task_type: Option<TaskType>,
    pub start_date: Option<String>,
    pub due_date: Option<String>,
    pub feedback_date1: Option<String>,
    pub feedback_date2: Option<String>,
    pub published_at: Option<String>,
    pub article_url: Option<String>,
    pub article_slug: Option<String>,
    pub assignee_id: Option<i64>,
    pub author_id: Option<i64>,
    pub checker_id: Option<i64>,
}

/// Validated task ready to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub task_type: TaskType,
    pub start_date: Option<NaiveDateTime>,
    pub due_date: NaiveDateTime,
    pub feedback_date1: Option<NaiveDateTime>,
    pub feedback_date2: Option<NaiveDateTime>,
    pub publish: PublishState,
    pub article_url: Option<String>,
    pub article_slug: Option<String>,
    pub assignee_id: i64,
    pub author_id: i64,
    pub checker_id: i64,
}

impl TaskDraft {
    /// Validates the draft and derives its publish state
    ///
    /// `default_type` and `default_status` fill in omitted fields.
    pub fn validate(
        self,
        default_type: TaskType,
        default_status: TaskStatus,
        now: NaiveDateTime,
    ) -> Result<NewTask, TaskError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(TaskError::MissingField("title"));
        }

        let assignee_id = self.assignee_id.ok_or(TaskError::MissingField("assignee"))?;
        let author_id = self.author_id.ok_or(TaskError::MissingField("author"))?;
        let checker_id = self.checker_id.ok_or(TaskError::MissingField("checker"))?;

        let status = self.status.unwrap_or(default_status);
        let task_type = self.task_type.unwrap_or(default_type);
        let explicit = self.published_at.map(PublishedAtInput::Raw);

        Ok(NewTask {
            title,
            description: self.description.unwrap_or_default(),
            status,
            task_type,
            start_date: nullable_date(self.start_date.as_deref(), "start date")?,
            due_date: required_date(self.due_date.as_deref(), "due date")?,
            feedback_date1: nullable_date(self.feedback_date1.as_deref(), "feedback date 1")?,
            feedback_date2: nullable_date(self.feedback_date2.as_deref(), "feedback date 2")?,
            publish: publish::resolve(task_type, status, explicit.as_ref(), None, now),
            article_url: self.article_url.filter(|s| !s.trim().is_empty()),
            article_slug: self.article_slug.filter(|s| !s.trim().is_empty()),
            assignee_id,
            author_id,
            checker_id,
        })
    }
}

/// Partial update of a task
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskPatch {
    pub title: Patch<String>,
    pub description: Patch<String>,
    pub status: Patch<TaskStatus>,
    #[serde(rename = "type")]
    pub task_type: Patch<TaskType>,
    pub start_date: Patch<String>,
    pub due_date: Patch<String>,
    pub feedback_date1: Patch<String>,
    pub feedback_date2: Patch<String>,
    pub published_at: Patch<String>,
    pub article_url: Patch<String>,
    pub article_slug: Patch<String>,
    pub assignee_id: Patch<i64>,
    pub author_id: Patch<i64>,
    pub checker_id: Patch<i64>,
}

impl TaskPatch {
    /// Parses a JSON update body
    pub fn from_json(payload: &str) -> Result<Self, PatchError> {
        patch::from_json(payload)
    }

    /// Returns true if the patch mentions a field that publish state depends on
    pub fn touches_publish_state(&self) -> bool {
        self.status.is_present() || self.task_type.is_present() || self.published_at.is_present()
    }

    /// Returns true if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Sort order for task listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSort {
    /// Earliest due date first
    #[default]
    DueDateAsc,
    /// Earliest start date first
    StartDateAsc,
    /// Newest first
    CreatedAtDesc,
}

impl FromStr for TaskSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "due" | "dueDateAsc" => Ok(TaskSort::DueDateAsc),
            "start" | "startDateAsc" => Ok(TaskSort::StartDateAsc),
            "created" | "createdAtDesc" => Ok(TaskSort::CreatedAtDesc),
            other => Err(format!("unknown sort order '{other}' (expected due, start or created)")),
        }
    }
}

/// Filters for task listings; all set filters must match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub assignee_id: Option<i64>,
    pub checker_id: Option<i64>,
    pub status: Option<TaskStatus>,
    pub task_type: Option<TaskType>,
    pub is_published: Option<bool>,
    /// Publish instant falls in this range
    pub published_in: Option<DateRange>,
    /// Start date on or after
    pub start_from: Option<NaiveDateTime>,
    /// Start date on or before
    pub start_before: Option<NaiveDateTime>,
    /// Due date on or before
    pub due_by: Option<NaiveDateTime>,
    /// Drop finished tasks; takes precedence over `status`
    pub exclude_done: bool,
    /// Only unfinished tasks that have started by this day (or have no start date)
    pub active_on: Option<NaiveDate>,
    pub sort: TaskSort,
}
