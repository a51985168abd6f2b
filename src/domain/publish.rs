//! Publish-state derivation for tasks
//!
//! Whether a task is published is never set directly. It follows from the
//! task's type and status: a publishable type (`new_article`, `rewrite`)
//! in status `done` is published, everything else isn't. The publish
//! instant comes along with it and is cleared whenever the task stops
//! qualifying.
//!
//! The write path calls [`resolve`] right before persisting a task so that
//! `is_published` and `published_at` can never disagree.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::date::parse_instant;
use super::task::{TaskStatus, TaskType};

/// Derived publish fields of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishState {
    pub is_published: bool,
    pub published_at: Option<NaiveDateTime>,
}

impl PublishState {
    pub const UNPUBLISHED: Self = Self {
        is_published: false,
        published_at: None,
    };

    fn published(at: NaiveDateTime) -> Self {
        Self {
            is_published: true,
            published_at: Some(at),
        }
    }
}

/// A publish date supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishedAtInput {
    /// Unparsed text, usually `YYYY-MM-DD`
    Raw(String),
    /// An instant that is already resolved
    At(NaiveDateTime),
}

impl PublishedAtInput {
    /// Returns true for input that counts as "not supplied"
    fn is_blank(&self) -> bool {
        matches!(self, PublishedAtInput::Raw(raw) if raw.trim().is_empty())
    }
}

/// Derives the publish state of a task
///
/// - not publishable, or not `done`: unpublished, any previous instant dropped
/// - no explicit date, previous instant recorded: keep the previous instant
/// - no explicit date, nothing recorded: publish at `now`
/// - explicit date: use it, or `now` if it can't be parsed
pub fn resolve(
    task_type: TaskType,
    status: TaskStatus,
    explicit: Option<&PublishedAtInput>,
    previous: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> PublishState {
    if !(task_type.is_publishable() && status == TaskStatus::Done) {
        return PublishState::UNPUBLISHED;
    }

    let explicit = explicit.filter(|input| !input.is_blank());

    match (explicit, previous) {
        (None, Some(previous)) => PublishState::published(previous),
        (None, None) => PublishState::published(now),
        (Some(PublishedAtInput::At(at)), _) => PublishState::published(*at),
        (Some(PublishedAtInput::Raw(raw)), _) => match parse_instant(raw) {
            Ok(at) => PublishState::published(at),
            Err(err) => {
                tracing::warn!(input = %raw, error = %err, "unresolvable publish date; using current time");
                PublishState::published(now)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn now() -> NaiveDateTime {
        at(2024, 6, 1, 12)
    }

    fn raw(s: &str) -> PublishedAtInput {
        PublishedAtInput::Raw(s.to_string())
    }

    #[test]
    fn preserves_previous_instant() {
        let previous = at(2024, 3, 1, 10);
        assert_eq!(
            resolve(TaskType::NewArticle, TaskStatus::Done, None, Some(previous), now()),
            PublishState {
                is_published: true,
                published_at: Some(previous)
            }
        );
    }

    #[test]
    fn first_publish_stamps_now() {
        assert_eq!(
            resolve(TaskType::Rewrite, TaskStatus::Done, None, None, now()),
            PublishState {
                is_published: true,
                published_at: Some(now())
            }
        );
    }

    #[test]
    fn leaving_done_clears() {
        let previous = at(2024, 3, 1, 10);
        assert_eq!(
            resolve(TaskType::NewArticle, TaskStatus::InProgress, None, Some(previous), now()),
            PublishState::UNPUBLISHED
        );
    }

    #[test]
    fn non_publishable_type_ignores_explicit_date() {
        assert_eq!(
            resolve(TaskType::Other, TaskStatus::Done, Some(&raw("2024-01-01")), None, now()),
            PublishState::UNPUBLISHED
        );
    }

    #[test]
    fn explicit_date_wins_over_previous() {
        let state = resolve(
            TaskType::NewArticle,
            TaskStatus::Done,
            Some(&raw("2024-01-01")),
            Some(at(2023, 12, 1, 9)),
            now(),
        );
        assert_eq!(state.published_at, Some(at(2024, 1, 1, 0)));

        let resolved = at(2024, 2, 2, 15);
        let state = resolve(
            TaskType::Rewrite,
            TaskStatus::Done,
            Some(&PublishedAtInput::At(resolved)),
            None,
            now(),
        );
        assert_eq!(state.published_at, Some(resolved));
    }

    #[test]
    fn unparseable_explicit_date_falls_back_to_now() {
        let state = resolve(
            TaskType::NewArticle,
            TaskStatus::Done,
            Some(&raw("someday")),
            Some(at(2023, 12, 1, 9)),
            now(),
        );
        assert_eq!(state, PublishState::published(now()));
    }

    #[test]
    fn blank_explicit_date_counts_as_absent() {
        let previous = at(2023, 12, 1, 9);
        let state = resolve(
            TaskType::NewArticle,
            TaskStatus::Done,
            Some(&raw("  ")),
            Some(previous),
            now(),
        );
        assert_eq!(state.published_at, Some(previous));
    }

    fn any_type() -> impl Strategy<Value = TaskType> {
        prop_oneof![Just(TaskType::NewArticle), Just(TaskType::Rewrite), Just(TaskType::Other)]
    }

    fn any_status() -> impl Strategy<Value = TaskStatus> {
        prop_oneof![
            Just(TaskStatus::NotStarted),
            Just(TaskStatus::InProgress),
            Just(TaskStatus::CheckRequest),
            Just(TaskStatus::Done),
            Just(TaskStatus::OnHold),
        ]
    }

    proptest! {
        #[test]
        fn published_iff_publishable_and_done(
            task_type in any_type(),
            status in any_status(),
            explicit in proptest::option::of("[0-9a-z-]{0,12}"),
            has_previous in any::<bool>(),
        ) {
            let explicit = explicit.map(PublishedAtInput::Raw);
            let previous = has_previous.then(|| at(2024, 1, 15, 8));
            let state = resolve(task_type, status, explicit.as_ref(), previous, now());

            prop_assert_eq!(
                state.is_published,
                task_type.is_publishable() && status == TaskStatus::Done
            );
            prop_assert_eq!(state.published_at.is_some(), state.is_published);
        }
    }
}
