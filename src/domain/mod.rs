//! Domain models for editdesk
//!
//! Contains the business rules without any I/O concerns. Everything in
//! here is pure: callers pass in "now" explicitly and get back validated
//! values or a rejection.

pub mod date;
mod patch;
pub mod publish;
pub mod shift;
mod task;
mod user;
mod work_log;

pub use date::{DateError, DateRange};
pub use patch::{Patch, PatchError};
pub use publish::{PublishState, PublishedAtInput};
pub use shift::{BusinessHoursViolation, NewShift, Shift, ShiftError, ShiftPatch, ShiftWindow};
pub use task::{
    NewTask, Task, TaskDetail, TaskDraft, TaskError, TaskFilter, TaskPatch, TaskSort, TaskStatus,
    TaskType,
};
pub use user::{NewUser, User, DEFAULT_ROLE};
pub use work_log::{NewWorkLog, WorkLog};
