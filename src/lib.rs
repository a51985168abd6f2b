//! editdesk - task, shift and work-log tracking for small editorial teams
//!
//! Tasks move through a short editorial workflow and carry a derived
//! publish date. Shifts record who works when, inside fixed business
//! hours. Work logs tie a member's day to a task.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{Shift, Task, TaskStatus, TaskType, User, WorkLog};
