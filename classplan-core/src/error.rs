//! Error taxonomy for plan loading and execution.
//!
//! Configuration and precondition errors are fatal and abort a run.
//! [`ServiceError`] is the soft kind: resolvers and the executor log it and
//! carry on.

use thiserror::Error;

use crate::offset::DateOutOfRange;

/// Load-time problems with the plan itself.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unknown kind of work {value:?} on item {item:?} (expected material or assignment)")]
    UnknownKind { item: String, value: String },

    #[error("work item title must not be empty")]
    EmptyTitle,

    #[error("invalid {field} {value:?} on item {item:?}: {reason}")]
    InvalidDate {
        item: String,
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid start_date {value:?}: {reason}")]
    InvalidStartDate { value: String, reason: String },

    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("start date {start} has already passed (now {now})")]
    StartDateInPast { start: String, now: String },

    #[error("unable to find course with name {0:?}")]
    CourseNotFound(String),
}

/// A mandatory per-item input is missing after resolution. Aborts the run.
#[derive(Debug, Error)]
pub enum PreconditionError {
    #[error("assignment {item:?}: unable to find topic {topic:?}")]
    TopicUnresolved { item: String, topic: String },

    #[error("assignment {item:?}: unable to find submission folder {folder:?}")]
    SubmissionFolderUnresolved { item: String, folder: String },

    #[error("assignment {item:?} has no due date (set due_date or due_after)")]
    MissingDueDate { item: String },

    #[error("item {item:?}: {source}")]
    DateOutOfRange {
        item: String,
        #[source]
        source: DateOutOfRange,
    },
}

/// Any fatal outcome of loading or running a plan.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Precondition(#[from] PreconditionError),
}

/// Failure reported by the remote directory or creation service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}
