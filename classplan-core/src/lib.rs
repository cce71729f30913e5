//! classplan-core: course plan model, date chain, and the executor that
//! schedules coursework on the course platform.

pub mod directory;
pub mod error;
pub mod executor;
pub mod gateway;
pub mod offset;
pub mod plan;
pub mod schedule;
pub mod time;
pub mod work;

pub use directory::{
    CourseEntry, DEFAULT_PAGE_SIZE, DirectoryResolver, DirectoryService, FileEntry, ResolvedId,
    TopicEntry,
};
pub use error::{ConfigError, PlanError, PreconditionError, ServiceError};
pub use executor::{
    CoursePlanExecutor, DEFAULT_SUBMISSION_FOLDER, ExecutorOptions, ItemOutcome, ItemReport,
    RunState, RunSummary,
};
pub use gateway::{AssignmentRequest, CreatedWork, CreationGateway, MaterialRequest};
pub use offset::{DateOffset, DateOutOfRange};
pub use plan::{CoursePlan, PlanDocument, PlanDraft};
pub use schedule::{DateChain, ScheduledDates, resolve_schedule};
pub use time::PlanDate;
pub use work::{RawWorkItem, WorkItem, WorkKind, normalize};
