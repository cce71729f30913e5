//! Creation requests and the gateway that submits them.
//!
//! The request types serialize to the Classroom REST bodies for
//! `courseWorkMaterials.create` and `courseWork.create`.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::directory::ResolvedId;
use crate::error::ServiceError;
use crate::time::{serialize_rfc3339, to_fixed, to_utc};

pub const DEFAULT_MAX_POINTS: u32 = 100;

/// Items are created as drafts; the platform publishes them at `scheduledTime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkState {
    Draft,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    drive_file: SharedDriveFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct SharedDriveFile {
    drive_file: DriveRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct DriveRef {
    id: ResolvedId,
}

impl Attachment {
    pub fn drive_file(id: ResolvedId) -> Self {
        Self {
            drive_file: SharedDriveFile {
                drive_file: DriveRef { id },
            },
        }
    }

    pub fn file_id(&self) -> &ResolvedId {
        &self.drive_file.drive_file.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRequest {
    pub course_id: ResolvedId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub materials: Vec<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<ResolvedId>,
    pub state: WorkState,
    #[serde(serialize_with = "serialize_rfc3339")]
    pub scheduled_time: DateTime<FixedOffset>,
}

impl MaterialRequest {
    pub fn new(course_id: ResolvedId, title: impl Into<String>, scheduled: &DateTime<Tz>) -> Self {
        Self {
            course_id,
            title: title.into(),
            description: None,
            materials: Vec::new(),
            topic_id: None,
            state: WorkState::Draft,
            scheduled_time: to_fixed(scheduled),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.is_empty());
        self
    }

    pub fn with_topic(mut self, topic_id: Option<ResolvedId>) -> Self {
        self.topic_id = topic_id;
        self
    }

    pub fn with_files(mut self, file_ids: impl IntoIterator<Item = ResolvedId>) -> Self {
        self.materials = file_ids.into_iter().map(Attachment::drive_file).collect();
        self
    }

    pub fn file_ids(&self) -> impl Iterator<Item = &ResolvedId> {
        self.materials.iter().map(Attachment::file_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DueDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DueTime {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkType {
    Assignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssigneeMode {
    AllStudents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionModificationMode {
    ModifiableUntilTurnedIn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDetails {
    pub student_work_folder: FolderRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderRef {
    pub id: ResolvedId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    #[serde(flatten)]
    pub base: MaterialRequest,
    pub due_date: DueDate,
    pub due_time: DueTime,
    pub max_points: u32,
    pub work_type: WorkType,
    pub assignee_mode: AssigneeMode,
    pub submission_modification_mode: SubmissionModificationMode,
    pub assignment: AssignmentDetails,
}

impl AssignmentRequest {
    /// Due components are sent in UTC, which is what the API expects.
    pub fn new(base: MaterialRequest, due: &DateTime<Tz>, submission_folder: ResolvedId) -> Self {
        let due = to_utc(due);
        Self {
            base,
            due_date: DueDate {
                year: due.year(),
                month: due.month(),
                day: due.day(),
            },
            due_time: DueTime {
                hours: due.hour(),
                minutes: due.minute(),
                seconds: due.second(),
            },
            max_points: DEFAULT_MAX_POINTS,
            work_type: WorkType::Assignment,
            assignee_mode: AssigneeMode::AllStudents,
            submission_modification_mode: SubmissionModificationMode::ModifiableUntilTurnedIn,
            assignment: AssignmentDetails {
                student_work_folder: FolderRef {
                    id: submission_folder,
                },
            },
        }
    }

    pub fn with_max_points(mut self, max_points: u32) -> Self {
        self.max_points = max_points;
        self
    }
}

/// What the platform echoes back for a created item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedWork {
    pub id: String,
    #[serde(default)]
    pub state: Option<String>,
}

#[async_trait]
pub trait CreationGateway: Send + Sync {
    async fn create_material(
        &self,
        request: &MaterialRequest,
    ) -> Result<CreatedWork, ServiceError>;

    async fn create_assignment(
        &self,
        request: &AssignmentRequest,
    ) -> Result<CreatedWork, ServiceError>;
}
