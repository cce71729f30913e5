//! Course plan executor: walks the items in order, resolves what each one
//! needs, and submits it through the creation gateway.
//!
//! Fatal precondition failures stop the run at the failing item. Items
//! already submitted stay submitted. Gateway failures are logged and the run
//! moves on.

use chrono::DateTime;
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::directory::{DirectoryResolver, ResolvedId};
use crate::error::{PreconditionError, ServiceError};
use crate::gateway::{
    AssignmentRequest, CreatedWork, CreationGateway, DEFAULT_MAX_POINTS, MaterialRequest,
};
use crate::plan::CoursePlan;
use crate::schedule::DateChain;
use crate::work::{WorkItem, WorkKind};

/// Drive folder that assignment submissions land in.
pub const DEFAULT_SUBMISSION_FOLDER: &str = "Classroom";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorOptions {
    pub submission_folder: String,
    pub default_max_points: u32,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            submission_folder: DEFAULT_SUBMISSION_FOLDER.to_string(),
            default_max_points: DEFAULT_MAX_POINTS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Processing(usize),
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Submitted { id: String },
    GatewayFailed { error: ServiceError },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemReport {
    pub title: String,
    pub kind: WorkKind,
    pub publish: DateTime<Tz>,
    pub due: Option<DateTime<Tz>>,
    pub attached_files: usize,
    pub outcome: ItemOutcome,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub items: Vec<ItemReport>,
}

impl RunSummary {
    pub fn submitted(&self) -> usize {
        self.items
            .iter()
            .filter(|r| matches!(r.outcome, ItemOutcome::Submitted { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.submitted()
    }
}

pub struct CoursePlanExecutor<'a> {
    resolver: DirectoryResolver<'a>,
    gateway: &'a dyn CreationGateway,
    options: ExecutorOptions,
    state: RunState,
}

impl<'a> CoursePlanExecutor<'a> {
    pub fn new(
        resolver: DirectoryResolver<'a>,
        gateway: &'a dyn CreationGateway,
        options: ExecutorOptions,
    ) -> Self {
        Self {
            resolver,
            gateway,
            options,
            state: RunState::NotStarted,
        }
    }

    /// Where the last run got to. After a fatal error this is the index of
    /// the failing item.
    pub fn state(&self) -> RunState {
        self.state
    }

    pub async fn run(&mut self, plan: &CoursePlan) -> Result<RunSummary, PreconditionError> {
        let mut chain = DateChain::new(*plan.start_date());
        let mut summary = RunSummary::default();

        for (index, item) in plan.items().iter().enumerate() {
            self.state = RunState::Processing(index);
            let report = self.process(plan, item, &mut chain).await?;
            summary.items.push(report);
        }

        self.state = RunState::Completed;
        info!(
            course = plan.course_name(),
            submitted = summary.submitted(),
            failed = summary.failed(),
            "plan complete"
        );
        Ok(summary)
    }

    async fn process(
        &self,
        plan: &CoursePlan,
        item: &WorkItem,
        chain: &mut DateChain,
    ) -> Result<ItemReport, PreconditionError> {
        let out_of_range = |source| PreconditionError::DateOutOfRange {
            item: item.title.clone(),
            source,
        };

        let publish = chain.advance(item).map_err(out_of_range)?;

        let topic_id = self.resolver.find_topic_id(plan.course_id(), &item.topic).await;
        if topic_id.is_none() {
            if item.kind == WorkKind::Assignment {
                return Err(PreconditionError::TopicUnresolved {
                    item: item.title.clone(),
                    topic: item.topic.clone(),
                });
            }
            if !item.topic.is_empty() {
                warn!(item = %item.title, topic = %item.topic, "topic not found, posting without one");
            }
        }

        let file_ids = self.resolve_files(item).await;
        let attached_files = file_ids.len();

        let base = MaterialRequest::new(plan.course_id().clone(), &item.title, &publish)
            .with_description(item.description.clone())
            .with_topic(topic_id)
            .with_files(file_ids);

        let (due, result) = match item.kind {
            WorkKind::Material => (None, self.gateway.create_material(&base).await),
            WorkKind::Assignment => {
                let folder = self
                    .resolver
                    .find_file_id(&self.options.submission_folder)
                    .await
                    .ok_or_else(|| PreconditionError::SubmissionFolderUnresolved {
                        item: item.title.clone(),
                        folder: self.options.submission_folder.clone(),
                    })?;

                let due = item
                    .resolve_due_date(&publish)
                    .map_err(out_of_range)?
                    .ok_or_else(|| PreconditionError::MissingDueDate {
                        item: item.title.clone(),
                    })?;

                let request = AssignmentRequest::new(base, &due, folder).with_max_points(
                    item.max_points.unwrap_or(self.options.default_max_points),
                );
                (Some(due), self.gateway.create_assignment(&request).await)
            }
        };

        Ok(ItemReport {
            title: item.title.clone(),
            kind: item.kind,
            publish,
            due,
            attached_files,
            outcome: outcome(item, result),
        })
    }

    /// Unresolved names are skipped; the item is posted with what was found.
    async fn resolve_files(&self, item: &WorkItem) -> Vec<ResolvedId> {
        let mut ids = Vec::with_capacity(item.files.len());
        for name in &item.files {
            match self.resolver.find_file_id(name).await {
                Some(id) => ids.push(id),
                None => warn!(item = %item.title, file = %name, "skipping unresolved file"),
            }
        }
        ids
    }
}

fn outcome(item: &WorkItem, result: Result<CreatedWork, ServiceError>) -> ItemOutcome {
    match result {
        Ok(created) => {
            info!(item = %item.title, kind = %item.kind, id = %created.id, "scheduled");
            ItemOutcome::Submitted { id: created.id }
        }
        Err(error) => {
            warn!(item = %item.title, kind = %item.kind, %error, "creation failed, continuing");
            ItemOutcome::GatewayFailed { error }
        }
    }
}
