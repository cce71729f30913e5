//! Name → identifier lookups against the course platform.
//!
//! [`DirectoryService`] is the raw listing contract a backend implements.
//! [`DirectoryResolver`] layers the matching policy on top: exact names, first
//! page only, no caching, and every failure collapses to `None`.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::ServiceError;

/// Opaque platform identifier (course, topic, file, folder).
///
/// Only the resolver mints these, from entries the service listed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ResolvedId(String);

impl ResolvedId {
    pub(crate) fn from_listing(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResolvedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CourseEntry {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicEntry {
    pub topic_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub modified_time: Option<DateTime<Utc>>,
}

/// Single-page listing calls against the platform.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    async fn list_courses(&self, page_size: u32) -> Result<Vec<CourseEntry>, ServiceError>;

    async fn list_topics(
        &self,
        course_id: &str,
        page_size: u32,
    ) -> Result<Vec<TopicEntry>, ServiceError>;

    /// Files whose name is exactly `name`.
    async fn search_files(
        &self,
        name: &str,
        page_size: u32,
    ) -> Result<Vec<FileEntry>, ServiceError>;
}

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Clone, Copy)]
pub struct DirectoryResolver<'a> {
    service: &'a dyn DirectoryService,
    page_size: u32,
}

impl<'a> DirectoryResolver<'a> {
    pub fn new(service: &'a dyn DirectoryService, page_size: u32) -> Self {
        Self {
            service,
            page_size: page_size.max(1),
        }
    }

    pub async fn find_course_id(&self, name: &str) -> Option<ResolvedId> {
        let courses = match self.service.list_courses(self.page_size).await {
            Ok(c) => c,
            Err(e) => {
                error!(course = name, error = %e, "course lookup failed");
                return None;
            }
        };

        let found = courses.into_iter().find(|c| c.name == name);
        debug!(course = name, found = found.is_some(), "course lookup");
        found.map(|c| ResolvedId::from_listing(c.id))
    }

    /// Empty names resolve to `None` without a remote call.
    pub async fn find_topic_id(&self, course_id: &ResolvedId, name: &str) -> Option<ResolvedId> {
        if name.is_empty() {
            return None;
        }

        let topics = match self
            .service
            .list_topics(course_id.as_str(), self.page_size)
            .await
        {
            Ok(t) => t,
            Err(e) => {
                error!(topic = name, error = %e, "topic lookup failed");
                return None;
            }
        };

        let found = topics.into_iter().find(|t| t.name == name);
        debug!(topic = name, found = found.is_some(), "topic lookup");
        found.map(|t| ResolvedId::from_listing(t.topic_id))
    }

    /// Exact-name file search.
    ///
    /// Several matches are reported as ambiguous and the most recently
    /// modified one wins; entries without a modification time rank last and
    /// otherwise keep the service's order.
    pub async fn find_file_id(&self, name: &str) -> Option<ResolvedId> {
        let mut files = match self.service.search_files(name, self.page_size).await {
            Ok(f) => f,
            Err(e) => {
                error!(file = name, error = %e, "file lookup failed");
                return None;
            }
        };

        match files.len() {
            0 => {
                warn!(file = name, "found 0 files with this name");
                return None;
            }
            1 => {}
            n => {
                warn!(file = name, matches = n, "ambiguous file name, using most recently modified");
                files.sort_by(|a, b| b.modified_time.cmp(&a.modified_time));
            }
        }

        files
            .into_iter()
            .next()
            .map(|f| ResolvedId::from_listing(f.id))
    }
}
