//! Google Classroom + Drive REST client.
//!
//! Implements the directory listing calls and the creation gateway over
//! plain `reqwest` with a bearer token.

use async_trait::async_trait;
use classplan_core::{
    AssignmentRequest, CourseEntry, CreatedWork, CreationGateway, DirectoryService, FileEntry,
    MaterialRequest, ServiceError, TopicEntry,
};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::GoogleSection;

pub struct GoogleClient {
    http: reqwest::Client,
    classroom_base_url: String,
    drive_base_url: String,
}

#[derive(Deserialize)]
struct CourseList {
    #[serde(default)]
    courses: Vec<CourseEntry>,
}

// Classroom names the list field `topic`, singular.
#[derive(Deserialize)]
struct TopicList {
    #[serde(default)]
    topic: Vec<TopicEntry>,
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileEntry>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl GoogleClient {
    pub fn new(access_token: &str, cfg: &GoogleSection) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {access_token}"))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            classroom_base_url: cfg.classroom_base_url.trim_end_matches('/').to_string(),
            drive_base_url: cfg.drive_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, ServiceError> {
        let resp = req
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DirectoryService for GoogleClient {
    async fn list_courses(&self, page_size: u32) -> Result<Vec<CourseEntry>, ServiceError> {
        let url = format!("{}/courses", self.classroom_base_url);
        debug!(%url, page_size, "listing courses");
        let list: CourseList = self
            .send(self.http.get(url).query(&[("pageSize", page_size)]))
            .await?;
        Ok(list.courses)
    }

    async fn list_topics(
        &self,
        course_id: &str,
        page_size: u32,
    ) -> Result<Vec<TopicEntry>, ServiceError> {
        let url = format!("{}/courses/{}/topics", self.classroom_base_url, course_id);
        debug!(%url, page_size, "listing topics");
        let list: TopicList = self
            .send(self.http.get(url).query(&[("pageSize", page_size)]))
            .await?;
        Ok(list.topic)
    }

    async fn search_files(
        &self,
        name: &str,
        page_size: u32,
    ) -> Result<Vec<FileEntry>, ServiceError> {
        let url = format!("{}/files", self.drive_base_url);
        let q = drive_name_query(name);
        debug!(%url, %q, "searching drive");
        let page_size = page_size.to_string();
        let list: FileList = self
            .send(self.http.get(url).query(&[
                ("pageSize", page_size.as_str()),
                ("spaces", "drive"),
                ("q", q.as_str()),
                ("orderBy", "modifiedTime desc"),
                ("fields", "files(id,name,modifiedTime)"),
                ("includeItemsFromAllDrives", "false"),
            ]))
            .await?;
        Ok(list.files)
    }
}

#[async_trait]
impl CreationGateway for GoogleClient {
    async fn create_material(
        &self,
        request: &MaterialRequest,
    ) -> Result<CreatedWork, ServiceError> {
        let url = format!(
            "{}/courses/{}/courseWorkMaterials",
            self.classroom_base_url, request.course_id
        );
        self.send(self.http.post(url).json(request)).await
    }

    async fn create_assignment(
        &self,
        request: &AssignmentRequest,
    ) -> Result<CreatedWork, ServiceError> {
        let url = format!(
            "{}/courses/{}/courseWork",
            self.classroom_base_url, request.base.course_id
        );
        self.send(self.http.post(url).json(request)).await
    }
}

/// Drive `q` for an exact, non-trashed name match.
fn drive_name_query(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!("name = '{escaped}' and trashed = false")
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().chars().take(200).collect())
}
