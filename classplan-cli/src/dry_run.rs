//! Gateway that prints payloads instead of creating anything.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use classplan_core::{AssignmentRequest, CreatedWork, CreationGateway, MaterialRequest, ServiceError};
use serde::Serialize;
use tracing::info;

#[derive(Default)]
pub struct DryRunGateway {
    count: AtomicUsize,
}

impl DryRunGateway {
    fn emit<T: Serialize>(
        &self,
        endpoint: &str,
        title: &str,
        body: &T,
    ) -> Result<CreatedWork, ServiceError> {
        let n = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        let json = serde_json::to_string_pretty(body)
            .map_err(|e| ServiceError::Decode(e.to_string()))?;
        info!(endpoint, title, "dry run, not submitting");
        println!("--- {endpoint} #{n}: {title}\n{json}");
        Ok(CreatedWork {
            id: format!("dry-run-{n}"),
            state: Some("DRAFT".to_string()),
        })
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CreationGateway for DryRunGateway {
    async fn create_material(
        &self,
        request: &MaterialRequest,
    ) -> Result<CreatedWork, ServiceError> {
        self.emit("courseWorkMaterials", &request.title, request)
    }

    async fn create_assignment(
        &self,
        request: &AssignmentRequest,
    ) -> Result<CreatedWork, ServiceError> {
        self.emit("courseWork", &request.base.title, request)
    }
}
