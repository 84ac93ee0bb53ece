//! Mission and vision content, stored as one singleton document.

use domain::models::mission::{MissionContent, SetMissionRequest};
use persistence::repositories::collections::{CONTENT, MISSION_DOCUMENT};
use persistence::repositories::CollectionRepository;
use persistence::{CollectionPath, DocumentStore};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use super::{OperationContext, ServiceError};
use crate::middleware::metrics::record_entity_change;

#[derive(Clone)]
pub struct MissionService {
    repo: CollectionRepository<MissionContent>,
}

impl MissionService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            repo: CollectionRepository::new(store, CollectionPath::root(CONTENT)),
        }
    }

    /// The current content, or `None` before it was first set.
    pub async fn get_mission(&self) -> Result<Option<MissionContent>, ServiceError> {
        self.repo
            .find(MISSION_DOCUMENT)
            .await
            .context("fetch mission content")
    }

    /// Replaces the content, creating the document on first use.
    pub async fn set_mission(&self, request: &SetMissionRequest) -> Result<MissionContent, ServiceError> {
        request.validate()?;
        let content = self
            .repo
            .set(MISSION_DOCUMENT, request)
            .await
            .context("save mission content")?;

        info!(values = content.values.len(), "Mission content saved");
        record_entity_change("mission", "set");
        Ok(content)
    }
}
