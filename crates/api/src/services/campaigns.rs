//! Campaign service.

use domain::models::campaign::{
    Campaign, CampaignFilter, CreateCampaignRequest, UpdateCampaignRequest,
};
use persistence::repositories::collections::CAMPAIGNS;
use persistence::{BlobStorage, DocumentQuery, DocumentStore};
use std::sync::Arc;
use validator::Validate;

use super::attachments::{EntityKind, EntityService, Upload};
use super::ServiceError;

const KIND: EntityKind = EntityKind {
    name: "campaign",
    collection: CAMPAIGNS,
    attachment_field: Some("image"),
};

#[derive(Clone)]
pub struct CampaignService {
    inner: EntityService<Campaign>,
}

impl CampaignService {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: BlobStorage) -> Self {
        Self {
            inner: EntityService::new(store, blobs, KIND),
        }
    }

    /// All campaigns, optionally narrowed to one status.
    pub async fn get_campaigns(&self, filter: &CampaignFilter) -> Result<Vec<Campaign>, ServiceError> {
        let mut query = DocumentQuery::new();
        if let Some(status) = filter.status {
            query = query.where_eq("status", status.as_str());
        }
        self.inner.list(&query).await
    }

    pub async fn get_campaign(&self, id: &str) -> Result<Campaign, ServiceError> {
        self.inner.get(id).await
    }

    pub async fn add_campaign(
        &self,
        request: &CreateCampaignRequest,
        image: Option<Upload>,
    ) -> Result<Campaign, ServiceError> {
        request.validate()?;
        self.inner.add(request, image).await
    }

    pub async fn update_campaign(
        &self,
        id: &str,
        request: &UpdateCampaignRequest,
        image: Option<Upload>,
    ) -> Result<Campaign, ServiceError> {
        request.validate()?;
        if request.start_date.is_some() || request.end_date.is_some() {
            let current = self.inner.get(id).await?;
            request
                .validate_against(&current)
                .map_err(|e| ServiceError::Invalid(validation_message(&e)))?;
        }
        self.inner
            .update(id, request, image, request.remove_image)
            .await
    }

    pub async fn delete_campaign(&self, id: &str) -> Result<(), ServiceError> {
        self.inner.delete(id).await
    }
}

fn validation_message(error: &validator::ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| error.code.to_string())
}
