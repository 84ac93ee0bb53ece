//! Notice service, including the site-wide popup notice.

use domain::models::notice::{CreateNoticeRequest, Notice, NoticeFilter, UpdateNoticeRequest};
use persistence::repositories::collections::NOTICES;
use persistence::{BlobStorage, Direction, DocumentQuery, DocumentStore};
use serde_json::Value;
use std::sync::Arc;
use validator::Validate;

use super::attachments::{EntityKind, EntityService, Upload};
use super::{OperationContext, ServiceError};

const KIND: EntityKind = EntityKind {
    name: "notice",
    collection: NOTICES,
    attachment_field: Some("image"),
};

#[derive(Clone)]
pub struct NoticeService {
    inner: EntityService<Notice>,
}

impl NoticeService {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: BlobStorage) -> Self {
        Self {
            inner: EntityService::new(store, blobs, KIND),
        }
    }

    /// Notices, most recently updated first.
    ///
    /// With `active_only` the store filters on `active` and orders by
    /// `updated_at`, which needs a composite index on hosted backends.
    pub async fn get_notices(&self, filter: &NoticeFilter) -> Result<Vec<Notice>, ServiceError> {
        let mut query = DocumentQuery::new();
        if filter.active_only {
            query = query.where_eq("active", true);
        }
        query = query.order_by("updated_at", Direction::Descending);
        self.inner.list(&query).await
    }

    /// The most recently updated notice that is both active and marked as
    /// popup.
    pub async fn get_popup_notice(&self) -> Result<Option<Notice>, ServiceError> {
        let query = DocumentQuery::new()
            .where_eq("active", true)
            .where_eq("popup", true)
            .order_by("updated_at", Direction::Descending)
            .limit(1);

        let notices = self
            .inner
            .repository()
            .list(&query)
            .await
            .context("fetch popup notice")?;
        Ok(notices.into_iter().next())
    }

    pub async fn get_notice(&self, id: &str) -> Result<Notice, ServiceError> {
        self.inner.get(id).await
    }

    pub async fn add_notice(
        &self,
        request: &CreateNoticeRequest,
        image: Option<Upload>,
    ) -> Result<Notice, ServiceError> {
        request.validate()?;
        self.inner.add(request, image).await
    }

    pub async fn update_notice(
        &self,
        id: &str,
        request: &UpdateNoticeRequest,
        image: Option<Upload>,
    ) -> Result<Notice, ServiceError> {
        request.validate()?;
        if !request.remove_link {
            return self
                .inner
                .update(id, request, image, request.remove_image)
                .await;
        }
        if request.link.is_some() {
            return Err(ServiceError::Invalid(
                "Cannot set and remove the link in one update".to_string(),
            ));
        }

        let mut patch = serde_json::to_value(request)
            .map_err(|e| ServiceError::Invalid(e.to_string()))?;
        patch["link"] = Value::Null;
        self.inner
            .update(id, &patch, image, request.remove_image)
            .await
    }

    pub async fn delete_notice(&self, id: &str) -> Result<(), ServiceError> {
        self.inner.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistence::store::MemoryDocumentStore;

    fn service_with(store: MemoryDocumentStore) -> NoticeService {
        NoticeService::new(
            Arc::new(store),
            BlobStorage::in_memory("https://files.bpjp.test").unwrap(),
        )
    }

    fn request(title: &str, active: bool, popup: bool) -> CreateNoticeRequest {
        CreateNoticeRequest {
            title: title.to_string(),
            content: format!("{} details", title),
            active,
            popup,
            link: None,
        }
    }

    #[tokio::test]
    async fn test_remove_link_clears_it() {
        let service = service_with(MemoryDocumentStore::new());
        let created = service
            .add_notice(
                &CreateNoticeRequest {
                    link: Some("https://bpjp.org/drive".to_string()),
                    ..request("Drive", true, false)
                },
                None,
            )
            .await
            .unwrap();
        assert!(created.link.is_some());

        let both = UpdateNoticeRequest {
            link: Some("https://bpjp.org/other".to_string()),
            remove_link: true,
            ..Default::default()
        };
        let err = service.update_notice(&created.id, &both, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));

        let patch = UpdateNoticeRequest {
            remove_link: true,
            ..Default::default()
        };
        let updated = service.update_notice(&created.id, &patch, None).await.unwrap();
        assert!(updated.link.is_none());
        assert_eq!(updated.title, "Drive");
        assert!(service.get_notice(&created.id).await.unwrap().link.is_none());
    }

    #[tokio::test]
    async fn test_active_only_newest_first() {
        let service = service_with(MemoryDocumentStore::new());
        let first = service.add_notice(&request("First", true, false), None).await.unwrap();
        service.add_notice(&request("Hidden", false, false), None).await.unwrap();
        service.add_notice(&request("Second", true, false), None).await.unwrap();

        // Touching the first notice moves it to the top.
        let patch = UpdateNoticeRequest {
            content: Some("revised".to_string()),
            ..Default::default()
        };
        service.update_notice(&first.id, &patch, None).await.unwrap();

        let notices = service
            .get_notices(&NoticeFilter { active_only: true })
            .await
            .unwrap();
        let titles: Vec<&str> = notices.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
        assert!(notices.iter().all(|n| n.active));
        assert!(notices[0].updated_at > notices[1].updated_at);

        let all = service.get_notices(&NoticeFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_popup_notice_is_latest_active_popup() {
        let service = service_with(MemoryDocumentStore::new());
        assert!(service.get_popup_notice().await.unwrap().is_none());

        service.add_notice(&request("Old popup", true, true), None).await.unwrap();
        service.add_notice(&request("Inactive popup", false, true), None).await.unwrap();
        service.add_notice(&request("New popup", true, true), None).await.unwrap();
        service.add_notice(&request("Plain", true, false), None).await.unwrap();

        let popup = service.get_popup_notice().await.unwrap().unwrap();
        assert_eq!(popup.title, "New popup");
    }

    #[tokio::test]
    async fn test_missing_index_carries_creation_link() {
        let service = service_with(MemoryDocumentStore::new().require_composite_indexes());
        let err = service
            .get_notices(&NoticeFilter { active_only: true })
            .await
            .unwrap_err();

        let store_error = err.store_error().unwrap();
        assert_eq!(store_error.kind(), "missing_index");
        assert!(err.to_string().starts_with("Failed to fetch notices"));
    }
}
