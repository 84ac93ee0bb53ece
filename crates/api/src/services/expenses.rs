//! Expense service.

use domain::models::expense::{CreateExpenseRequest, Expense, UpdateExpenseRequest};
use persistence::repositories::collections::EXPENSES;
use persistence::{BlobStorage, DocumentQuery, DocumentStore};
use std::sync::Arc;
use validator::Validate;

use super::attachments::{EntityKind, EntityService, Upload};
use super::ServiceError;

const KIND: EntityKind = EntityKind {
    name: "expense",
    collection: EXPENSES,
    attachment_field: Some("attachment"),
};

#[derive(Clone)]
pub struct ExpenseService {
    inner: EntityService<Expense>,
}

impl ExpenseService {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: BlobStorage) -> Self {
        Self {
            inner: EntityService::new(store, blobs, KIND),
        }
    }

    pub async fn get_expenses(&self) -> Result<Vec<Expense>, ServiceError> {
        self.inner.list(&DocumentQuery::new()).await
    }

    pub async fn get_expense(&self, id: &str) -> Result<Expense, ServiceError> {
        self.inner.get(id).await
    }

    pub async fn add_expense(
        &self,
        request: &CreateExpenseRequest,
        attachment: Option<Upload>,
    ) -> Result<Expense, ServiceError> {
        request.validate()?;
        self.inner.add(request, attachment).await
    }

    pub async fn update_expense(
        &self,
        id: &str,
        request: &UpdateExpenseRequest,
        attachment: Option<Upload>,
    ) -> Result<Expense, ServiceError> {
        request.validate()?;
        self.inner
            .update(id, request, attachment, request.remove_attachment)
            .await
    }

    pub async fn delete_expense(&self, id: &str) -> Result<(), ServiceError> {
        self.inner.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistence::store::MemoryDocumentStore;

    #[tokio::test]
    async fn test_remove_attachment_flag_drops_file() {
        let blobs = BlobStorage::in_memory("https://files.bpjp.test").unwrap();
        let service = ExpenseService::new(Arc::new(MemoryDocumentStore::new()), blobs.clone());

        let created = service
            .add_expense(
                &CreateExpenseRequest {
                    name: "Tents".to_string(),
                    amount: 800.0,
                    details: String::new(),
                },
                Some(Upload::new("bill.jpg", Some("image/jpeg"), vec![1, 2, 3])),
            )
            .await
            .unwrap();
        let path = created.attachment.clone().unwrap().path;

        let patch = UpdateExpenseRequest {
            remove_attachment: true,
            ..Default::default()
        };
        let updated = service.update_expense(&created.id, &patch, None).await.unwrap();

        assert!(updated.attachment.is_none());
        assert!(!blobs.exists(&path).await.unwrap());
        assert_eq!(service.get_expenses().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_negative_amount_rejected_on_update() {
        let service = ExpenseService::new(
            Arc::new(MemoryDocumentStore::new()),
            BlobStorage::in_memory("https://files.bpjp.test").unwrap(),
        );
        let patch = UpdateExpenseRequest {
            amount: Some(-1.0),
            ..Default::default()
        };
        let err = service.update_expense("any", &patch, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
