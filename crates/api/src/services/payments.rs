//! Payment transaction service.

use domain::models::payment::{
    CreatePaymentRequest, PaymentFilter, PaymentTransaction, UpdatePaymentRequest,
};
use persistence::repositories::collections::PAYMENTS;
use persistence::{BlobStorage, DocumentQuery, DocumentStore};
use std::sync::Arc;
use validator::Validate;

use super::attachments::{EntityKind, EntityService};
use super::ServiceError;

const KIND: EntityKind = EntityKind {
    name: "payment",
    collection: PAYMENTS,
    attachment_field: None,
};

#[derive(Clone)]
pub struct PaymentService {
    inner: EntityService<PaymentTransaction>,
}

impl PaymentService {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: BlobStorage) -> Self {
        Self {
            inner: EntityService::new(store, blobs, KIND),
        }
    }

    /// Payments matching every given filter, newest first.
    pub async fn get_payments(
        &self,
        filter: &PaymentFilter,
    ) -> Result<Vec<PaymentTransaction>, ServiceError> {
        let mut query = DocumentQuery::new();
        if let Some(status) = filter.status {
            query = query.where_eq("status", status.as_str());
        }
        if let Some(user_id) = filter.user_id.as_deref() {
            query = query.where_eq("user_id", user_id);
        }
        if let Some(campaign_id) = filter.campaign_id.as_deref() {
            query = query.where_eq("campaign_id", campaign_id);
        }

        let mut payments = self.inner.list(&query).await?;
        // Sorted here: stored dates carry a variable number of fraction digits.
        payments.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(payments)
    }

    pub async fn get_payment(&self, id: &str) -> Result<PaymentTransaction, ServiceError> {
        self.inner.get(id).await
    }

    pub async fn add_payment(
        &self,
        request: &CreatePaymentRequest,
    ) -> Result<PaymentTransaction, ServiceError> {
        request.validate()?;
        self.inner.add(request, None).await
    }

    pub async fn update_payment(
        &self,
        id: &str,
        request: &UpdatePaymentRequest,
    ) -> Result<PaymentTransaction, ServiceError> {
        request.validate()?;
        self.inner.update(id, request, None, false).await
    }

    pub async fn delete_payment(&self, id: &str) -> Result<(), ServiceError> {
        self.inner.delete(id).await
    }
}
