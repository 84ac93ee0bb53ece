//! Event service.

use chrono::{NaiveDate, Utc};
use domain::models::event::{CreateEventRequest, Event, EventFilter, UpdateEventRequest};
use persistence::repositories::collections::EVENTS;
use persistence::{BlobStorage, Direction, DocumentQuery, DocumentStore};
use std::sync::Arc;
use validator::Validate;

use super::attachments::{EntityKind, EntityService};
use super::ServiceError;

const KIND: EntityKind = EntityKind {
    name: "event",
    collection: EVENTS,
    attachment_field: None,
};

#[derive(Clone)]
pub struct EventService {
    inner: EntityService<Event>,
}

impl EventService {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: BlobStorage) -> Self {
        Self {
            inner: EntityService::new(store, blobs, KIND),
        }
    }

    /// Events in date order.
    pub async fn get_events(&self, filter: &EventFilter) -> Result<Vec<Event>, ServiceError> {
        self.get_events_as_of(filter, Utc::now().date_naive()).await
    }

    pub async fn get_events_as_of(
        &self,
        filter: &EventFilter,
        today: NaiveDate,
    ) -> Result<Vec<Event>, ServiceError> {
        let query = DocumentQuery::new().order_by("date", Direction::Ascending);
        let events = self.inner.list(&query).await?;

        if filter.upcoming_only {
            Ok(events.into_iter().filter(|e| e.is_upcoming(today)).collect())
        } else {
            Ok(events)
        }
    }

    pub async fn get_event(&self, id: &str) -> Result<Event, ServiceError> {
        self.inner.get(id).await
    }

    pub async fn add_event(&self, request: &CreateEventRequest) -> Result<Event, ServiceError> {
        request.validate()?;
        self.inner.add(request, None).await
    }

    pub async fn update_event(
        &self,
        id: &str,
        request: &UpdateEventRequest,
    ) -> Result<Event, ServiceError> {
        request.validate()?;
        self.inner.update(id, request, None, false).await
    }

    pub async fn delete_event(&self, id: &str) -> Result<(), ServiceError> {
        self.inner.delete(id).await
    }
}
