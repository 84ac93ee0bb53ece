//! Election candidates and their recorded voters.
//!
//! Voters are read-only here; casting votes happens elsewhere.

use domain::models::election::{
    CandidateFilter, CandidateWithVoters, CreateCandidateRequest, ElectionCandidate, Position,
    UpdateCandidateRequest, Voter,
};
use futures::future::try_join_all;
use persistence::repositories::collections::{ELECTION_CANDIDATES, VOTERS};
use persistence::repositories::CollectionRepository;
use persistence::{BlobStorage, CollectionPath, Direction, DocumentQuery, DocumentStore};
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

use super::attachments::{EntityKind, EntityService, Upload};
use super::{OperationContext, ServiceError};

const KIND: EntityKind = EntityKind {
    name: "candidate",
    collection: ELECTION_CANDIDATES,
    attachment_field: Some("image"),
};

#[derive(Clone)]
pub struct CandidateService {
    inner: EntityService<ElectionCandidate>,
}

impl CandidateService {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: BlobStorage) -> Self {
        Self {
            inner: EntityService::new(store, blobs, KIND),
        }
    }

    fn voters_repository(&self, candidate_id: &str) -> CollectionRepository<Voter> {
        let path = CollectionPath::root(ELECTION_CANDIDATES).child(candidate_id, VOTERS);
        CollectionRepository::new(Arc::clone(self.inner.repository().store()), path)
    }

    pub async fn get_candidates(
        &self,
        position: Option<Position>,
    ) -> Result<Vec<ElectionCandidate>, ServiceError> {
        let mut query = DocumentQuery::new();
        if let Some(position) = position {
            query = query.where_eq("position", position.as_str());
        }
        self.inner.list(&query).await
    }

    /// Candidates together with their voters. One voters query runs per
    /// candidate, concurrently; the first failure fails the whole listing.
    pub async fn get_candidates_with_voters(
        &self,
        filter: &CandidateFilter,
    ) -> Result<Vec<CandidateWithVoters>, ServiceError> {
        let candidates = self.get_candidates(filter.position).await?;
        debug!(count = candidates.len(), "Fetching voters per candidate");

        let voters = try_join_all(candidates.iter().map(|c| self.get_voters(&c.id))).await?;

        Ok(candidates
            .into_iter()
            .zip(voters)
            .map(|(candidate, voters)| CandidateWithVoters::new(candidate, voters))
            .collect())
    }

    /// Voters of one candidate in voting order.
    pub async fn get_voters(&self, candidate_id: &str) -> Result<Vec<Voter>, ServiceError> {
        let query = DocumentQuery::new().order_by("voted_at", Direction::Ascending);
        self.voters_repository(candidate_id)
            .list(&query)
            .await
            .context(format!("fetch voters of candidate '{}'", candidate_id))
    }

    pub async fn get_candidate(&self, id: &str) -> Result<ElectionCandidate, ServiceError> {
        self.inner.get(id).await
    }

    pub async fn add_candidate(
        &self,
        request: &CreateCandidateRequest,
        image: Option<Upload>,
    ) -> Result<ElectionCandidate, ServiceError> {
        request.validate()?;
        self.inner.add(request, image).await
    }

    pub async fn update_candidate(
        &self,
        id: &str,
        request: &UpdateCandidateRequest,
        image: Option<Upload>,
    ) -> Result<ElectionCandidate, ServiceError> {
        request.validate()?;
        self.inner
            .update(id, request, image, request.remove_image)
            .await
    }

    pub async fn delete_candidate(&self, id: &str) -> Result<(), ServiceError> {
        self.inner.delete(id).await
    }
}
