//! Advisory board and executive committee membership.

use domain::models::board::{
    Board, BoardMember, CreateBoardMemberRequest, UpdateBoardMemberRequest,
};
use persistence::repositories::collections::{ADVISORY_BOARD, EXECUTIVE_COMMITTEE};
use persistence::{BlobStorage, Direction, DocumentQuery, DocumentStore};
use std::sync::Arc;
use validator::Validate;

use super::attachments::{EntityKind, EntityService, Upload};
use super::ServiceError;

fn kind(board: Board) -> EntityKind {
    match board {
        Board::Advisory => EntityKind {
            name: "advisory board member",
            collection: ADVISORY_BOARD,
            attachment_field: Some("image"),
        },
        Board::Executive => EntityKind {
            name: "executive committee member",
            collection: EXECUTIVE_COMMITTEE,
            attachment_field: Some("image"),
        },
    }
}

/// Members of one board. Both boards share this service, each bound to
/// its own collection.
#[derive(Clone)]
pub struct BoardService {
    board: Board,
    inner: EntityService<BoardMember>,
}

impl BoardService {
    pub fn new(board: Board, store: Arc<dyn DocumentStore>, blobs: BlobStorage) -> Self {
        Self {
            board,
            inner: EntityService::new(store, blobs, kind(board)),
        }
    }

    pub fn board(&self) -> Board {
        self.board
    }

    /// Members in display order.
    pub async fn get_members(&self) -> Result<Vec<BoardMember>, ServiceError> {
        let query = DocumentQuery::new().order_by("display_order", Direction::Ascending);
        self.inner.list(&query).await
    }

    pub async fn get_member(&self, id: &str) -> Result<BoardMember, ServiceError> {
        self.inner.get(id).await
    }

    pub async fn add_member(
        &self,
        request: &CreateBoardMemberRequest,
        image: Option<Upload>,
    ) -> Result<BoardMember, ServiceError> {
        request.validate()?;
        self.inner.add(request, image).await
    }

    pub async fn update_member(
        &self,
        id: &str,
        request: &UpdateBoardMemberRequest,
        image: Option<Upload>,
    ) -> Result<BoardMember, ServiceError> {
        request.validate()?;
        self.inner
            .update(id, request, image, request.remove_image)
            .await
    }

    pub async fn delete_member(&self, id: &str) -> Result<(), ServiceError> {
        self.inner.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistence::store::MemoryDocumentStore;

    fn member(name: &str, order: i32) -> CreateBoardMemberRequest {
        CreateBoardMemberRequest {
            name: name.to_string(),
            designation: "Member".to_string(),
            bio: None,
            display_order: order,
        }
    }

    #[tokio::test]
    async fn test_boards_are_separate_collections() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let blobs = BlobStorage::in_memory("https://files.bpjp.test").unwrap();
        let advisory = BoardService::new(Board::Advisory, store.clone(), blobs.clone());
        let executive = BoardService::new(Board::Executive, store, blobs);

        advisory.add_member(&member("Rahim", 2), None).await.unwrap();
        advisory.add_member(&member("Karim", 1), None).await.unwrap();
        executive.add_member(&member("Salma", 1), None).await.unwrap();

        let names: Vec<String> = advisory
            .get_members()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Karim", "Rahim"]);
        assert_eq!(executive.get_members().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_member_photo_lives_under_board_collection() {
        let service = BoardService::new(
            Board::Executive,
            Arc::new(MemoryDocumentStore::new()),
            BlobStorage::in_memory("https://files.bpjp.test").unwrap(),
        );
        let created = service
            .add_member(
                &member("Salma", 1),
                Some(Upload::new("salma.png", None, vec![0x89, 0x50])),
            )
            .await
            .unwrap();

        let image = created.image.unwrap();
        assert!(image.path.starts_with(&format!("{}/{}/", EXECUTIVE_COMMITTEE, created.id)));
        assert_eq!(image.content_type, "image/png");
    }
}
