//! Credit application review: approving or rejecting a client.

use db::models::client::{Client, ClientStatus};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::storage::{Storage, StorageError};

#[derive(Debug, Error)]
pub enum ClientReviewError {
    #[error("client {0} not found")]
    ClientNotFound(Uuid),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct ClientReviewService;

impl ClientReviewService {
    /// Mark the application approved and stamp `approved_at`.
    pub async fn approve(storage: &dyn Storage, id: Uuid) -> Result<Client, ClientReviewError> {
        Self::decide(storage, id, ClientStatus::Approved).await
    }

    /// Mark the application rejected and stamp `rejected_at`.
    pub async fn reject(storage: &dyn Storage, id: Uuid) -> Result<Client, ClientReviewError> {
        Self::decide(storage, id, ClientStatus::Rejected).await
    }

    async fn decide(
        storage: &dyn Storage,
        id: Uuid,
        status: ClientStatus,
    ) -> Result<Client, ClientReviewError> {
        let previous = storage
            .get_client(id)
            .await?
            .ok_or(ClientReviewError::ClientNotFound(id))?;

        let client = match storage.set_client_status(id, status).await {
            Ok(client) => client,
            Err(StorageError::NotFound(_)) => return Err(ClientReviewError::ClientNotFound(id)),
            Err(e) => return Err(e.into()),
        };

        info!(
            client_id = %id,
            company_name = %client.company_name,
            from = %previous.status,
            to = %client.status,
            "Client application reviewed"
        );
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use db::{DBService, models::client::CreateClient};

    use super::*;
    use crate::services::storage::DbStorage;

    async fn storage_with_client() -> (DbStorage, Client) {
        let storage = DbStorage::new(DBService::new_in_memory().await.unwrap());
        let client = storage
            .create_client(&CreateClient {
                company_name: "Northern Scaffolding Ltd".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        (storage, client)
    }

    #[tokio::test]
    async fn test_approve_stamps_approved_at() {
        let (storage, client) = storage_with_client().await;
        assert_eq!(client.status, ClientStatus::Pending);

        let approved = ClientReviewService::approve(&storage, client.id).await.unwrap();
        assert_eq!(approved.status, ClientStatus::Approved);
        assert!(approved.approved_at.is_some());
        assert!(approved.rejected_at.is_none());
    }

    #[tokio::test]
    async fn test_reject_after_approve_keeps_both_stamps() {
        let (storage, client) = storage_with_client().await;
        ClientReviewService::approve(&storage, client.id).await.unwrap();

        let rejected = ClientReviewService::reject(&storage, client.id).await.unwrap();
        assert_eq!(rejected.status, ClientStatus::Rejected);
        assert!(rejected.approved_at.is_some());
        assert!(rejected.rejected_at.is_some());
    }

    #[tokio::test]
    async fn test_review_of_missing_client() {
        let (storage, _) = storage_with_client().await;
        let id = Uuid::new_v4();
        let err = ClientReviewService::approve(&storage, id).await.unwrap_err();
        assert!(matches!(err, ClientReviewError::ClientNotFound(missing) if missing == id));
    }
}
