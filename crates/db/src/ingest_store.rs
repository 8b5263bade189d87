//! PostgreSQL implementation of the ingestion store.

use async_trait::async_trait;
use bonusdesk_core::ingestion::{
    ClientPatch, ExistingClient, ExistingRequest, IngestStore, NewClient, NewRequest,
    RequestRecord, StoreError,
};
use bonusdesk_core::types::DbId;
use sqlx::PgPool;

use crate::repositories::{ClientRepo, RequestRepo};

/// [`IngestStore`] backed by the `clients`, `requests` and tier tables.
#[derive(Debug, Clone)]
pub struct PgIngestStore {
    pool: PgPool,
}

impl PgIngestStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IngestStore for PgIngestStore {
    async fn find_client_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ExistingClient>, StoreError> {
        ClientRepo::find_by_email(&self.pool, email)
            .await
            .map(|row| row.map(ExistingClient::from))
            .map_err(|e| StoreError::new("find_client_by_email", e))
    }

    async fn find_client_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<ExistingClient>, StoreError> {
        ClientRepo::find_by_contact(&self.pool, phone)
            .await
            .map(|row| row.map(ExistingClient::from))
            .map_err(|e| StoreError::new("find_client_by_phone", e))
    }

    async fn insert_client(&self, client: &NewClient) -> Result<Option<DbId>, StoreError> {
        ClientRepo::insert_if_absent(
            &self.pool,
            &client.name,
            client.surname.as_deref(),
            client.email.as_deref(),
            client.contact.as_deref(),
            client.trusted,
        )
        .await
        .map_err(|e| StoreError::new("insert_client", e))
    }

    async fn fill_client_blanks(
        &self,
        client_id: DbId,
        patch: &ClientPatch,
    ) -> Result<ClientPatch, StoreError> {
        let row = ClientRepo::fill_blanks(
            &self.pool,
            client_id,
            patch.email.as_deref(),
            patch.contact.as_deref(),
            patch.surname.as_deref(),
        )
        .await
        .map_err(|e| StoreError::new("fill_client_blanks", e))?
        .ok_or_else(|| {
            StoreError::new("fill_client_blanks", format!("client {client_id} not found"))
        })?;

        // A field counts as written when the row now holds the patch value.
        let written = |wanted: &Option<String>, stored: &Option<String>| {
            wanted.clone().filter(|_| wanted == stored)
        };
        Ok(ClientPatch {
            email: written(&patch.email, &row.email),
            contact: written(&patch.contact, &row.contact),
            surname: written(&patch.surname, &row.surname),
        })
    }

    async fn assign_tier(&self, client_id: DbId) -> Result<(), StoreError> {
        let tier = ClientRepo::assign_tier(&self.pool, client_id)
            .await
            .map_err(|e| StoreError::new("assign_tier", e))?;
        tracing::debug!(client_id, tier_id = ?tier, "Tier recomputed");
        Ok(())
    }

    async fn find_request_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<ExistingRequest>, StoreError> {
        RequestRepo::find_by_external_id(&self.pool, external_id)
            .await
            .map(|row| {
                row.map(|r| ExistingRequest {
                    id: r.id,
                    client_id: r.client_id,
                })
            })
            .map_err(|e| StoreError::new("find_request_by_external_id", e))
    }

    async fn create_request(&self, request: &NewRequest) -> Result<RequestRecord, StoreError> {
        let (id, created) = RequestRepo::create_or_get(
            &self.pool,
            request.client_id,
            request.source.as_str(),
            &request.external_id,
            &request.payload,
            &request.notes,
        )
        .await
        .map_err(|e| StoreError::new("create_request", e))?;
        Ok(RequestRecord { id, created })
    }
}
