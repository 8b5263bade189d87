//! Client entity model.
//!
//! Clients are only created or filled in by webhook ingestion; there is no
//! general-purpose create/update DTO.

use bonusdesk_core::ingestion::ExistingClient;
use bonusdesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `clients` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Client {
    pub id: DbId,
    pub name: String,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub contact: Option<String>,
    pub trusted: bool,
    pub tier_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The subset of client columns used for dedup matching.
#[derive(Debug, Clone, FromRow)]
pub struct ClientContact {
    pub id: DbId,
    pub email: Option<String>,
    pub contact: Option<String>,
    pub surname: Option<String>,
}

impl From<ClientContact> for ExistingClient {
    fn from(row: ClientContact) -> Self {
        ExistingClient {
            id: row.id,
            email: row.email,
            contact: row.contact,
            surname: row.surname,
        }
    }
}
