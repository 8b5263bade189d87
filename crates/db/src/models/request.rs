//! Inbound lead request model.

use bonusdesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Request {
    pub id: DbId,
    pub client_id: DbId,
    pub source: String,
    pub external_id: String,
    pub payload: serde_json::Value,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
}
