//! Repository for the `requests` table.

use bonusdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::request::Request;

const COLUMNS: &str = "\
    id, client_id, source, external_id, payload, notes, status, created_at";

/// Provides idempotent insertion and lookup of inbound lead requests.
pub struct RequestRepo;

impl RequestRepo {
    /// Insert a request keyed by `external_id`, or return the id of the row
    /// already holding that key.
    ///
    /// The boolean is `true` when this call inserted the row.
    pub async fn create_or_get(
        pool: &PgPool,
        client_id: DbId,
        source: &str,
        external_id: &str,
        payload: &serde_json::Value,
        notes: &str,
    ) -> Result<(DbId, bool), sqlx::Error> {
        let inserted = sqlx::query_scalar::<_, DbId>(
            "INSERT INTO requests (client_id, source, external_id, payload, notes) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (external_id) DO NOTHING \
             RETURNING id",
        )
        .bind(client_id)
        .bind(source)
        .bind(external_id)
        .bind(payload)
        .bind(notes)
        .fetch_optional(pool)
        .await?;

        if let Some(id) = inserted {
            return Ok((id, true));
        }

        let existing =
            sqlx::query_scalar::<_, DbId>("SELECT id FROM requests WHERE external_id = $1")
                .bind(external_id)
                .fetch_one(pool)
                .await?;
        Ok((existing, false))
    }

    pub async fn find_by_external_id(
        pool: &PgPool,
        external_id: &str,
    ) -> Result<Option<Request>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM requests WHERE external_id = $1");
        sqlx::query_as::<_, Request>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }
}
