//! Repository for the `partner_assignments` table.
//!
//! Rows are always returned joined with the assigned client's name parts so
//! the split engine can label each breakdown entry.

use bonusdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::assignment::{CreateAssignment, PartnerAssignment};

const JOINED_COLUMNS: &str = "\
    pa.id, pa.partner_id, pa.client_id, pa.split_partner_override, \
    pa.split_owner_override, c.name AS client_name, c.surname AS client_surname, \
    pa.created_at";

/// Provides CRUD operations for partner assignments.
pub struct AssignmentRepo;

impl AssignmentRepo {
    /// All assignments of one partner, oldest first.
    pub async fn list_for_partner(
        pool: &PgPool,
        partner_id: DbId,
    ) -> Result<Vec<PartnerAssignment>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} \
             FROM partner_assignments pa \
             LEFT JOIN clients c ON c.id = pa.client_id \
             WHERE pa.partner_id = $1 \
             ORDER BY pa.id"
        );
        sqlx::query_as::<_, PartnerAssignment>(&query)
            .bind(partner_id)
            .fetch_all(pool)
            .await
    }

    /// Assign a client to a partner. Duplicate (partner, client) pairs are
    /// accepted as separate rows.
    pub async fn create(
        pool: &PgPool,
        partner_id: DbId,
        input: &CreateAssignment,
    ) -> Result<PartnerAssignment, sqlx::Error> {
        let query = format!(
            "WITH pa AS ( \
                INSERT INTO partner_assignments \
                    (partner_id, client_id, split_partner_override, split_owner_override) \
                VALUES ($1, $2, $3, $4) \
                RETURNING * \
             ) \
             SELECT {JOINED_COLUMNS} FROM pa LEFT JOIN clients c ON c.id = pa.client_id"
        );
        sqlx::query_as::<_, PartnerAssignment>(&query)
            .bind(partner_id)
            .bind(input.client_id)
            .bind(input.split_partner_override)
            .bind(input.split_owner_override)
            .fetch_one(pool)
            .await
    }

    /// Delete an assignment belonging to the given partner. Returns `true`
    /// if a row was removed.
    pub async fn delete(pool: &PgPool, partner_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM partner_assignments WHERE id = $1 AND partner_id = $2")
                .bind(id)
                .bind(partner_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
