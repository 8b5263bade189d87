//! Repository for the `partner_payments` ledger.

use bonusdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::payment::{CreatePayment, PartnerPayment};

const COLUMNS: &str = "id, partner_id, amount, paid_at, note, created_at";

/// Append and remove payout ledger entries.
pub struct PaymentRepo;

impl PaymentRepo {
    /// Payments to one partner, most recent first.
    pub async fn list_for_partner(
        pool: &PgPool,
        partner_id: DbId,
    ) -> Result<Vec<PartnerPayment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM partner_payments \
             WHERE partner_id = $1 ORDER BY paid_at DESC, id DESC"
        );
        sqlx::query_as::<_, PartnerPayment>(&query)
            .bind(partner_id)
            .fetch_all(pool)
            .await
    }

    pub async fn create(
        pool: &PgPool,
        partner_id: DbId,
        input: &CreatePayment,
    ) -> Result<PartnerPayment, sqlx::Error> {
        let query = format!(
            "INSERT INTO partner_payments (partner_id, amount, paid_at, note) \
             VALUES ($1, $2, COALESCE($3, now()), $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PartnerPayment>(&query)
            .bind(partner_id)
            .bind(input.amount)
            .bind(input.paid_at)
            .bind(&input.note)
            .fetch_one(pool)
            .await
    }

    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, partner_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM partner_payments WHERE id = $1 AND partner_id = $2")
            .bind(id)
            .bind(partner_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
