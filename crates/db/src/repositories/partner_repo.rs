//! Repository for the `partners` table.

use bonusdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::partner::{CreatePartner, Partner};

const COLUMNS: &str = "\
    id, name, default_split_partner, default_split_owner, contact_info, notes, \
    created_at, updated_at";

/// Provides CRUD operations for partners.
pub struct PartnerRepo;

impl PartnerRepo {
    /// List all partners ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Partner>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM partners ORDER BY name, id");
        sqlx::query_as::<_, Partner>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Partner>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM partners WHERE id = $1");
        sqlx::query_as::<_, Partner>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a partner. Omitted default splits fall back to 0.5 each.
    pub async fn create(pool: &PgPool, input: &CreatePartner) -> Result<Partner, sqlx::Error> {
        let query = format!(
            "INSERT INTO partners \
                (name, default_split_partner, default_split_owner, contact_info, notes) \
             VALUES ($1, COALESCE($2, 0.5), COALESCE($3, 0.5), $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Partner>(&query)
            .bind(&input.name)
            .bind(input.default_split_partner)
            .bind(input.default_split_owner)
            .bind(&input.contact_info)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }
}
