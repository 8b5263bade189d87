//! Repository for the `client_apps` table (client engagements).

use bonusdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::engagement::ClientApp;

const COLUMNS: &str = "id, client_id, app_id, status, profit_us, created_at, completed_at";

/// Read access to client engagements.
pub struct ClientAppRepo;

impl ClientAppRepo {
    /// Engagements of every client assigned to the partner, in any status.
    ///
    /// Status filtering is left to the split engine.
    pub async fn list_for_partner(
        pool: &PgPool,
        partner_id: DbId,
    ) -> Result<Vec<ClientApp>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM client_apps \
             WHERE client_id IN ( \
                SELECT client_id FROM partner_assignments WHERE partner_id = $1 \
             ) \
             ORDER BY id"
        );
        sqlx::query_as::<_, ClientApp>(&query)
            .bind(partner_id)
            .fetch_all(pool)
            .await
    }
}
