//! Client-app engagement model.

use bonusdesk_core::partners;
use bonusdesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `client_apps` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClientApp {
    pub id: DbId,
    pub client_id: DbId,
    pub app_id: DbId,
    pub status: String,
    pub profit_us: Option<f64>,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl ClientApp {
    pub fn to_split_input(&self) -> partners::Engagement {
        partners::Engagement {
            client_id: self.client_id,
            app_id: Some(self.app_id),
            status: self.status.clone(),
            profit_us: self.profit_us,
            created_at: Some(self.created_at),
            completed_at: self.completed_at,
        }
    }
}
