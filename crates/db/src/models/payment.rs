//! Partner payout ledger model and DTOs.

use bonusdesk_core::partners;
use bonusdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the append-only `partner_payments` ledger.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PartnerPayment {
    pub id: DbId,
    pub partner_id: DbId,
    pub amount: Option<f64>,
    pub paid_at: Timestamp,
    pub note: Option<String>,
    pub created_at: Timestamp,
}

impl PartnerPayment {
    pub fn to_split_input(&self) -> partners::Payment {
        partners::Payment {
            amount: self.amount,
            paid_at: Some(self.paid_at),
            note: self.note.clone(),
        }
    }
}

/// DTO for recording a payment. `paid_at` defaults to now.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePayment {
    pub amount: f64,
    pub paid_at: Option<Timestamp>,
    pub note: Option<String>,
}
