//! Partner entity model and DTOs.

use bonusdesk_core::partners;
use bonusdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `partners` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Partner {
    pub id: DbId,
    pub name: String,
    pub default_split_partner: f64,
    pub default_split_owner: f64,
    pub contact_info: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Partner {
    /// Split engine input for this partner.
    pub fn to_split_input(&self) -> partners::Partner {
        partners::Partner {
            id: self.id,
            name: self.name.clone(),
            default_split_partner: self.default_split_partner,
            default_split_owner: self.default_split_owner,
            contact_info: self.contact_info.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// DTO for creating a partner.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePartner {
    pub name: String,
    /// Defaults to 0.5 if omitted.
    pub default_split_partner: Option<f64>,
    /// Defaults to 0.5 if omitted.
    pub default_split_owner: Option<f64>,
    pub contact_info: Option<String>,
    pub notes: Option<String>,
}
