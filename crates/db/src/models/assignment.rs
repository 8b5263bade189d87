//! Partner-to-client assignment model and DTOs.

use bonusdesk_core::partners::{self, display_name};
use bonusdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from `partner_assignments` joined with its client's name parts.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PartnerAssignment {
    pub id: DbId,
    pub partner_id: DbId,
    pub client_id: DbId,
    pub split_partner_override: Option<f64>,
    pub split_owner_override: Option<f64>,
    pub client_name: Option<String>,
    pub client_surname: Option<String>,
    pub created_at: Timestamp,
}

impl PartnerAssignment {
    /// Split engine input, with the joined name parts collapsed into one
    /// display name.
    pub fn to_split_input(&self) -> partners::Assignment {
        partners::Assignment {
            id: self.id,
            partner_id: self.partner_id,
            client_id: self.client_id,
            split_partner_override: self.split_partner_override,
            split_owner_override: self.split_owner_override,
            client_name: display_name(
                self.client_name.as_deref(),
                self.client_surname.as_deref(),
            ),
        }
    }
}

/// DTO for assigning a client to a partner.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssignment {
    pub client_id: DbId,
    pub split_partner_override: Option<f64>,
    pub split_owner_override: Option<f64>,
}
