//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts, where the API creates rows
//! - A conversion into the matching `bonusdesk_core` input type

pub mod assignment;
pub mod client;
pub mod engagement;
pub mod partner;
pub mod payment;
pub mod request;
