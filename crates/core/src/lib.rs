//! Domain logic for the BonusDesk operations backend.
//!
//! Everything here is free of database access: the partner revenue split
//! engine, the webhook ingestion reconciler (behind the [`ingestion::IngestStore`]
//! seam), source payload parsing, and signature verification.

pub mod error;
pub mod ingestion;
pub mod partners;
pub mod split_validation;
pub mod types;
pub mod webhooks;
