//! Shared response envelope types for API handlers.
//!
//! Management endpoints answer with a `{ "data": ... }` envelope. Webhook
//! endpoints use their own shapes, defined next to their handlers.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: partners }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
