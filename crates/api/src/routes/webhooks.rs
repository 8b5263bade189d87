//! Route definitions for inbound lead webhooks.

use axum::routing::post;
use axum::Router;

use crate::handlers::webhooks;
use crate::state::AppState;

/// Routes mounted at `/webhooks`.
///
/// ```text
/// POST /calendly      -> calendly
/// POST /google-forms  -> google_forms
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/calendly", post(webhooks::calendly))
        .route("/google-forms", post(webhooks::google_forms))
}
