pub mod health;
pub mod partners;
pub mod webhooks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /partners                                   list, create
/// /partners/split-preview                     summary from raw rows (POST)
/// /partners/{id}                              get
/// /partners/{id}/summary                      balance, breakdown, monthly series
/// /partners/{id}/assignments                  list, create
/// /partners/{id}/assignments/{assignment_id}  delete
/// /partners/{id}/payments                     list, create
/// /partners/{id}/payments/{payment_id}        delete
///
/// /webhooks/calendly                          Calendly invitee events (POST)
/// /webhooks/google-forms                      Google Forms submissions (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/partners", partners::router())
        .nest("/webhooks", webhooks::router())
}
