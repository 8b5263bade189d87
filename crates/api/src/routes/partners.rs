//! Route definitions for the `/partners` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::partners;
use crate::state::AppState;

/// Routes mounted at `/partners`.
///
/// ```text
/// GET    /                                  -> list
/// POST   /                                  -> create
/// POST   /split-preview                     -> split_preview
/// GET    /{id}                              -> get_by_id
/// GET    /{id}/summary                      -> summary
/// GET    /{id}/assignments                  -> list_assignments
/// POST   /{id}/assignments                  -> create_assignment
/// DELETE /{id}/assignments/{assignment_id}  -> delete_assignment
/// GET    /{id}/payments                     -> list_payments
/// POST   /{id}/payments                     -> create_payment
/// DELETE /{id}/payments/{payment_id}        -> delete_payment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(partners::list).post(partners::create))
        .route("/split-preview", post(partners::split_preview))
        .route("/{id}", get(partners::get_by_id))
        .route("/{id}/summary", get(partners::summary))
        .route(
            "/{id}/assignments",
            get(partners::list_assignments).post(partners::create_assignment),
        )
        .route(
            "/{id}/assignments/{assignment_id}",
            delete(partners::delete_assignment),
        )
        .route(
            "/{id}/payments",
            get(partners::list_payments).post(partners::create_payment),
        )
        .route("/{id}/payments/{payment_id}", delete(partners::delete_payment))
}
