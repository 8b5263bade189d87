//! Handlers for the `/partners` resource.
//!
//! Summaries are recomputed from freshly fetched rows on every request.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bonusdesk_core::error::CoreError;
use bonusdesk_core::partners::{
    self, assignments_for_partner, balance_from_breakdown, build_monthly_series,
    build_partner_breakdown, EmbeddedClient, MonthlyPoint, PartnerBalance,
    PartnerClientBreakdown,
};
use bonusdesk_core::split_validation::validate_split_override;
use bonusdesk_core::types::DbId;
use bonusdesk_db::models::assignment::{CreateAssignment, PartnerAssignment};
use bonusdesk_db::models::partner::{CreatePartner, Partner};
use bonusdesk_db::models::payment::{CreatePayment, PartnerPayment};
use bonusdesk_db::repositories::{AssignmentRepo, ClientAppRepo, PartnerRepo, PaymentRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Everything the partner dashboard needs in one payload.
#[derive(Debug, Serialize)]
pub struct PartnerSummary<P: Serialize> {
    pub partner: P,
    pub balance: PartnerBalance,
    pub breakdown: Vec<PartnerClientBreakdown>,
    pub monthly: Vec<MonthlyPoint>,
}

/// An assignment row as an upstream collaborator nests it, with the joined
/// client either as an object or a one-element list.
#[derive(Debug, Deserialize)]
pub struct PreviewAssignment {
    pub id: DbId,
    pub partner_id: DbId,
    pub client_id: DbId,
    #[serde(default)]
    pub split_partner_override: Option<f64>,
    #[serde(default)]
    pub split_owner_override: Option<f64>,
    #[serde(default)]
    pub client: Option<EmbeddedClient>,
}

impl PreviewAssignment {
    fn into_split_input(self) -> partners::Assignment {
        partners::Assignment {
            id: self.id,
            partner_id: self.partner_id,
            client_id: self.client_id,
            split_partner_override: self.split_partner_override,
            split_owner_override: self.split_owner_override,
            client_name: self.client.as_ref().and_then(EmbeddedClient::resolve),
        }
    }
}

/// Body of `POST /partners/split-preview`.
#[derive(Debug, Deserialize)]
pub struct SplitPreviewRequest {
    pub partner: partners::Partner,
    #[serde(default)]
    pub assignments: Vec<PreviewAssignment>,
    #[serde(default)]
    pub engagements: Vec<partners::Engagement>,
    #[serde(default)]
    pub payments: Vec<partners::Payment>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn ensure_partner(state: &AppState, id: DbId) -> AppResult<Partner> {
    PartnerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Partner",
            id,
        }))
}

fn summarize<P: Serialize>(
    partner: P,
    split_partner: &partners::Partner,
    assignments: &[partners::Assignment],
    engagements: &[partners::Engagement],
    payments: &[partners::Payment],
) -> PartnerSummary<P> {
    let breakdown = build_partner_breakdown(split_partner, assignments, engagements);
    let balance = balance_from_breakdown(&breakdown, payments);
    let monthly = build_monthly_series(&breakdown, engagements);
    PartnerSummary {
        partner,
        balance,
        breakdown,
        monthly,
    }
}

// ---------------------------------------------------------------------------
// Partners
// ---------------------------------------------------------------------------

/// GET /api/v1/partners
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Partner>>>> {
    let partners = PartnerRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: partners }))
}

/// POST /api/v1/partners
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreatePartner>,
) -> AppResult<(StatusCode, Json<DataResponse<Partner>>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "name must not be empty".into(),
        )));
    }
    validate_split_override(input.default_split_partner, "default_split_partner")?;
    validate_split_override(input.default_split_owner, "default_split_owner")?;

    let partner = PartnerRepo::create(&state.pool, &input).await?;
    tracing::info!(partner_id = partner.id, name = %partner.name, "Partner created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: partner })))
}

/// GET /api/v1/partners/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Partner>>> {
    let partner = ensure_partner(&state, id).await?;
    Ok(Json(DataResponse { data: partner }))
}

/// GET /api/v1/partners/{id}/summary
pub async fn summary(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PartnerSummary<Partner>>>> {
    let partner = ensure_partner(&state, id).await?;

    let assignments: Vec<_> = AssignmentRepo::list_for_partner(&state.pool, id)
        .await?
        .iter()
        .map(PartnerAssignment::to_split_input)
        .collect();
    let engagements: Vec<_> = ClientAppRepo::list_for_partner(&state.pool, id)
        .await?
        .iter()
        .map(|e| e.to_split_input())
        .collect();
    let payments: Vec<_> = PaymentRepo::list_for_partner(&state.pool, id)
        .await?
        .iter()
        .map(PartnerPayment::to_split_input)
        .collect();

    let split_partner = partner.to_split_input();
    let summary = summarize(partner, &split_partner, &assignments, &engagements, &payments);
    tracing::debug!(
        partner_id = id,
        assignments = assignments.len(),
        engagements = engagements.len(),
        balance = summary.balance.balance,
        "Partner summary computed"
    );
    Ok(Json(DataResponse { data: summary }))
}

/// POST /api/v1/partners/split-preview
///
/// Runs the split engine over rows supplied in the body. Assignments of
/// other partners are ignored.
pub async fn split_preview(
    Json(input): Json<SplitPreviewRequest>,
) -> AppResult<Json<DataResponse<PartnerSummary<partners::Partner>>>> {
    let SplitPreviewRequest {
        partner,
        assignments,
        engagements,
        payments,
    } = input;

    let all: Vec<partners::Assignment> = assignments
        .into_iter()
        .map(PreviewAssignment::into_split_input)
        .collect();
    let own: Vec<partners::Assignment> = assignments_for_partner(partner.id, &all)
        .into_iter()
        .cloned()
        .collect();

    let summary = summarize(partner.clone(), &partner, &own, &engagements, &payments);
    Ok(Json(DataResponse { data: summary }))
}

// ---------------------------------------------------------------------------
// Assignments
// ---------------------------------------------------------------------------

/// GET /api/v1/partners/{id}/assignments
pub async fn list_assignments(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<PartnerAssignment>>>> {
    ensure_partner(&state, id).await?;
    let assignments = AssignmentRepo::list_for_partner(&state.pool, id).await?;
    Ok(Json(DataResponse { data: assignments }))
}

/// POST /api/v1/partners/{id}/assignments
pub async fn create_assignment(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateAssignment>,
) -> AppResult<(StatusCode, Json<DataResponse<PartnerAssignment>>)> {
    ensure_partner(&state, id).await?;
    validate_split_override(input.split_partner_override, "split_partner_override")?;
    validate_split_override(input.split_owner_override, "split_owner_override")?;

    let assignment = AssignmentRepo::create(&state.pool, id, &input).await?;
    tracing::info!(
        partner_id = id,
        assignment_id = assignment.id,
        client_id = assignment.client_id,
        "Client assigned to partner"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: assignment })))
}

/// DELETE /api/v1/partners/{id}/assignments/{assignment_id}
pub async fn delete_assignment(
    State(state): State<AppState>,
    Path((id, assignment_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if AssignmentRepo::delete(&state.pool, id, assignment_id).await? {
        tracing::info!(partner_id = id, assignment_id, "Assignment removed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Assignment",
            id: assignment_id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

/// GET /api/v1/partners/{id}/payments
pub async fn list_payments(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<PartnerPayment>>>> {
    ensure_partner(&state, id).await?;
    let payments = PaymentRepo::list_for_partner(&state.pool, id).await?;
    Ok(Json(DataResponse { data: payments }))
}

/// POST /api/v1/partners/{id}/payments
pub async fn create_payment(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreatePayment>,
) -> AppResult<(StatusCode, Json<DataResponse<PartnerPayment>>)> {
    ensure_partner(&state, id).await?;
    if !input.amount.is_finite() {
        return Err(AppError::Core(CoreError::Validation(
            "amount must be a finite number".into(),
        )));
    }

    let payment = PaymentRepo::create(&state.pool, id, &input).await?;
    tracing::info!(
        partner_id = id,
        payment_id = payment.id,
        amount = input.amount,
        "Partner payment recorded"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: payment })))
}

/// DELETE /api/v1/partners/{id}/payments/{payment_id}
pub async fn delete_payment(
    State(state): State<AppState>,
    Path((id, payment_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if PaymentRepo::delete(&state.pool, id, payment_id).await? {
        tracing::info!(partner_id = id, payment_id, "Partner payment deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Payment",
            id: payment_id,
        }))
    }
}
