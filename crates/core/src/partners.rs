//! Partner revenue split engine.
//!
//! Pure functions that derive a partner's per-client profit breakdown,
//! overall balance, and monthly earnings series from already-fetched rows.
//! Nothing here performs I/O or raises errors: missing numbers count as
//! zero and missing relations count as absent. Every summary is recomputed
//! on read and never persisted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Engagement statuses whose profit counts toward partner payouts.
pub const CONTRIBUTING_STATUSES: &[&str] = &["completed", "paid"];

/// Display name used when an assignment carries no client name parts.
pub const UNKNOWN_CLIENT_NAME: &str = "Unknown";

/// Check whether an engagement status contributes to partner revenue.
pub fn is_contributing_status(status: &str) -> bool {
    CONTRIBUTING_STATUSES.contains(&status)
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// A partner and its default profit-split fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: DbId,
    pub name: String,
    pub default_split_partner: f64,
    pub default_split_owner: f64,
    #[serde(default)]
    pub contact_info: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A partner-to-client assignment with optional split overrides.
///
/// `client_name` is the display name already normalized at the fetch
/// boundary (see [`EmbeddedClient::resolve`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: DbId,
    pub partner_id: DbId,
    pub client_id: DbId,
    #[serde(default)]
    pub split_partner_override: Option<f64>,
    #[serde(default)]
    pub split_owner_override: Option<f64>,
    #[serde(default)]
    pub client_name: Option<String>,
}

/// A client's participation in an app offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Engagement {
    pub client_id: DbId,
    #[serde(default)]
    pub app_id: Option<DbId>,
    pub status: String,
    #[serde(default)]
    pub profit_us: Option<f64>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub completed_at: Option<Timestamp>,
}

impl Engagement {
    fn contributes_for(&self, client_id: DbId) -> bool {
        self.client_id == client_id && is_contributing_status(&self.status)
    }

    /// Date used for monthly bucketing: completion first, creation second.
    fn bucket_date(&self) -> Option<Timestamp> {
        self.completed_at.or(self.created_at)
    }
}

/// A ledger entry of money actually paid out to a partner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub paid_at: Option<Timestamp>,
    #[serde(default)]
    pub note: Option<String>,
}

// ---------------------------------------------------------------------------
// Embedded client normalization
// ---------------------------------------------------------------------------

/// Name parts of a client row nested inside an assignment payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClientName {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
}

/// A joined client relation as upstream collaborators may nest it: either
/// a single object or a list holding (at most) one object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EmbeddedClient {
    One(ClientName),
    Many(Vec<ClientName>),
}

impl EmbeddedClient {
    /// Collapse either shape into a single display name, or `None` if no
    /// name parts are present.
    pub fn resolve(&self) -> Option<String> {
        let client = match self {
            Self::One(client) => Some(client),
            Self::Many(clients) => clients.first(),
        };
        client.and_then(|c| display_name(c.name.as_deref(), c.surname.as_deref()))
    }
}

/// Join the non-empty name parts with a single space.
pub fn display_name(name: Option<&str>, surname: Option<&str>) -> Option<String> {
    let parts: Vec<&str> = [name, surname]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Split fractions in force for one assignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectiveSplit {
    pub partner: f64,
    pub owner: f64,
    pub is_overridden: bool,
}

/// Profit derived from one assigned client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnerClientBreakdown {
    pub assignment_id: DbId,
    pub client_id: DbId,
    pub client_name: String,
    pub total_profit: f64,
    pub split_partner: f64,
    pub split_owner: f64,
    pub partner_share: f64,
    pub owner_share: f64,
    pub is_overridden: bool,
}

/// Partner totals. Positive `balance` means the partner is owed money,
/// negative means the partner has been overpaid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PartnerBalance {
    pub total_profit: f64,
    pub partner_share: f64,
    pub owner_share: f64,
    pub total_paid: f64,
    pub balance: f64,
}

/// Partner earnings for one calendar month (`YYYY-MM`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    pub month: String,
    pub amount: f64,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Resolve the split for an assignment: each override wins over the
/// partner default independently. No normalization is applied, so the two
/// fractions may sum to anything.
pub fn effective_split(partner: &Partner, assignment: &Assignment) -> EffectiveSplit {
    EffectiveSplit {
        partner: assignment
            .split_partner_override
            .unwrap_or(partner.default_split_partner),
        owner: assignment
            .split_owner_override
            .unwrap_or(partner.default_split_owner),
        is_overridden: assignment.split_partner_override.is_some()
            || assignment.split_owner_override.is_some(),
    }
}

/// Keep only the assignments belonging to `partner_id`, in input order.
pub fn assignments_for_partner(partner_id: DbId, assignments: &[Assignment]) -> Vec<&Assignment> {
    assignments
        .iter()
        .filter(|a| a.partner_id == partner_id)
        .collect()
}

/// Build one breakdown row per assignment, preserving assignment order.
///
/// `engagements` may contain rows for any client; each row only sums the
/// contributing engagements of its own client. A client assigned twice
/// yields two rows, each counting the full profit.
pub fn build_partner_breakdown(
    partner: &Partner,
    assignments: &[Assignment],
    engagements: &[Engagement],
) -> Vec<PartnerClientBreakdown> {
    assignments
        .iter()
        .map(|assignment| {
            let split = effective_split(partner, assignment);

            let total_profit: f64 = engagements
                .iter()
                .filter(|e| e.contributes_for(assignment.client_id))
                .map(|e| e.profit_us.unwrap_or(0.0))
                .sum();

            PartnerClientBreakdown {
                assignment_id: assignment.id,
                client_id: assignment.client_id,
                client_name: assignment
                    .client_name
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_CLIENT_NAME.to_string()),
                total_profit,
                split_partner: split.partner,
                split_owner: split.owner,
                partner_share: total_profit * split.partner,
                owner_share: total_profit * split.owner,
                is_overridden: split.is_overridden,
            }
        })
        .collect()
}

/// Reduce an existing breakdown and the payment ledger into totals.
pub fn balance_from_breakdown(
    breakdown: &[PartnerClientBreakdown],
    payments: &[Payment],
) -> PartnerBalance {
    let total_profit: f64 = breakdown.iter().map(|b| b.total_profit).sum();
    let partner_share: f64 = breakdown.iter().map(|b| b.partner_share).sum();
    let owner_share: f64 = breakdown.iter().map(|b| b.owner_share).sum();
    let total_paid: f64 = payments.iter().map(|p| p.amount.unwrap_or(0.0)).sum();

    PartnerBalance {
        total_profit,
        partner_share,
        owner_share,
        total_paid,
        balance: partner_share - total_paid,
    }
}

/// Compute a partner's totals and outstanding balance.
pub fn calculate_partner_balance(
    partner: &Partner,
    assignments: &[Assignment],
    engagements: &[Engagement],
    payments: &[Payment],
) -> PartnerBalance {
    let breakdown = build_partner_breakdown(partner, assignments, engagements);
    balance_from_breakdown(&breakdown, payments)
}

/// Month bucket key (`YYYY-MM`) for a timestamp.
pub fn month_key(ts: &Timestamp) -> String {
    ts.format("%Y-%m").to_string()
}

/// Build the partner's earnings per month, ascending, without gap filling.
///
/// Each contributing engagement adds `profit_us * split_partner` of its
/// breakdown row to the month of its completion (or creation) date.
/// Engagements with neither date are skipped.
pub fn build_monthly_series(
    breakdown: &[PartnerClientBreakdown],
    engagements: &[Engagement],
) -> Vec<MonthlyPoint> {
    let mut by_month: BTreeMap<String, f64> = BTreeMap::new();

    for row in breakdown {
        for engagement in engagements.iter().filter(|e| e.contributes_for(row.client_id)) {
            let Some(date) = engagement.bucket_date() else {
                continue;
            };
            *by_month.entry(month_key(&date)).or_insert(0.0) +=
                engagement.profit_us.unwrap_or(0.0) * row.split_partner;
        }
    }

    by_month
        .into_iter()
        .map(|(month, amount)| MonthlyPoint { month, amount })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
