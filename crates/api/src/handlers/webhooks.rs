//! Handlers for inbound lead webhooks.
//!
//! Each handler verifies the delivery (when a secret is configured), parses
//! the source payload into an [`InboundLead`] and hands it to
//! [`reconcile_lead`]. Responses always carry the tail of the processing
//! log so failed deliveries can be diagnosed from the sender's dashboard.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use bonusdesk_core::error::CoreError;
use bonusdesk_core::ingestion::{
    reconcile_lead, InboundLead, IngestOutcome, ProcessLog, MAX_RETURNED_LOG_LINES,
};
use bonusdesk_core::types::DbId;
use bonusdesk_core::webhooks::calendly::{parse_calendly, CalendlyEvent};
use bonusdesk_core::webhooks::google_forms::parse_google_form;
use bonusdesk_core::webhooks::signature::{verify_calendly_signature, verify_shared_token};
use bonusdesk_db::ingest_store::PgIngestStore;
use serde::Serialize;

use crate::error::WebhookError;
use crate::state::AppState;

/// Header carrying Calendly's `t=...,v1=...` signature.
pub const CALENDLY_SIGNATURE_HEADER: &str = "calendly-webhook-signature";

/// Header carrying the Google Forms shared token.
pub const WEBHOOK_TOKEN_HEADER: &str = "x-webhook-token";

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAccepted {
    pub success: bool,
    pub client_id: DbId,
    pub client_created: bool,
    pub request_id: DbId,
    pub request_created: bool,
    pub logs: Vec<String>,
}

impl From<IngestOutcome> for WebhookAccepted {
    fn from(outcome: IngestOutcome) -> Self {
        Self {
            success: true,
            client_id: outcome.client_id,
            client_created: outcome.client_created,
            request_id: outcome.request_id,
            request_created: outcome.request_created,
            logs: outcome.logs,
        }
    }
}

/// Acknowledgement for deliveries that carry no lead.
#[derive(Debug, Serialize)]
pub struct WebhookIgnored {
    pub success: bool,
    pub ignored: bool,
    pub event: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum WebhookReply {
    Accepted(WebhookAccepted),
    Ignored(WebhookIgnored),
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn reject(log: ProcessLog, status: StatusCode, message: impl Into<String>) -> WebhookError {
    WebhookError::new(status, message, log.into_tail(MAX_RETURNED_LOG_LINES))
}

fn parse_body(body: &Bytes, log: &mut ProcessLog) -> Option<serde_json::Value> {
    match serde_json::from_slice(body) {
        Ok(value) => Some(value),
        Err(e) => {
            log.error(format!("Body is not valid JSON: {e}"));
            None
        }
    }
}

fn validation_message(err: CoreError) -> String {
    match err {
        CoreError::Validation(msg) => msg,
        other => other.to_string(),
    }
}

async fn ingest(state: &AppState, lead: InboundLead) -> Result<Json<WebhookReply>, WebhookError> {
    let store = PgIngestStore::new(state.pool.clone());
    let source = lead.source.as_str();
    let outcome = reconcile_lead(&store, state.name_splitter.as_ref(), lead).await?;

    tracing::info!(
        source,
        client_id = outcome.client_id,
        client_created = outcome.client_created,
        request_id = outcome.request_id,
        request_created = outcome.request_created,
        "Webhook lead ingested"
    );
    Ok(Json(WebhookReply::Accepted(outcome.into())))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/webhooks/calendly
pub async fn calendly(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookReply>, WebhookError> {
    let mut log = ProcessLog::default();

    if let Some(key) = state.config.calendly_signing_key.as_deref() {
        let Some(header) = headers
            .get(CALENDLY_SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
        else {
            log.error("Missing Calendly signature header");
            return Err(reject(log, StatusCode::UNAUTHORIZED, "Missing signature"));
        };
        if let Err(e) = verify_calendly_signature(header, &body, key, chrono::Utc::now()) {
            log.error(format!("Signature verification failed: {e}"));
            return Err(reject(log, StatusCode::UNAUTHORIZED, "Invalid signature"));
        }
        log.info("Calendly signature verified");
    }

    let Some(value) = parse_body(&body, &mut log) else {
        return Err(reject(log, StatusCode::BAD_REQUEST, "Invalid JSON body"));
    };

    match parse_calendly(&value) {
        Ok(CalendlyEvent::Lead(lead)) => ingest(&state, lead).await,
        Ok(CalendlyEvent::Ignored { event }) => {
            tracing::info!(event = %event, "Ignoring Calendly event");
            Ok(Json(WebhookReply::Ignored(WebhookIgnored {
                success: true,
                ignored: true,
                event,
            })))
        }
        Err(e) => {
            let message = validation_message(e);
            log.error(format!("Calendly payload rejected: {message}"));
            Err(reject(log, StatusCode::BAD_REQUEST, message))
        }
    }
}

/// POST /api/v1/webhooks/google-forms
pub async fn google_forms(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookReply>, WebhookError> {
    let mut log = ProcessLog::default();

    if let Some(expected) = state.config.google_forms_token.as_deref() {
        let provided = headers
            .get(WEBHOOK_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());
        if !verify_shared_token(provided, expected) {
            log.error("Webhook token missing or wrong");
            return Err(reject(log, StatusCode::UNAUTHORIZED, "Invalid webhook token"));
        }
    }

    let Some(value) = parse_body(&body, &mut log) else {
        return Err(reject(log, StatusCode::BAD_REQUEST, "Invalid JSON body"));
    };

    match parse_google_form(&value) {
        Ok(lead) => ingest(&state, lead).await,
        Err(e) => {
            let message = validation_message(e);
            log.error(format!("Google Forms payload rejected: {message}"));
            Err(reject(log, StatusCode::BAD_REQUEST, message))
        }
    }
}
