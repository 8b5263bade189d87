//! Webhook ingestion reconciler.
//!
//! Turns an inbound lead (booking or form submission) into a deduplicated
//! client plus a tracked request:
//!
//! 1. validate that a name is present
//! 2. short-circuit when the external dedup key is already recorded,
//!    answering with the request's owning client
//! 3. match an existing client by email (preferred) or phone, filling only
//!    its blank fields, or create a new untrusted client
//! 4. run tier assignment (failure is logged, not fatal)
//! 5. record the request under its external dedup key
//!
//! A blank email or phone that another client already holds is left empty
//! rather than failing the delivery.
//!
//! Persistence is reached through the [`IngestStore`] trait so the flow can
//! run against Postgres in production and an in-memory store in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Maximum number of log entries returned to the webhook caller.
pub const MAX_RETURNED_LOG_LINES: usize = 20;

// ---------------------------------------------------------------------------
// Lead source
// ---------------------------------------------------------------------------

/// External system a lead arrived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    Calendly,
    GoogleForms,
}

impl LeadSource {
    /// Tag stored in `requests.source`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Calendly => "calendly",
            Self::GoogleForms => "google_forms",
        }
    }
}

/// A lead parsed out of a source-specific webhook body.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundLead {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: LeadSource,
    /// Source-derived dedup key, e.g. `calendly_<invitee uuid>`.
    pub external_id: String,
    pub notes: String,
    /// The raw webhook body, stored verbatim on the request.
    pub payload: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Name splitting
// ---------------------------------------------------------------------------

/// A full name split into given name and surname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitName {
    pub first_name: String,
    pub surname: Option<String>,
}

/// Strategy for splitting a free-text full name.
pub trait NameSplitter: Send + Sync {
    fn split(&self, full_name: &str) -> SplitName;
}

/// First whitespace token is the given name, the remaining tokens (joined
/// by single spaces) are the surname.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstTokenSplitter;

impl NameSplitter for FirstTokenSplitter {
    fn split(&self, full_name: &str) -> SplitName {
        let mut tokens = full_name.split_whitespace();
        let first_name = tokens.next().unwrap_or_default().to_string();
        let rest: Vec<&str> = tokens.collect();
        SplitName {
            first_name,
            surname: (!rest.is_empty()).then(|| rest.join(" ")),
        }
    }
}

// ---------------------------------------------------------------------------
// Store records
// ---------------------------------------------------------------------------

/// The fields of a stored client that matching and merging need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingClient {
    pub id: DbId,
    pub email: Option<String>,
    pub contact: Option<String>,
    pub surname: Option<String>,
}

/// Values to write into a matched client's blank fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientPatch {
    pub email: Option<String>,
    pub contact: Option<String>,
    pub surname: Option<String>,
}

impl ClientPatch {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.contact.is_none() && self.surname.is_none()
    }

    /// Names of the fields this patch sets, for logging.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.email.is_some() {
            fields.push("email");
        }
        if self.contact.is_some() {
            fields.push("contact");
        }
        if self.surname.is_some() {
            fields.push("surname");
        }
        fields
    }

    /// Fields set here but not in `applied`.
    pub fn missing_from(&self, applied: &ClientPatch) -> ClientPatch {
        fn keep(wanted: &Option<String>, got: &Option<String>) -> Option<String> {
            match got {
                Some(_) => None,
                None => wanted.clone(),
            }
        }

        ClientPatch {
            email: keep(&self.email, &applied.email),
            contact: keep(&self.contact, &applied.contact),
            surname: keep(&self.surname, &applied.surname),
        }
    }
}

/// A client to insert when no match exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    pub name: String,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub contact: Option<String>,
    pub trusted: bool,
}

/// A request row to record for an ingested lead.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRequest {
    pub client_id: DbId,
    pub source: LeadSource,
    pub external_id: String,
    pub payload: serde_json::Value,
    pub notes: String,
}

/// Result of recording a request. `created` is false when a request with
/// the same external id already existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestRecord {
    pub id: DbId,
    pub created: bool,
}

/// A request already recorded under an external id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExistingRequest {
    pub id: DbId,
    pub client_id: DbId,
}

/// Failure reported by a store operation.
#[derive(Debug, thiserror::Error)]
#[error("{operation} failed: {message}")]
pub struct StoreError {
    pub operation: &'static str,
    pub message: String,
}

impl StoreError {
    pub fn new(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Self {
            operation,
            message: err.to_string(),
        }
    }
}

/// Persistence operations the reconciler depends on.
#[async_trait]
pub trait IngestStore: Send + Sync {
    async fn find_client_by_email(&self, email: &str)
        -> Result<Option<ExistingClient>, StoreError>;

    async fn find_client_by_phone(&self, phone: &str)
        -> Result<Option<ExistingClient>, StoreError>;

    /// Insert a client. Returns `None` when a uniqueness constraint on email
    /// or phone absorbed the insert (a concurrent writer got there first).
    async fn insert_client(&self, client: &NewClient) -> Result<Option<DbId>, StoreError>;

    /// Write the patch's values into fields that are still null. An email
    /// or phone already held by another client is skipped. Returns the
    /// fields actually written.
    async fn fill_client_blanks(&self, client_id: DbId, patch: &ClientPatch)
        -> Result<ClientPatch, StoreError>;

    /// Recompute and persist the client's tier.
    async fn assign_tier(&self, client_id: DbId) -> Result<(), StoreError>;

    async fn find_request_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<ExistingRequest>, StoreError>;

    async fn create_request(&self, request: &NewRequest) -> Result<RequestRecord, StoreError>;
}

// ---------------------------------------------------------------------------
// Outcome and errors
// ---------------------------------------------------------------------------

/// Successful ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub client_id: DbId,
    pub client_created: bool,
    pub request_id: DbId,
    pub request_created: bool,
    pub logs: Vec<String>,
}

/// Ingestion failure. Every variant carries the log trail collected so far.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Validation failed: {message}")]
    Validation { message: String, logs: Vec<String> },

    #[error("{source}")]
    Store {
        #[source]
        source: StoreError,
        logs: Vec<String>,
    },
}

impl IngestError {
    pub fn logs(&self) -> &[String] {
        match self {
            Self::Validation { logs, .. } | Self::Store { logs, .. } => logs,
        }
    }
}

// ---------------------------------------------------------------------------
// Process log
// ---------------------------------------------------------------------------

/// Log trail for one ingestion, mirrored to `tracing`.
#[derive(Debug, Default)]
pub struct ProcessLog {
    entries: Vec<String>,
}

impl ProcessLog {
    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(target: "bonusdesk::ingestion", "{message}");
        self.entries.push(format!("[info] {message}"));
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(target: "bonusdesk::ingestion", "{message}");
        self.entries.push(format!("[warn] {message}"));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(target: "bonusdesk::ingestion", "{message}");
        self.entries.push(format!("[error] {message}"));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The last `n` entries, oldest first.
    pub fn into_tail(mut self, n: usize) -> Vec<String> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.drain(..skip);
        self.entries
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Build an additive-only patch: a field is set only when the stored value
/// is null and the inbound value is present. Existing values always win.
pub fn merge_blank_fields(
    existing: &ExistingClient,
    email: Option<&str>,
    phone: Option<&str>,
    surname: Option<&str>,
) -> ClientPatch {
    fn fill(stored: &Option<String>, inbound: Option<&str>) -> Option<String> {
        match stored {
            Some(_) => None,
            None => inbound.map(str::to_string),
        }
    }

    ClientPatch {
        email: fill(&existing.email, email),
        contact: fill(&existing.contact, phone),
        surname: fill(&existing.surname, surname),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// Ingest one lead. See the module docs for the sequence of steps.
pub async fn reconcile_lead<S>(
    store: &S,
    splitter: &dyn NameSplitter,
    lead: InboundLead,
) -> Result<IngestOutcome, IngestError>
where
    S: IngestStore + ?Sized,
{
    let mut log = ProcessLog::default();
    log.info(format!(
        "Received {} lead {}",
        lead.source.as_str(),
        lead.external_id
    ));

    let Some(full_name) = non_blank(lead.full_name) else {
        log.error("Lead has no name, rejecting");
        return Err(IngestError::Validation {
            message: "name is required".to_string(),
            logs: log.into_tail(MAX_RETURNED_LOG_LINES),
        });
    };

    match store.find_request_by_external_id(&lead.external_id).await {
        Ok(Some(existing)) => {
            log.info(format!(
                "Request {} already recorded for {} under client {}, nothing to do",
                existing.id, lead.external_id, existing.client_id
            ));
            return Ok(IngestOutcome {
                client_id: existing.client_id,
                client_created: false,
                request_id: existing.id,
                request_created: false,
                logs: log.into_tail(MAX_RETURNED_LOG_LINES),
            });
        }
        Ok(None) => {}
        Err(source) => {
            log.error(format!("Request lookup failed: {source}"));
            return Err(IngestError::Store {
                source,
                logs: log.into_tail(MAX_RETURNED_LOG_LINES),
            });
        }
    }

    let name = splitter.split(&full_name);
    let email = non_blank(lead.email);
    let phone = non_blank(lead.phone);
    log.info(format!(
        "Parsed name '{}' / '{}', email: {}, phone: {}",
        name.first_name,
        name.surname.as_deref().unwrap_or(""),
        email.as_deref().unwrap_or("-"),
        phone.as_deref().unwrap_or("-"),
    ));

    let contact = LeadContact {
        name: &name,
        email: email.as_deref(),
        phone: phone.as_deref(),
    };

    let (client_id, client_created) = match resolve_client(store, &contact, &mut log).await {
        Ok(resolved) => resolved,
        Err(source) => {
            log.error(format!("Client resolution failed: {source}"));
            return Err(IngestError::Store {
                source,
                logs: log.into_tail(MAX_RETURNED_LOG_LINES),
            });
        }
    };

    match store.assign_tier(client_id).await {
        Ok(()) => log.info(format!("Tier assignment ran for client {client_id}")),
        Err(e) => log.warn(format!(
            "Tier assignment failed for client {client_id}, continuing: {e}"
        )),
    }

    let request = NewRequest {
        client_id,
        source: lead.source,
        external_id: lead.external_id,
        payload: lead.payload,
        notes: lead.notes,
    };

    let record = match store.create_request(&request).await {
        Ok(record) => record,
        Err(source) => {
            log.error(format!("Request creation failed: {source}"));
            return Err(IngestError::Store {
                source,
                logs: log.into_tail(MAX_RETURNED_LOG_LINES),
            });
        }
    };

    if record.created {
        log.info(format!("Created request {}", record.id));
    } else {
        log.info(format!(
            "Request {} already recorded for {}",
            record.id, request.external_id
        ));
    }

    Ok(IngestOutcome {
        client_id,
        client_created,
        request_id: record.id,
        request_created: record.created,
        logs: log.into_tail(MAX_RETURNED_LOG_LINES),
    })
}

struct LeadContact<'a> {
    name: &'a SplitName,
    email: Option<&'a str>,
    phone: Option<&'a str>,
}

async fn match_client<S>(
    store: &S,
    contact: &LeadContact<'_>,
    log: &mut ProcessLog,
) -> Result<Option<ExistingClient>, StoreError>
where
    S: IngestStore + ?Sized,
{
    if let Some(email) = contact.email {
        if let Some(client) = store.find_client_by_email(email).await? {
            log.info(format!("Matched client {} by email", client.id));
            return Ok(Some(client));
        }
    }
    if let Some(phone) = contact.phone {
        if let Some(client) = store.find_client_by_phone(phone).await? {
            log.info(format!("Matched client {} by phone", client.id));
            return Ok(Some(client));
        }
    }
    Ok(None)
}

async fn merge_into<S>(
    store: &S,
    existing: &ExistingClient,
    contact: &LeadContact<'_>,
    log: &mut ProcessLog,
) -> Result<(), StoreError>
where
    S: IngestStore + ?Sized,
{
    let patch = merge_blank_fields(
        existing,
        contact.email,
        contact.phone,
        contact.name.surname.as_deref(),
    );
    if patch.is_empty() {
        log.info(format!("Client {} already complete, nothing to fill", existing.id));
        return Ok(());
    }
    let applied = store.fill_client_blanks(existing.id, &patch).await?;
    if !applied.is_empty() {
        log.info(format!(
            "Filled blank fields on client {}: {}",
            existing.id,
            applied.field_names().join(", ")
        ));
    }
    let skipped = patch.missing_from(&applied);
    if !skipped.is_empty() {
        log.warn(format!(
            "Left blank on client {}, value belongs to another client: {}",
            existing.id,
            skipped.field_names().join(", ")
        ));
    }
    Ok(())
}

async fn resolve_client<S>(
    store: &S,
    contact: &LeadContact<'_>,
    log: &mut ProcessLog,
) -> Result<(DbId, bool), StoreError>
where
    S: IngestStore + ?Sized,
{
    if contact.email.is_none() && contact.phone.is_none() {
        log.info("No email or phone on lead, skipping client lookup");
    } else if let Some(existing) = match_client(store, contact, log).await? {
        merge_into(store, &existing, contact, log).await?;
        return Ok((existing.id, false));
    } else {
        log.info("No existing client matched");
    }

    let new_client = NewClient {
        name: contact.name.first_name.clone(),
        surname: contact.name.surname.clone(),
        email: contact.email.map(str::to_string),
        contact: contact.phone.map(str::to_string),
        trusted: false,
    };

    if let Some(id) = store.insert_client(&new_client).await? {
        log.info(format!("Created client {id}"));
        return Ok((id, true));
    }

    // A concurrent delivery inserted the same email/phone first.
    log.warn("Client insert hit a uniqueness conflict, re-matching");
    let existing = match_client(store, contact, log)
        .await?
        .ok_or_else(|| StoreError::new("insert_client", "conflicting client row not found"))?;
    merge_into(store, &existing, contact, log).await?;
    Ok((existing.id, false))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
