//! Source-specific webhook payload parsing and request verification.
//!
//! Each parser turns a raw JSON body into an [`InboundLead`](crate::ingestion::InboundLead)
//! ready for [`reconcile_lead`](crate::ingestion::reconcile_lead).

pub mod calendly;
pub mod google_forms;
pub mod signature;

/// Question/field keywords that identify a phone number answer.
pub const PHONE_KEYWORDS: &[&str] = &["phone", "telefono", "cellulare", "whatsapp"];

/// Question/field keywords that identify an email answer.
pub const EMAIL_KEYWORDS: &[&str] = &["email", "e-mail", "mail"];

/// Case-insensitive check whether `label` contains any of `keywords`.
pub fn label_matches(label: &str, keywords: &[&str]) -> bool {
    let label = label.to_lowercase();
    keywords.iter().any(|k| label.contains(k))
}

/// Trimmed, non-empty copy of an optional string.
pub(crate) fn present(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
