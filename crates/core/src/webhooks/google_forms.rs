//! Google Forms submission parsing.
//!
//! The form's Apps Script trigger posts
//! `{ formId, timestamp, name?, email?, phone?, answers: { question: answer } }`.
//! Contact fields missing at the top level are looked up among the answers
//! by question label.

use serde::Deserialize;

use crate::error::CoreError;
use crate::ingestion::{InboundLead, LeadSource};
use crate::webhooks::{label_matches, present, EMAIL_KEYWORDS, PHONE_KEYWORDS};

/// Labels of a question holding the surname (checked before [`NAME_KEYWORDS`]).
pub const SURNAME_KEYWORDS: &[&str] = &["cognome", "surname", "last name"];

/// Labels of a question holding the (first or full) name.
pub const NAME_KEYWORDS: &[&str] = &["nome", "name"];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleFormSubmission {
    form_id: Option<String>,
    timestamp: Option<serde_json::Value>,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    /// Question order as sent by the form (`preserve_order` is enabled).
    #[serde(default)]
    answers: serde_json::Map<String, serde_json::Value>,
}

/// Parse a Google Forms webhook body into a lead.
pub fn parse_google_form(body: &serde_json::Value) -> Result<InboundLead, CoreError> {
    let submission: GoogleFormSubmission = serde_json::from_value(body.clone())
        .map_err(|e| CoreError::Validation(format!("Invalid Google Forms payload: {e}")))?;

    let form_id = present(submission.form_id.as_deref())
        .ok_or_else(|| CoreError::Validation("formId is required".into()))?;
    let timestamp = submission
        .timestamp
        .as_ref()
        .map(answer_text)
        .and_then(|t| present(Some(t.as_str())))
        .ok_or_else(|| CoreError::Validation("timestamp is required".into()))?;

    let answers: Vec<(&str, String)> = submission
        .answers
        .iter()
        .map(|(question, value)| (question.as_str(), answer_text(value)))
        .collect();

    let full_name = present(submission.name.as_deref()).or_else(|| name_from_answers(&answers));
    let email = present(submission.email.as_deref())
        .or_else(|| find_answer(&answers, |q| label_matches(q, EMAIL_KEYWORDS)));
    let phone = present(submission.phone.as_deref())
        .or_else(|| find_answer(&answers, |q| label_matches(q, PHONE_KEYWORDS)));

    Ok(InboundLead {
        full_name,
        email,
        phone,
        source: LeadSource::GoogleForms,
        external_id: format!("google_forms_{form_id}_{timestamp}"),
        notes: build_notes(&form_id, &answers),
        payload: body.clone(),
    })
}

/// Render an answer value as text. Checkbox answers arrive as arrays.
fn answer_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(answer_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn find_answer(answers: &[(&str, String)], matches: impl Fn(&str) -> bool) -> Option<String> {
    answers
        .iter()
        .find(|(question, answer)| matches(*question) && !answer.is_empty())
        .map(|(_, answer)| answer.clone())
}

fn is_surname_label(question: &str) -> bool {
    label_matches(question, SURNAME_KEYWORDS)
}

fn name_from_answers(answers: &[(&str, String)]) -> Option<String> {
    let name = find_answer(answers, |q| {
        !is_surname_label(q) && label_matches(q, NAME_KEYWORDS)
    });
    let surname = find_answer(answers, is_surname_label);

    match (name, surname) {
        (Some(name), Some(surname)) => Some(format!("{name} {surname}")),
        (name, surname) => name.or(surname),
    }
}

fn build_notes(form_id: &str, answers: &[(&str, String)]) -> String {
    let mut lines = vec![format!("Google Forms submission ({form_id})")];
    lines.extend(
        answers
            .iter()
            .filter(|(_, answer)| !answer.is_empty())
            .map(|(question, answer)| format!("{}: {answer}", question.trim())),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn top_level_fields_are_used_directly() {
        let body = json!({
            "formId": "F1",
            "timestamp": "2025-05-01T09:30:00Z",
            "name": "Sara Gialli",
            "email": "sara@example.com",
            "phone": "+39 320 111",
            "answers": {}
        });
        let lead = parse_google_form(&body).unwrap();
        assert_eq!(lead.full_name.as_deref(), Some("Sara Gialli"));
        assert_eq!(lead.email.as_deref(), Some("sara@example.com"));
        assert_eq!(lead.phone.as_deref(), Some("+39 320 111"));
        assert_eq!(lead.source, LeadSource::GoogleForms);
        assert_eq!(lead.external_id, "google_forms_F1_2025-05-01T09:30:00Z");
    }

    #[test]
    fn contact_fields_fall_back_to_answers() {
        let body = json!({
            "formId": "F2",
            "timestamp": 1714555800,
            "answers": {
                "Nome": "Luca",
                "Cognome": "Bruno",
                "Indirizzo email": "luca@example.com",
                "Cellulare": "333 444",
                "Servizi di interesse": ["Bonus A", "Bonus B"]
            }
        });
        let lead = parse_google_form(&body).unwrap();
        assert_eq!(lead.full_name.as_deref(), Some("Luca Bruno"));
        assert_eq!(lead.email.as_deref(), Some("luca@example.com"));
        assert_eq!(lead.phone.as_deref(), Some("333 444"));
        assert_eq!(lead.external_id, "google_forms_F2_1714555800");
        assert!(lead.notes.contains("Servizi di interesse: Bonus A, Bonus B"));
        assert!(lead.notes.starts_with("Google Forms submission (F2)"));
    }

    #[test]
    fn full_name_question_is_recognized() {
        let body = json!({
            "formId": "F3",
            "timestamp": "t1",
            "answers": {"Full name": "Elena Costa"}
        });
        let lead = parse_google_form(&body).unwrap();
        assert_eq!(lead.full_name.as_deref(), Some("Elena Costa"));
    }

    #[test]
    fn answers_keep_the_form_question_order() {
        let raw = br#"{
            "formId": "F5",
            "timestamp": "t3",
            "answers": {
                "Nome": "Luca",
                "Company name": "Acme",
                "Budget": "10k"
            }
        }"#;
        let body: serde_json::Value = serde_json::from_slice(raw).unwrap();
        let lead = parse_google_form(&body).unwrap();

        assert_eq!(lead.full_name.as_deref(), Some("Luca"));
        let lines: Vec<&str> = lead.notes.lines().skip(1).collect();
        assert_eq!(lines, vec!["Nome: Luca", "Company name: Acme", "Budget: 10k"]);
    }

    #[test]
    fn missing_name_is_left_to_the_reconciler() {
        let body = json!({"formId": "F4", "timestamp": "t2", "answers": {"Email": "x@y.z"}});
        let lead = parse_google_form(&body).unwrap();
        assert_eq!(lead.full_name, None);
        assert_eq!(lead.email.as_deref(), Some("x@y.z"));
    }

    #[test]
    fn form_id_and_timestamp_are_required() {
        assert_matches!(
            parse_google_form(&json!({"timestamp": "t"})),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            parse_google_form(&json!({"formId": "F", "timestamp": "  "})),
            Err(CoreError::Validation(_))
        );
    }
}
