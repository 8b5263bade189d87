//! Calendly `invitee.created` webhook parsing.

use serde::Deserialize;

use crate::error::CoreError;
use crate::ingestion::{InboundLead, LeadSource};
use crate::webhooks::{label_matches, present, PHONE_KEYWORDS};

/// The only Calendly event type that produces a lead.
pub const INVITEE_CREATED: &str = "invitee.created";

#[derive(Debug, Clone, Deserialize)]
struct CalendlyWebhook {
    event: String,
    #[serde(default)]
    payload: CalendlyInvitee,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CalendlyInvitee {
    name: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    text_reminder_number: Option<String>,
    uri: Option<String>,
    #[serde(default)]
    questions_and_answers: Vec<QuestionAnswer>,
    scheduled_event: Option<ScheduledEvent>,
}

#[derive(Debug, Clone, Deserialize)]
struct QuestionAnswer {
    question: String,
    #[serde(default)]
    answer: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ScheduledEvent {
    name: Option<String>,
    start_time: Option<String>,
}

/// What a Calendly delivery turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum CalendlyEvent {
    Lead(InboundLead),
    /// Any event type other than [`INVITEE_CREATED`]; acknowledged, not ingested.
    Ignored { event: String },
}

/// Parse a Calendly webhook body.
pub fn parse_calendly(body: &serde_json::Value) -> Result<CalendlyEvent, CoreError> {
    let hook: CalendlyWebhook = serde_json::from_value(body.clone())
        .map_err(|e| CoreError::Validation(format!("Invalid Calendly payload: {e}")))?;

    if hook.event != INVITEE_CREATED {
        return Ok(CalendlyEvent::Ignored { event: hook.event });
    }

    let invitee = hook.payload;
    let invitee_uuid = invitee
        .uri
        .as_deref()
        .and_then(invitee_uuid_from_uri)
        .ok_or_else(|| CoreError::Validation("Calendly invitee uri is missing".into()))?;

    let full_name = present(invitee.name.as_deref()).or_else(|| {
        let parts: Vec<String> = [invitee.first_name.as_deref(), invitee.last_name.as_deref()]
            .into_iter()
            .filter_map(present)
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    });

    let phone = present(invitee.text_reminder_number.as_deref()).or_else(|| {
        invitee
            .questions_and_answers
            .iter()
            .find(|qa| label_matches(&qa.question, PHONE_KEYWORDS))
            .and_then(|qa| present(qa.answer.as_deref()))
    });

    Ok(CalendlyEvent::Lead(InboundLead {
        full_name,
        email: present(invitee.email.as_deref()),
        phone,
        source: LeadSource::Calendly,
        external_id: format!("calendly_{invitee_uuid}"),
        notes: build_notes(&invitee),
        payload: body.clone(),
    }))
}

/// Last non-empty path segment of an invitee URI.
fn invitee_uuid_from_uri(uri: &str) -> Option<&str> {
    uri.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty() && !s.contains(':'))
}

fn build_notes(invitee: &CalendlyInvitee) -> String {
    let mut lines = Vec::new();
    if let Some(event) = &invitee.scheduled_event {
        lines.push(format!(
            "Calendly booking: {}",
            event.name.as_deref().unwrap_or("(unnamed event)")
        ));
        if let Some(start) = &event.start_time {
            lines.push(format!("Start: {start}"));
        }
    } else {
        lines.push("Calendly booking".to_string());
    }
    for qa in &invitee.questions_and_answers {
        if let Some(answer) = present(qa.answer.as_deref()) {
            lines.push(format!("{}: {answer}", qa.question.trim()));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn invitee_body() -> serde_json::Value {
        json!({
            "event": "invitee.created",
            "payload": {
                "name": "Giulia Verdi",
                "email": "giulia@example.com",
                "text_reminder_number": null,
                "uri": "https://api.calendly.com/scheduled_events/EV1/invitees/INV-123",
                "questions_and_answers": [
                    {"question": "Numero di telefono", "answer": "+39 347 000"},
                    {"question": "Come ci hai conosciuto?", "answer": "Instagram"}
                ],
                "scheduled_event": {
                    "name": "Consulenza bonus",
                    "start_time": "2025-03-10T15:00:00.000000Z"
                }
            }
        })
    }

    fn lead(body: &serde_json::Value) -> InboundLead {
        match parse_calendly(body).unwrap() {
            CalendlyEvent::Lead(lead) => lead,
            other => panic!("expected lead, got {other:?}"),
        }
    }

    #[test]
    fn parses_invitee_created() {
        let body = invitee_body();
        let lead = lead(&body);
        assert_eq!(lead.full_name.as_deref(), Some("Giulia Verdi"));
        assert_eq!(lead.email.as_deref(), Some("giulia@example.com"));
        assert_eq!(lead.phone.as_deref(), Some("+39 347 000"));
        assert_eq!(lead.source, LeadSource::Calendly);
        assert_eq!(lead.external_id, "calendly_INV-123");
        assert_eq!(lead.payload, body);
    }

    #[test]
    fn notes_include_event_and_answers() {
        let lead = lead(&invitee_body());
        assert!(lead.notes.contains("Calendly booking: Consulenza bonus"));
        assert!(lead.notes.contains("Start: 2025-03-10T15:00:00.000000Z"));
        assert!(lead.notes.contains("Come ci hai conosciuto?: Instagram"));
    }

    #[test]
    fn reminder_number_wins_over_answers() {
        let mut body = invitee_body();
        body["payload"]["text_reminder_number"] = json!("+1 555 0100");
        assert_eq!(lead(&body).phone.as_deref(), Some("+1 555 0100"));
    }

    #[test]
    fn falls_back_to_first_and_last_name() {
        let mut body = invitee_body();
        body["payload"]["name"] = json!(null);
        body["payload"]["first_name"] = json!("Paolo");
        body["payload"]["last_name"] = json!("Neri");
        assert_eq!(lead(&body).full_name.as_deref(), Some("Paolo Neri"));
    }

    #[test]
    fn missing_name_is_left_to_the_reconciler() {
        let mut body = invitee_body();
        body["payload"]["name"] = json!("");
        assert_eq!(lead(&body).full_name, None);
    }

    #[test]
    fn other_events_are_ignored() {
        let body = json!({"event": "invitee.canceled", "payload": {}});
        assert_eq!(
            parse_calendly(&body).unwrap(),
            CalendlyEvent::Ignored {
                event: "invitee.canceled".to_string()
            }
        );
    }

    #[test]
    fn missing_uri_is_rejected() {
        let mut body = invitee_body();
        body["payload"]["uri"] = json!(null);
        assert_matches!(parse_calendly(&body), Err(CoreError::Validation(_)));
    }

    #[test]
    fn malformed_body_is_rejected() {
        assert_matches!(
            parse_calendly(&json!({"payload": {}})),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn uuid_ignores_trailing_slash() {
        assert_eq!(
            invitee_uuid_from_uri("https://api.calendly.com/invitees/ABC/"),
            Some("ABC")
        );
        assert_eq!(invitee_uuid_from_uri("https:"), None);
    }
}
