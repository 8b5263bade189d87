//! HTTP-level integration tests for the lead webhooks.

mod common;

use axum::http::StatusCode;
use common::{body_json, post_json, post_raw};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use sqlx::PgPool;

const CALENDLY: &str = "/api/v1/webhooks/calendly";
const GOOGLE_FORMS: &str = "/api/v1/webhooks/google-forms";

fn calendly_body(invitee: &str, email: &str) -> serde_json::Value {
    json!({
        "event": "invitee.created",
        "payload": {
            "name": "Giulia Verdi",
            "email": email,
            "uri": format!("https://api.calendly.com/scheduled_events/EV/invitees/{invitee}"),
            "questions_and_answers": [
                {"question": "Telefono", "answer": "+39 347 000"}
            ],
            "scheduled_event": {"name": "Consulenza", "start_time": "2025-03-10T15:00:00Z"}
        }
    })
}

fn sign(body: &[u8], key: &str) -> String {
    let t = chrono::Utc::now().timestamp();
    let mut mac = Hmac::<Sha256>::new_from_slice(key.as_bytes()).unwrap();
    mac.update(format!("{t}.").as_bytes());
    mac.update(body);
    format!("t={t},v1={}", hex::encode(mac.finalize().into_bytes()))
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Calendly
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn calendly_creates_client_and_request(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, CALENDLY, calendly_body("INV-1", "giulia@example.com")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["clientCreated"], true);
    assert_eq!(json["requestCreated"], true);
    assert!(json["clientId"].is_number());
    assert!(json["requestId"].is_number());
    assert!(!json["logs"].as_array().unwrap().is_empty());

    let (name, surname, contact): (String, Option<String>, Option<String>) =
        sqlx::query_as("SELECT name, surname, contact FROM clients")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(name, "Giulia");
    assert_eq!(surname.as_deref(), Some("Verdi"));
    assert_eq!(contact.as_deref(), Some("+39 347 000"));

    let external_id: String = sqlx::query_scalar("SELECT external_id FROM requests")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(external_id, "calendly_INV-1");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn calendly_redelivery_is_idempotent(pool: PgPool) {
    let body = calendly_body("INV-1", "giulia@example.com");
    let first = body_json(post_json(common::build_test_app(pool.clone()), CALENDLY, body.clone()).await).await;
    let second = body_json(post_json(common::build_test_app(pool.clone()), CALENDLY, body).await).await;

    assert_eq!(second["clientCreated"], false);
    assert_eq!(second["requestCreated"], false);
    assert_eq!(second["requestId"], first["requestId"]);
    assert_eq!(second["clientId"], first["clientId"]);
    assert_eq!(count(&pool, "clients").await, 1);
    assert_eq!(count(&pool, "requests").await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn calendly_other_events_are_acknowledged(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool.clone()),
        CALENDLY,
        json!({"event": "invitee.canceled", "payload": {}}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ignored"], true);
    assert_eq!(json["event"], "invitee.canceled");
    assert_eq!(count(&pool, "requests").await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn calendly_without_name_is_400_with_logs(pool: PgPool) {
    let mut body = calendly_body("INV-2", "x@example.com");
    body["payload"]["name"] = json!("   ");

    let response = post_json(common::build_test_app(pool.clone()), CALENDLY, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].is_string());
    assert!(!json["logs"].as_array().unwrap().is_empty());
    assert_eq!(count(&pool, "clients").await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_json_is_400(pool: PgPool) {
    let response = post_raw(
        common::build_test_app(pool),
        CALENDLY,
        b"not json".to_vec(),
        &[],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid JSON body");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn calendly_signature_is_enforced_when_configured(pool: PgPool) {
    let key = "whsec_test";
    let mut config = common::test_config();
    config.calendly_signing_key = Some(key.to_string());
    let body = calendly_body("INV-3", "sig@example.com").to_string().into_bytes();

    let unsigned = post_raw(
        common::build_test_app_with(pool.clone(), config.clone()),
        CALENDLY,
        body.clone(),
        &[],
    )
    .await;
    assert_eq!(unsigned.status(), StatusCode::UNAUTHORIZED);

    let forged = sign(&body, "wrong-key");
    let response = post_raw(
        common::build_test_app_with(pool.clone(), config.clone()),
        CALENDLY,
        body.clone(),
        &[("calendly-webhook-signature", forged.as_str())],
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_json(response).await["logs"].is_array());

    let signature = sign(&body, key);
    let response = post_raw(
        common::build_test_app_with(pool.clone(), config),
        CALENDLY,
        body,
        &[("Calendly-Webhook-Signature", signature.as_str())],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(count(&pool, "requests").await, 1);
}

// ---------------------------------------------------------------------------
// Google Forms
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn google_forms_matches_existing_client_by_phone(pool: PgPool) {
    let existing: i64 = sqlx::query_scalar(
        "INSERT INTO clients (name, contact) VALUES ('Luca', '333 444') RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    let body = json!({
        "formId": "F1",
        "timestamp": "2025-05-01T09:30:00Z",
        "answers": {
            "Nome": "Luca",
            "Cognome": "Bruno",
            "Email": "luca@example.com",
            "Cellulare": "333 444"
        }
    });
    let response = post_json(common::build_test_app(pool.clone()), GOOGLE_FORMS, body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["clientId"], existing);
    assert_eq!(json["clientCreated"], false);

    let (email, surname): (Option<String>, Option<String>) =
        sqlx::query_as("SELECT email, surname FROM clients WHERE id = $1")
            .bind(existing)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(email.as_deref(), Some("luca@example.com"));
    assert_eq!(surname.as_deref(), Some("Bruno"));

    let source: String = sqlx::query_scalar("SELECT source FROM requests")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(source, "google_forms");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn google_forms_token_is_enforced_when_configured(pool: PgPool) {
    let mut config = common::test_config();
    config.google_forms_token = Some("s3cret".to_string());
    let body = json!({"formId": "F2", "timestamp": "t", "name": "Sara Gialli"})
        .to_string()
        .into_bytes();

    let response = post_raw(
        common::build_test_app_with(pool.clone(), config.clone()),
        GOOGLE_FORMS,
        body.clone(),
        &[("x-webhook-token", "nope")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_raw(
        common::build_test_app_with(pool.clone(), config),
        GOOGLE_FORMS,
        body,
        &[("x-webhook-token", "s3cret")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["clientCreated"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn google_forms_missing_form_id_is_400(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool),
        GOOGLE_FORMS,
        json!({"timestamp": "t", "name": "X"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["logs"].is_array());
}
