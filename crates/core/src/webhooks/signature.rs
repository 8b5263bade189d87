//! Webhook request verification.
//!
//! Calendly signs deliveries with
//! `Calendly-Webhook-Signature: t=<unix seconds>,v1=<hex hmac-sha256>` where
//! the MAC covers `"<t>.<raw body>"`. Google Forms deliveries carry a shared
//! token instead.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::types::Timestamp;

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed clock distance between the signature timestamp and now.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("Signature header is malformed")]
    Malformed,

    #[error("Signature does not match payload")]
    Mismatch,

    #[error("Signature timestamp is outside the allowed tolerance")]
    Expired,
}

/// Verify a Calendly signature header against the raw request body.
pub fn verify_calendly_signature(
    header: &str,
    body: &[u8],
    signing_key: &str,
    now: Timestamp,
) -> Result<(), SignatureError> {
    let mut timestamp = None;
    let mut signature = None;
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => signature = Some(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::Malformed)?;
    let signature = signature.ok_or(SignatureError::Malformed)?;
    let issued_at: i64 = timestamp.parse().map_err(|_| SignatureError::Malformed)?;
    let expected = hex::decode(signature).map_err(|_| SignatureError::Malformed)?;

    if (now.timestamp() - issued_at).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(SignatureError::Expired);
    }

    let mut mac = HmacSha256::new_from_slice(signing_key.as_bytes())
        .map_err(|_| SignatureError::Malformed)?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

/// Compare a provided shared token with the expected one without leaking
/// the mismatch position through timing.
pub fn verify_shared_token(provided: Option<&str>, expected: &str) -> bool {
    let Some(provided) = provided else {
        return false;
    };
    let a = Sha256::digest(provided.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const KEY: &str = "whsec_test_key";

    fn now() -> Timestamp {
        chrono::Utc.timestamp_opt(1_700_000_000, 0).single().unwrap()
    }

    fn sign(body: &[u8], key: &str, t: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(key.as_bytes()).unwrap();
        mac.update(format!("{t}.").as_bytes());
        mac.update(body);
        format!("t={t},v1={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn valid_signature_passes() {
        let body = br#"{"event":"invitee.created"}"#;
        let header = sign(body, KEY, 1_700_000_000);
        assert_eq!(verify_calendly_signature(&header, body, KEY, now()), Ok(()));
    }

    #[test]
    fn wrong_key_is_rejected() {
        let body = br#"{"event":"invitee.created"}"#;
        let header = sign(body, "other", 1_700_000_000);
        assert_eq!(
            verify_calendly_signature(&header, body, KEY, now()),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn modified_body_is_rejected() {
        let header = sign(b"{}", KEY, 1_700_000_000);
        assert_eq!(
            verify_calendly_signature(&header, b"{\"x\":1}", KEY, now()),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let body = b"{}";
        let header = sign(body, KEY, 1_700_000_000 - SIGNATURE_TOLERANCE_SECS - 1);
        assert_eq!(
            verify_calendly_signature(&header, body, KEY, now()),
            Err(SignatureError::Expired)
        );
    }

    #[test]
    fn malformed_headers_are_rejected() {
        for header in ["", "t=1700000000", "v1=abcd", "t=abc,v1=00", "t=1700000000,v1=zz"] {
            assert_eq!(
                verify_calendly_signature(header, b"{}", KEY, now()),
                Err(SignatureError::Malformed),
                "header {header:?}"
            );
        }
    }

    #[test]
    fn shared_token_comparison() {
        assert!(verify_shared_token(Some("s3cret"), "s3cret"));
        assert!(!verify_shared_token(Some("s3cret "), "s3cret"));
        assert!(!verify_shared_token(None, "s3cret"));
    }
}
