// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signature verification for Clerk webhooks (Svix signing scheme).
//!
//! Each delivery carries three headers:
//! - `svix-id`: unique message id
//! - `svix-timestamp`: Unix seconds when the message was sent
//! - `svix-signature`: space-separated `v1,<base64 HMAC-SHA256>` entries
//!
//! The signed content is `"{id}.{timestamp}.{raw body}"`, keyed with the
//! base64-decoded part of the `whsec_...` secret.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed clock difference between sender and us, in seconds.
pub const TIMESTAMP_TOLERANCE_SECS: i64 = 5 * 60;

const SECRET_PREFIX: &str = "whsec_";
const SIGNATURE_VERSION: &str = "v1";

/// Header values of one delivery.
#[derive(Debug, Clone, Copy)]
pub struct SvixHeaders<'a> {
    pub id: &'a str,
    pub timestamp: &'a str,
    pub signature: &'a str,
}

/// Reasons a webhook fails verification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    /// The configured secret is unusable. This is a server problem.
    #[error("webhook secret is not valid base64")]
    InvalidSecret,

    #[error("invalid svix-timestamp header")]
    InvalidTimestamp,

    #[error("message timestamp too old")]
    TimestampTooOld,

    #[error("message timestamp too new")]
    TimestampTooNew,

    #[error("no matching signature found")]
    NoMatchingSignature,
}

/// Verifier keyed with one signing secret.
#[derive(Clone)]
pub struct WebhookVerifier {
    key: Vec<u8>,
}

impl WebhookVerifier {
    /// Create a verifier from a `whsec_...` secret (prefix optional).
    pub fn new(secret: &str) -> Result<Self, VerifyError> {
        let encoded = secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret);
        let key = BASE64
            .decode(encoded)
            .map_err(|_| VerifyError::InvalidSecret)?;

        Ok(Self { key })
    }

    /// Verify a delivery as of `now` (Unix seconds).
    pub fn verify_at(
        &self,
        payload: &[u8],
        headers: &SvixHeaders<'_>,
        now: i64,
    ) -> Result<(), VerifyError> {
        let timestamp: i64 = headers
            .timestamp
            .trim()
            .parse()
            .map_err(|_| VerifyError::InvalidTimestamp)?;

        if now.saturating_sub(timestamp) > TIMESTAMP_TOLERANCE_SECS {
            return Err(VerifyError::TimestampTooOld);
        }
        if timestamp.saturating_sub(now) > TIMESTAMP_TOLERANCE_SECS {
            return Err(VerifyError::TimestampTooNew);
        }

        let expected = self.sign(headers.id, timestamp, payload)?;

        let matched = headers
            .signature
            .split(' ')
            .filter_map(|entry| entry.split_once(','))
            .filter(|(version, _)| *version == SIGNATURE_VERSION)
            .filter_map(|(_, signature)| BASE64.decode(signature).ok())
            .any(|signature| bool::from(signature.as_slice().ct_eq(expected.as_slice())));

        if matched {
            Ok(())
        } else {
            Err(VerifyError::NoMatchingSignature)
        }
    }

    /// Compute the raw HMAC for a message.
    pub fn sign(&self, id: &str, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, VerifyError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).map_err(|_| VerifyError::InvalidSecret)?;
        mac.update(format!("{id}.{timestamp}.").as_bytes());
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Render a `svix-signature` header value for a message.
    pub fn signature_header(
        &self,
        id: &str,
        timestamp: i64,
        payload: &[u8],
    ) -> Result<String, VerifyError> {
        let signature = self.sign(id, timestamp, payload)?;
        Ok(format!("{SIGNATURE_VERSION},{}", BASE64.encode(signature)))
    }
}
