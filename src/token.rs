//! Session token codec
//!
//! Decodes the claims segment of a compact `header.payload.signature` token
//! and answers expiry questions locally. The signature is never checked; the
//! server remains the authority on whether a token is accepted.

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::DecodeError;

/// Decoded token payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Expiry, epoch seconds. Fractional values are truncated toward the past.
    #[serde(deserialize_with = "numeric_date")]
    pub exp: i64,
    /// Informational; a value of the wrong type is dropped.
    #[serde(default, deserialize_with = "lenient_numeric_date")]
    pub iat: Option<i64>,
    #[serde(default, deserialize_with = "lenient_subject")]
    pub sub: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Decode the claims carried in the second segment of `token`.
pub fn decode(token: &str) -> Result<Claims, DecodeError> {
    let mut segments = token.split('.');
    let _header = segments.next();
    let payload = segments
        .next()
        .ok_or_else(|| DecodeError::MalformedToken("expected at least two segments".into()))?;

    let bytes = decode_segment(payload)?;

    serde_json::from_slice(&bytes)
        .map_err(|e| DecodeError::MalformedToken(format!("invalid claims payload: {}", e)))
}

/// Inclusive toward expiry: a token whose `exp` equals `now` is expired.
pub fn is_expired(claims: &Claims, now: i64) -> bool {
    claims.exp <= now
}

fn epoch_seconds(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|secs| secs.is_finite())
            .map(|secs| secs.floor() as i64)
    })
}

fn numeric_date<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    epoch_seconds(&value)
        .ok_or_else(|| D::Error::custom(format!("expected a numeric date, got {}", value)))
}

fn lenient_numeric_date<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(epoch_seconds(&Value::deserialize(deserializer)?))
}

fn lenient_subject<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(sub) => Some(sub),
        Value::Number(sub) => Some(sub.to_string()),
        _ => None,
    })
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, DecodeError> {
    let trimmed = segment.trim_end_matches('=');
    URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| STANDARD_NO_PAD.decode(trimmed))
        .map_err(|e| DecodeError::MalformedToken(format!("invalid base64 payload: {}", e)))
}
