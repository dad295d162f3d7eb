//! Values the signer reads: tokens, correlation ids and TAN challenges.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Failure, Outcome};

/// Number of digits in a request id.
pub const REQUEST_ID_WIDTH: usize = 9;

/// OAuth access/refresh token pair.
///
/// Replaced wholesale by every successful token exchange.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Bearer token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
}

impl TokenPair {
    /// Parse a token endpoint response.
    pub fn from_response(body: &Value) -> Outcome<Self> {
        let field = |name: &str| {
            body.get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .ok_or_else(|| {
                    Failure::protocol_violation(format!("token response lacks '{name}'"))
                })
        };
        Ok(Self {
            access_token: field("access_token")?,
            refresh_token: field("refresh_token")?,
        })
    }
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Session and request ids sent in `x-http-request-info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationContext {
    session_id: String,
    request_id: String,
}

impl CorrelationContext {
    /// Fresh context: random session id, time-derived request id.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            request_id: current_request_id(),
        }
    }

    /// Context with fixed ids.
    #[must_use]
    pub fn with_ids(session_id: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            request_id: request_id.into(),
        }
    }

    /// Session id, stable for the whole login attempt.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Current request id.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Draw a new request id, keeping the session id.
    pub fn refresh_request_id(&mut self) {
        self.request_id = current_request_id();
    }

    /// Value of the `x-http-request-info` header.
    #[must_use]
    pub fn header_value(&self) -> String {
        // Values are JSON string literals so ids cannot break the object.
        format!(
            r#"{{"clientRequestId":{{"sessionId":{},"requestId":{}}}}}"#,
            Value::from(self.session_id.as_str()),
            Value::from(self.request_id.as_str())
        )
    }
}

fn current_request_id() -> String {
    request_id_from_millis(Utc::now().timestamp_millis())
}

/// Last [`REQUEST_ID_WIDTH`] digits of a millisecond timestamp, zero-padded.
#[must_use]
pub fn request_id_from_millis(millis: i64) -> String {
    let digits = millis.unsigned_abs().to_string();
    let tail = &digits[digits.len().saturating_sub(REQUEST_ID_WIDTH)..];
    format!("{tail:0>width$}", width = REQUEST_ID_WIDTH)
}

/// A TAN challenge issued in the `x-once-authentication-info` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// Challenge id echoed back when answering.
    pub id: String,
    /// Second-factor type chosen by the server (e.g. `P_TAN_PUSH`).
    pub challenge_type: String,
    /// Full decoded header payload.
    pub authentication_info: Value,
}

impl Challenge {
    /// Response header carrying the challenge.
    pub const HEADER: &'static str = "x-once-authentication-info";

    /// Parse the JSON header value.
    pub fn from_header(raw: &str) -> Outcome<Self> {
        let info: Value = serde_json::from_str(raw).map_err(|e| {
            Failure::protocol_violation(format!("challenge header is not JSON: {e}"))
        })?;
        let id = info
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| Failure::protocol_violation("challenge header lacks 'id'"))?
            .to_string();
        let challenge_type = info
            .get("typ")
            .and_then(Value::as_str)
            .ok_or_else(|| Failure::protocol_violation("challenge header lacks 'typ'"))?
            .to_string();
        Ok(Self {
            id,
            challenge_type,
            authentication_info: info,
        })
    }
}
