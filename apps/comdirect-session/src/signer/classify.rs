//! Response classification.
//!
//! Total over status codes, in priority order:
//!
//! 1. `500` -> `ServerError` (body not parsed)
//! 2. `401` -> `Unauthorized`
//! 3. `422` -> `UnprocessableEntity`, sub-kind from the domain error key
//! 4. `200`/`201`/`204` -> success; empty body becomes `{}`
//! 5. anything else -> `UnknownTransportError`

use serde_json::{Value, json};

use crate::error::{Diagnostic, Failure, FailureKind, Outcome, UnprocessableKind};

/// Classify a status code and raw body into an [`Outcome`].
pub fn classify(status: u16, raw_body: &str) -> Outcome<Value> {
    let diagnostic = || Diagnostic {
        request: String::new(),
        status: Some(status),
        body: raw_body.to_string(),
    };

    match status {
        500 => Err(
            Failure::new(FailureKind::ServerError, "Internal server error from the API")
                .with_diagnostic(diagnostic()),
        ),
        401 => {
            let message = parse_body(raw_body)
                .as_ref()
                .and_then(error_message)
                .unwrap_or_else(|| "Unauthorized".to_string());
            Err(Failure::new(FailureKind::Unauthorized, message).with_diagnostic(diagnostic()))
        }
        422 => {
            let body = parse_body(raw_body);
            let sub_kind = body
                .as_ref()
                .and_then(error_key)
                .map_or(UnprocessableKind::Generic, |key| {
                    UnprocessableKind::from_key(&key)
                });
            let message = match sub_kind {
                UnprocessableKind::Generic => raw_body.to_string(),
                _ => body
                    .as_ref()
                    .and_then(error_message)
                    .unwrap_or_else(|| raw_body.to_string()),
            };
            Err(
                Failure::new(FailureKind::UnprocessableEntity(sub_kind), message)
                    .with_diagnostic(diagnostic()),
            )
        }
        200 | 201 | 204 => {
            if raw_body.trim().is_empty() {
                return Ok(json!({}));
            }
            serde_json::from_str(raw_body).map_err(|e| {
                Failure::protocol_violation(format!("success response is not JSON: {e}"))
                    .with_diagnostic(diagnostic())
            })
        }
        _ => {
            let detail = parse_body(raw_body)
                .as_ref()
                .and_then(error_message)
                .unwrap_or_else(|| raw_body.to_string());
            Err(Failure::new(
                FailureKind::UnknownTransportError,
                format!("Unexpected HTTP status {status}: {detail}"),
            )
            .with_diagnostic(diagnostic()))
        }
    }
}

fn parse_body(raw_body: &str) -> Option<Value> {
    serde_json::from_str(raw_body).ok()
}

/// First entry of `messages`, which the API sends as an array or an object.
fn first_message(body: &Value) -> Option<&Value> {
    match body.get("messages")? {
        Value::Array(items) => items.first(),
        obj @ Value::Object(_) => Some(obj),
        _ => None,
    }
}

fn error_key(body: &Value) -> Option<String> {
    first_message(body)?
        .get("key")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Human-readable message from an error body.
///
/// Looks at `messages[0].message`, then the OAuth `error_description` /
/// `error` fields, then a bare `message`.
#[must_use]
pub fn error_message(body: &Value) -> Option<String> {
    let text = |v: Option<&Value>| v.and_then(Value::as_str).map(str::to_string);
    text(first_message(body).and_then(|m| m.get("message")))
        .or_else(|| text(body.get("error_description")))
        .or_else(|| text(body.get("error")))
        .or_else(|| text(body.get("message")))
}
