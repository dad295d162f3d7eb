//! Outbound header construction.

use serde_json::json;
use thiserror::Error;

use super::context::{Challenge, CorrelationContext, TokenPair};
use crate::error::{Failure, FailureKind, Severity};

/// `Accept` header.
pub const ACCEPT: &str = "Accept";
/// `Authorization` header.
pub const AUTHORIZATION: &str = "Authorization";
/// `Content-Type` header.
pub const CONTENT_TYPE: &str = "Content-Type";
/// Correlation header.
pub const REQUEST_INFO: &str = "x-http-request-info";
/// Challenge reference header.
pub const AUTHENTICATION_INFO: &str = "x-once-authentication-info";
/// Challenge answer header.
pub const AUTHENTICATION: &str = "x-once-authentication";

/// Authentication marker for orders authorized without an interactive TAN.
pub const TAN_FREE_MARKER: &str = "TAN_FREI";

const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

/// Header layouts for authenticated API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderFlavor {
    /// Bearer token + correlation header.
    Standard,
    /// Standard + challenge reference and an empty answer (session TAN activation).
    SessionTan,
    /// Standard + challenge reference and the TAN-free marker (order placement).
    TanOrder,
}

impl HeaderFlavor {
    /// Whether this flavor references a challenge.
    #[must_use]
    pub const fn needs_challenge(&self) -> bool {
        matches!(self, Self::SessionTan | Self::TanOrder)
    }
}

/// Errors raised while building headers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    /// A challenge-bearing flavor was requested without a challenge.
    #[error("{0:?} headers require a challenge")]
    MissingChallenge(HeaderFlavor),
}

impl From<SignerError> for Failure {
    fn from(err: SignerError) -> Self {
        let mut failure = Self::new(FailureKind::InvalidState, err.to_string());
        failure.severity = Severity::Critical;
        failure
    }
}

/// Ordered header name/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet(Vec<(&'static str, String)>);

impl HeaderSet {
    fn push(&mut self, name: &'static str, value: impl Into<String>) {
        self.0.push((name, value.into()));
    }

    /// Value for a header name (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over name/value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(n, v)| (*n, v.as_str()))
    }

    /// Number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Build headers for an authenticated JSON call.
///
/// `SessionTan` and `TanOrder` need a challenge; asking for them without
/// one fails before anything is sent.
pub fn build_headers(
    flavor: HeaderFlavor,
    tokens: &TokenPair,
    correlation: &CorrelationContext,
    challenge: Option<&Challenge>,
) -> Result<HeaderSet, SignerError> {
    let challenge = match (flavor.needs_challenge(), challenge) {
        (true, None) => return Err(SignerError::MissingChallenge(flavor)),
        (true, Some(c)) => Some(c),
        (false, _) => None,
    };

    let mut headers = HeaderSet::default();
    headers.push(ACCEPT, JSON);
    headers.push(AUTHORIZATION, format!("Bearer {}", tokens.access_token));
    headers.push(REQUEST_INFO, correlation.header_value());
    headers.push(CONTENT_TYPE, JSON);

    if let Some(challenge) = challenge {
        headers.push(AUTHENTICATION_INFO, json!({ "id": challenge.id }).to_string());
        let answer = match flavor {
            HeaderFlavor::TanOrder => TAN_FREE_MARKER,
            _ => "",
        };
        headers.push(AUTHENTICATION, answer);
    }

    Ok(headers)
}

/// Headers for form-encoded OAuth calls (token exchange, revocation).
#[must_use]
pub fn form_headers(bearer: Option<&str>) -> HeaderSet {
    let mut headers = HeaderSet::default();
    headers.push(CONTENT_TYPE, FORM);
    headers.push(ACCEPT, JSON);
    if let Some(token) = bearer {
        headers.push(AUTHORIZATION, format!("Bearer {token}"));
    }
    headers
}
