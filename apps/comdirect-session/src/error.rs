//! Outcome and failure taxonomy for the session engine.
//!
//! Every public operation returns an [`Outcome`]. Expected failure modes
//! (auth rejection, no session, empty quote set, broker-side business errors)
//! are values, never panics. Each [`FailureKind`] carries a stable reason
//! string and a default [`Severity`] so callers can decide what is fatal.
//!
//! | Kind | Severity | Raised when |
//! |------|----------|-------------|
//! | `AUTH_FAILED` | Error | Password grant (step A) rejected |
//! | `UNAUTHORIZED` | Error | HTTP 401 |
//! | `SERVER_ERROR` | Critical | HTTP 500 |
//! | `INSUFFICIENT_FUNDS` | Error | HTTP 422, amount exceeds available cash |
//! | `NO_TRADABLE_INSTRUMENT` | Error | HTTP 422, instrument not tradable at venue |
//! | `UNSUPPORTED_ORDER_TYPE` | Error | HTTP 422, order type not offered |
//! | `UNPROCESSABLE_ENTITY` | Error | HTTP 422, any other domain key |
//! | `NO_ACTIVE_SESSION` | Error | Operation requires `Connected` |
//! | `NO_QUOTATION_AVAILABLE` | Warning | No venue produced a price |
//! | `UNKNOWN_TRANSPORT_ERROR` | Error | Any other HTTP status |
//! | `PROTOCOL_VIOLATION` | Critical | 2xx with a body/header shape we cannot use |
//! | `TRANSPORT_FAULT` | Critical | No HTTP status at all (network, TLS, timeout) |
//! | `INVALID_STATE` | Error | State-machine step called out of order |

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result of every engine operation.
pub type Outcome<T> = Result<T, Failure>;

/// Sub-kinds of an HTTP 422 response, keyed on the broker's domain error key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnprocessableKind {
    /// Order amount exceeds the available cash.
    InsufficientFunds,
    /// Instrument cannot be traded at the requested venue.
    NoTradableInstrument,
    /// Order type is not offered for this instrument/venue.
    UnsupportedOrderType,
    /// Any other domain error key.
    Generic,
}

impl UnprocessableKind {
    /// Domain error key for insufficient funds.
    pub const INSUFFICIENT_FUNDS_KEY: &'static str =
        "fehler-ausmachender-betrag-ist-hoeher-als-verf-betrag";
    /// Domain error key for an instrument without a tradable listing.
    pub const NO_TRADABLE_INSTRUMENT_KEY: &'static str = "fehler-kein-handelbares-instrument";
    /// Domain error key for an order type the venue does not accept.
    pub const UNSUPPORTED_ORDER_TYPE_KEY: &'static str = "fehler-ordertyp-nicht-unterstuetzt";

    /// Map a domain error key to its sub-kind.
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        match key {
            Self::INSUFFICIENT_FUNDS_KEY => Self::InsufficientFunds,
            Self::NO_TRADABLE_INSTRUMENT_KEY => Self::NoTradableInstrument,
            Self::UNSUPPORTED_ORDER_TYPE_KEY => Self::UnsupportedOrderType,
            _ => Self::Generic,
        }
    }
}

/// Severity attached to a failure, for the caller's logging and alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational.
    Info,
    /// Expected business outcome the caller should notice.
    Warning,
    /// Operation failed.
    Error,
    /// The engine or the remote side misbehaved.
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

/// Failure classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// Primary OAuth password grant was rejected.
    AuthFailed,
    /// HTTP 401.
    Unauthorized,
    /// HTTP 500.
    ServerError,
    /// HTTP 422 with a domain error key.
    UnprocessableEntity(UnprocessableKind),
    /// The operation requires a connected session.
    NoActiveSession,
    /// No eligible venue produced a price.
    NoQuotationAvailable,
    /// HTTP status outside the classified set.
    UnknownTransportError,
    /// Success status with a body or header we could not interpret.
    ProtocolViolation,
    /// The request produced no HTTP status.
    TransportFault,
    /// A state-machine step was called from the wrong state.
    InvalidState,
}

impl FailureKind {
    /// Stable reason string.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::AuthFailed => "AUTH_FAILED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::ServerError => "SERVER_ERROR",
            Self::UnprocessableEntity(UnprocessableKind::InsufficientFunds) => "INSUFFICIENT_FUNDS",
            Self::UnprocessableEntity(UnprocessableKind::NoTradableInstrument) => {
                "NO_TRADABLE_INSTRUMENT"
            }
            Self::UnprocessableEntity(UnprocessableKind::UnsupportedOrderType) => {
                "UNSUPPORTED_ORDER_TYPE"
            }
            Self::UnprocessableEntity(UnprocessableKind::Generic) => "UNPROCESSABLE_ENTITY",
            Self::NoActiveSession => "NO_ACTIVE_SESSION",
            Self::NoQuotationAvailable => "NO_QUOTATION_AVAILABLE",
            Self::UnknownTransportError => "UNKNOWN_TRANSPORT_ERROR",
            Self::ProtocolViolation => "PROTOCOL_VIOLATION",
            Self::TransportFault => "TRANSPORT_FAULT",
            Self::InvalidState => "INVALID_STATE",
        }
    }

    /// Default severity for this kind.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::NoQuotationAvailable => Severity::Warning,
            Self::ServerError | Self::ProtocolViolation | Self::TransportFault => {
                Severity::Critical
            }
            _ => Severity::Error,
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

/// Raw HTTP context behind a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Label of the request that failed (e.g. `session-status`).
    pub request: String,
    /// HTTP status, when one was received.
    pub status: Option<u16>,
    /// Raw response body.
    pub body: String,
}

/// A failed [`Outcome`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("[{severity}] {kind}: {message}")]
pub struct Failure {
    /// Classification.
    pub kind: FailureKind,
    /// Severity, defaulted from the kind.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// HTTP context, when the failure came from a response.
    pub diagnostic: Option<Diagnostic>,
}

impl Failure {
    /// Create a failure with the kind's default severity.
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        let severity = kind.severity();
        Self {
            kind,
            severity,
            message: message.into(),
            diagnostic: None,
        }
    }

    /// Attach HTTP context.
    #[must_use]
    pub fn with_diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostic = Some(diagnostic);
        self
    }

    /// Label the diagnostic with the request that produced it.
    #[must_use]
    pub fn for_request(mut self, request: &str) -> Self {
        match &mut self.diagnostic {
            Some(diagnostic) => diagnostic.request = request.to_string(),
            None => {
                self.diagnostic = Some(Diagnostic {
                    request: request.to_string(),
                    status: None,
                    body: String::new(),
                });
            }
        }
        self
    }

    /// The guard failure returned by every operation that needs `Connected`.
    #[must_use]
    pub fn no_active_session() -> Self {
        Self::new(
            FailureKind::NoActiveSession,
            "No active session; connect before calling this operation",
        )
    }

    /// A 2xx response whose content we cannot use.
    #[must_use]
    pub fn protocol_violation(message: impl Into<String>) -> Self {
        Self::new(FailureKind::ProtocolViolation, message)
    }

    /// HTTP status from the diagnostic, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.diagnostic.as_ref().and_then(|d| d.status)
    }
}
