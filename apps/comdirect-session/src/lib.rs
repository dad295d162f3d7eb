// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements,
        clippy::significant_drop_tightening
    )
)]

//! comdirect Session Engine
//!
//! Protocol engine for the comdirect brokerage REST API: OAuth login with a
//! session TAN, signed correlated requests, typed account and depot reads,
//! and best-venue order placement.
//!
//! # Components (leaf first)
//!
//! - `signer`: per-request headers and response classification
//! - `transport`: `reqwest` client feeding responses to the classifier
//! - `session`: login state machine, TAN approval gate, connected reads
//! - `mapper`: JSON payloads to tabular records
//! - `trading`: venue quote survey and order placement
//!
//! Ambient pieces: `config` (YAML loader with env interpolation),
//! `telemetry` (console `tracing` subscriber), `error` (the `Outcome` type).
//!
//! # Example
//!
//! ```rust,ignore
//! use comdirect_session::{DelayApproval, SessionProtocol, config::load_config};
//!
//! let config = load_config(None)?;
//! let approval = DelayApproval::from_config(&config.approval);
//! let mut session = SessionProtocol::new(config)?;
//! session.connect(&approval).await?;
//! let balances = session.account_balances().await?;
//! session.revoke().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Modules
// =============================================================================

/// Configuration loading and validation.
pub mod config;

/// Outcome and failure taxonomy.
pub mod error;

/// Account payload mapping.
pub mod mapper;

/// Login state machine and connected reads.
pub mod session;

/// Header construction and response classification.
pub mod signer;

/// Logging setup.
pub mod telemetry;

/// Quotes and order placement.
pub mod trading;

/// HTTP transport.
pub mod transport;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, Credentials, EndpointTable, SessionConfig, load_config};
pub use error::{Diagnostic, Failure, FailureKind, Outcome, Severity, UnprocessableKind};
pub use mapper::{
    AccountBalanceRecord, AggregatedPositionRecord, Amount, DepotPosition, DepotRecord,
    InstrumentPositionRecord, OrderBook, OrderRecord,
};
pub use session::{
    DelayApproval, DepotHandle, PendingLogin, PreApproved, SessionProtocol, SessionState,
    StdinApproval, TanApproval,
};
pub use signer::{Challenge, CorrelationContext, HeaderFlavor, TokenPair};
pub use trading::{
    OrderPlacement, OrderRequest, OrderSide, OrderType, QuoteAndOrderEngine, ValidityType,
    VenueQuote,
};
