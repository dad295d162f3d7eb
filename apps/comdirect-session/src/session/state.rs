//! Session state and the split-mode snapshot.

use serde::{Deserialize, Serialize};

use crate::signer::{Challenge, CorrelationContext, TokenPair};

// =============================================================================
// Public state
// =============================================================================

/// Observable login state.
///
/// ```text
/// Unauthenticated -A-> TokenAcquired -B-> Identified -C-> ChallengeIssued
///     -D-> ChallengeActivated -E-> Connected -revoke-> Revoked
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionState {
    /// No token yet.
    #[default]
    Unauthenticated,
    /// Password grant succeeded.
    TokenAcquired,
    /// Session identifier known.
    Identified,
    /// Server issued a TAN challenge; waiting for the operator.
    ChallengeIssued,
    /// Session TAN activated.
    ChallengeActivated,
    /// Secondary token obtained; reads and trading allowed.
    Connected,
    /// Token revoked.
    Revoked,
}

impl SessionState {
    /// Whether read and trading operations are allowed.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Stable name for logs and messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "Unauthenticated",
            Self::TokenAcquired => "TokenAcquired",
            Self::Identified => "Identified",
            Self::ChallengeIssued => "ChallengeIssued",
            Self::ChallengeActivated => "ChallengeActivated",
            Self::Connected => "Connected",
            Self::Revoked => "Revoked",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Split-mode snapshot
// =============================================================================

/// Login paused at the TAN approval gate.
///
/// Produced by `begin_login`, consumed by `SessionProtocol::resume`. Carries
/// live tokens: store it as a secret. Resuming the same snapshot twice is
/// not detected here; the server rejects the second activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingLogin {
    pub(crate) tokens: TokenPair,
    pub(crate) correlation: CorrelationContext,
    pub(crate) identifier: String,
    pub(crate) challenge: Challenge,
}

impl PendingLogin {
    /// Session identifier from step B.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Challenge issued at step C.
    #[must_use]
    pub const fn challenge(&self) -> &Challenge {
        &self.challenge
    }

    /// Correlation ids shared by steps B to D.
    #[must_use]
    pub const fn correlation(&self) -> &CorrelationContext {
        &self.correlation
    }
}

// =============================================================================
// Depot handle
// =============================================================================

/// Depot id discovered by the depot listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepotHandle(String);

impl DepotHandle {
    /// Wrap a depot id.
    #[must_use]
    pub fn new(depot_id: impl Into<String>) -> Self {
        Self(depot_id.into())
    }

    /// The depot id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DepotHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Internal stage
// =============================================================================

/// State plus the data each state owns.
#[derive(Debug, Clone)]
pub(crate) enum Stage {
    Unauthenticated,
    TokenAcquired {
        tokens: TokenPair,
    },
    Identified {
        tokens: TokenPair,
        correlation: CorrelationContext,
        identifier: String,
    },
    ChallengeIssued(PendingLogin),
    ChallengeActivated {
        tokens: TokenPair,
        correlation: CorrelationContext,
    },
    Connected {
        tokens: TokenPair,
        correlation: CorrelationContext,
    },
    Revoked,
}

impl Stage {
    pub(crate) const fn state(&self) -> SessionState {
        match self {
            Self::Unauthenticated => SessionState::Unauthenticated,
            Self::TokenAcquired { .. } => SessionState::TokenAcquired,
            Self::Identified { .. } => SessionState::Identified,
            Self::ChallengeIssued(_) => SessionState::ChallengeIssued,
            Self::ChallengeActivated { .. } => SessionState::ChallengeActivated,
            Self::Connected { .. } => SessionState::Connected,
            Self::Revoked => SessionState::Revoked,
        }
    }
}
