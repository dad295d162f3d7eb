//! Session protocol: OAuth login, TAN challenge, connected reads.
//!
//! # Login Flow
//!
//! 1. `A` password grant (form-encoded) for a primary token pair
//! 2. `B` session status, yielding the session identifier
//! 3. `C` session TAN validation; the server issues a challenge
//! 4. The operator approves the challenge out-of-band
//! 5. `D` session TAN activation referencing the challenge
//! 6. `E` secondary grant for the elevated token pair
//!
//! [`SessionProtocol::connect`] runs all of it with a [`TanApproval`] gate.
//! [`SessionProtocol::begin_login`] stops after step C and returns a
//! [`PendingLogin`] that [`SessionProtocol::resume`] picks up later,
//! possibly in another process.

mod account;
mod approval;
mod protocol;
mod state;

pub use approval::{APPROVAL_PROMPT, DelayApproval, PreApproved, StdinApproval, TanApproval};
pub use protocol::SessionProtocol;
pub(crate) use protocol::parse_challenge;
pub use state::{DepotHandle, PendingLogin, SessionState};
