//! Manual TAN approval gate.
//!
//! Between steps C and D the operator approves the challenge out-of-band
//! (banking app push, photoTAN). [`TanApproval`] is the seam where the
//! caller decides how to wait for that.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::ApprovalConfig;
use crate::error::{Failure, FailureKind, Outcome};
use crate::signer::Challenge;

/// Waits until the operator has approved a challenge.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TanApproval: Send + Sync {
    /// Return once the challenge is approved, or fail to abort the login.
    async fn approve(&self, challenge: &Challenge) -> Outcome<()>;
}

/// Blocks on a console prompt until the operator presses enter.
#[derive(Debug, Clone, Default)]
pub struct StdinApproval;

/// Prompt printed by [`StdinApproval`].
pub const APPROVAL_PROMPT: &str = "Tap enter after the TAN approval.";

#[async_trait]
impl TanApproval for StdinApproval {
    async fn approve(&self, challenge: &Challenge) -> Outcome<()> {
        tracing::info!(
            challenge_id = %challenge.id,
            challenge_type = %challenge.challenge_type,
            "Waiting for TAN approval on the console"
        );

        tokio::task::spawn_blocking(|| {
            use std::io::{BufRead, Write};

            let mut stdout = std::io::stdout();
            writeln!(stdout, "{APPROVAL_PROMPT}")?;
            stdout.flush()?;
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).map(|_| ())
        })
        .await
        .map_err(|e| prompt_failure(&e))?
        .map_err(|e| prompt_failure(&e))
    }
}

fn prompt_failure(err: &dyn std::fmt::Display) -> Failure {
    Failure::new(
        FailureKind::InvalidState,
        format!("TAN approval prompt failed: {err}"),
    )
}

/// Sleeps for a fixed time, giving the operator that long to approve.
#[derive(Debug, Clone)]
pub struct DelayApproval {
    delay: Duration,
}

impl DelayApproval {
    /// Gate with an explicit wait.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Gate using `approval.delay_secs`.
    #[must_use]
    pub const fn from_config(config: &ApprovalConfig) -> Self {
        Self::new(config.delay())
    }

    /// Configured wait.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl TanApproval for DelayApproval {
    async fn approve(&self, challenge: &Challenge) -> Outcome<()> {
        tracing::info!(
            challenge_id = %challenge.id,
            delay_secs = self.delay.as_secs(),
            "Waiting for TAN approval"
        );
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// Proceeds immediately. For challenges approved before the call.
#[derive(Debug, Clone, Default)]
pub struct PreApproved;

#[async_trait]
impl TanApproval for PreApproved {
    async fn approve(&self, _challenge: &Challenge) -> Outcome<()> {
        Ok(())
    }
}
