//! The login state machine.
//!
//! Each step checks the current state first and returns `InvalidState`
//! without touching the network when called out of order. A failing step
//! leaves the state where it was, so the caller may retry it.

use reqwest::Method;
use serde_json::{Value, json};

use super::approval::TanApproval;
use super::state::{DepotHandle, PendingLogin, SessionState, Stage};
use crate::config::SessionConfig;
use crate::config::endpoints::{IDENTIFIER, resolve};
use crate::error::{Failure, FailureKind, Outcome};
use crate::signer::{
    Challenge, CorrelationContext, HeaderFlavor, TokenPair, build_headers, form_headers,
};
use crate::transport::{ApiReply, HttpTransport, RequestBody};

const PASSWORD_GRANT: &str = "password-grant";
const SESSION_STATUS: &str = "session-status";
const SESSION_VALIDATE: &str = "session-validate";
const SESSION_ACTIVATE: &str = "session-activate";
const SECONDARY_GRANT: &str = "secondary-grant";
const REVOKE: &str = "revoke";

/// One authenticated identity against the brokerage API.
///
/// Owns its tokens, correlation ids and challenge. Methods take `&mut self`,
/// so a session cannot be driven from two call sites at once.
#[derive(Debug)]
pub struct SessionProtocol {
    config: SessionConfig,
    transport: HttpTransport,
    stage: Stage,
    depot: Option<DepotHandle>,
}

impl SessionProtocol {
    /// Create an unauthenticated session.
    pub fn new(config: SessionConfig) -> Outcome<Self> {
        let transport = HttpTransport::new(&config.http)?;
        Ok(Self {
            config,
            transport,
            stage: Stage::Unauthenticated,
            depot: None,
        })
    }

    /// Rebuild a session paused by [`begin_login`](Self::begin_login).
    ///
    /// The result is in `ChallengeIssued`; call
    /// [`complete_login`](Self::complete_login) once the operator has
    /// approved the challenge.
    pub fn resume(config: SessionConfig, snapshot: PendingLogin) -> Outcome<Self> {
        let mut session = Self::new(config)?;
        tracing::info!(identifier = %snapshot.identifier, "Resuming paused login");
        session.stage = Stage::ChallengeIssued(snapshot);
        Ok(session)
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.stage.state()
    }

    /// Whether the session is `Connected`.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Configuration the session was built with.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Depot id cached by the last depot listing.
    #[must_use]
    pub const fn depot_handle(&self) -> Option<&DepotHandle> {
        self.depot.as_ref()
    }

    pub(crate) fn cache_depot(&mut self, depot: DepotHandle) {
        self.depot = Some(depot);
    }

    /// The paused login, while in `ChallengeIssued`.
    #[must_use]
    pub const fn pending_login(&self) -> Option<&PendingLogin> {
        match &self.stage {
            Stage::ChallengeIssued(login) => Some(login),
            _ => None,
        }
    }

    // =========================================================================
    // Steps
    // =========================================================================

    /// Step A: OAuth password grant.
    ///
    /// Allowed from every state except `Connected`, so a login stuck at a
    /// later step can start over on the same instance. Success discards
    /// any earlier login progress. Every failure is reported as
    /// `AuthFailed` with the server's message.
    pub async fn acquire_token(&mut self) -> Outcome<()> {
        if self.is_connected() {
            return Err(Failure::new(
                FailureKind::InvalidState,
                format!("{PASSWORD_GRANT} requires a session that is not connected; revoke first"),
            ));
        }

        let credentials = &self.config.credentials;
        let form = vec![
            ("client_id", credentials.client_id.clone()),
            ("client_secret", credentials.client_secret.clone()),
            ("grant_type", "password".to_string()),
            ("username", credentials.username.clone()),
            ("password", credentials.pin.clone()),
        ];

        let reply = self
            .transport
            .execute(
                PASSWORD_GRANT,
                Method::POST,
                &self.config.endpoints.oauth_token,
                &form_headers(None),
                RequestBody::Form(form),
            )
            .await
            .map_err(auth_failed)?;
        let tokens = TokenPair::from_response(&reply.body)
            .map_err(|f| auth_failed(f.for_request(PASSWORD_GRANT)))?;

        self.stage = Stage::TokenAcquired { tokens };
        self.depot = None;
        tracing::info!(step = "A", state = %self.state(), "Password grant accepted");
        Ok(())
    }

    /// Step B: read the session status and keep its identifier.
    ///
    /// Starts a fresh correlation context for this login attempt.
    pub async fn fetch_session_status(&mut self) -> Outcome<()> {
        let Stage::TokenAcquired { tokens } = &self.stage else {
            return Err(self.invalid_state(SESSION_STATUS, SessionState::TokenAcquired));
        };

        let correlation = CorrelationContext::generate();
        let headers = build_headers(HeaderFlavor::Standard, tokens, &correlation, None)?;
        let reply = self
            .transport
            .execute(
                SESSION_STATUS,
                Method::GET,
                &self.config.endpoints.session_status,
                &headers,
                RequestBody::Empty,
            )
            .await?;

        let identifier = reply
            .body
            .as_array()
            .and_then(|sessions| sessions.first())
            .and_then(|session| session.get("identifier"))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                Failure::protocol_violation("session status response lacks an identifier")
                    .for_request(SESSION_STATUS)
            })?
            .to_string();

        let tokens = tokens.clone();
        tracing::info!(
            step = "B",
            session_id = correlation.session_id(),
            identifier = %identifier,
            "Session identified"
        );
        self.stage = Stage::Identified {
            tokens,
            correlation,
            identifier,
        };
        Ok(())
    }

    /// Step C: ask the server to validate a session TAN.
    ///
    /// Returns the challenge the server chose.
    pub async fn validate_session_tan(&mut self) -> Outcome<Challenge> {
        let Stage::Identified {
            tokens,
            correlation,
            identifier,
        } = &self.stage
        else {
            return Err(self.invalid_state(SESSION_VALIDATE, SessionState::Identified));
        };

        let url = resolve(
            &self.config.endpoints.session_validate,
            &[(IDENTIFIER, identifier)],
        );
        let headers = build_headers(HeaderFlavor::Standard, tokens, correlation, None)?;
        let reply = self
            .transport
            .execute(
                SESSION_VALIDATE,
                Method::POST,
                &url,
                &headers,
                RequestBody::Json(session_tan_body(identifier)),
            )
            .await?;

        let challenge = parse_challenge(&reply, SESSION_VALIDATE)?;
        tracing::info!(
            step = "C",
            challenge_id = %challenge.id,
            challenge_type = %challenge.challenge_type,
            "Session TAN challenge issued"
        );

        let login = PendingLogin {
            tokens: tokens.clone(),
            correlation: correlation.clone(),
            identifier: identifier.clone(),
            challenge: challenge.clone(),
        };
        self.stage = Stage::ChallengeIssued(login);
        Ok(challenge)
    }

    /// Step D: activate the approved session TAN.
    pub async fn activate_session_tan(&mut self) -> Outcome<()> {
        let Stage::ChallengeIssued(login) = &self.stage else {
            return Err(self.invalid_state(SESSION_ACTIVATE, SessionState::ChallengeIssued));
        };

        let url = resolve(
            &self.config.endpoints.session_tan,
            &[(IDENTIFIER, &login.identifier)],
        );
        let headers = build_headers(
            HeaderFlavor::SessionTan,
            &login.tokens,
            &login.correlation,
            Some(&login.challenge),
        )?;
        self.transport
            .execute(
                SESSION_ACTIVATE,
                Method::PATCH,
                &url,
                &headers,
                RequestBody::Json(session_tan_body(&login.identifier)),
            )
            .await?;

        let tokens = login.tokens.clone();
        let correlation = login.correlation.clone();
        self.stage = Stage::ChallengeActivated {
            tokens,
            correlation,
        };
        tracing::info!(step = "D", "Session TAN activated");
        Ok(())
    }

    /// Step E: exchange the access token for the elevated pair.
    pub async fn secondary_exchange(&mut self) -> Outcome<()> {
        let Stage::ChallengeActivated {
            tokens,
            correlation,
        } = &self.stage
        else {
            return Err(self.invalid_state(SECONDARY_GRANT, SessionState::ChallengeActivated));
        };

        let credentials = &self.config.credentials;
        let form = vec![
            ("client_id", credentials.client_id.clone()),
            ("client_secret", credentials.client_secret.clone()),
            ("grant_type", "cd_secondary".to_string()),
            ("token", tokens.access_token.clone()),
        ];
        let reply = self
            .transport
            .execute(
                SECONDARY_GRANT,
                Method::POST,
                &self.config.endpoints.oauth_token,
                &form_headers(None),
                RequestBody::Form(form),
            )
            .await?;
        let elevated =
            TokenPair::from_response(&reply.body).map_err(|f| f.for_request(SECONDARY_GRANT))?;

        let correlation = correlation.clone();
        self.stage = Stage::Connected {
            tokens: elevated,
            correlation,
        };
        tracing::info!(step = "E", state = %self.state(), "Session connected");
        Ok(())
    }

    // =========================================================================
    // Entry modes
    // =========================================================================

    /// Steps A to C. Returns the snapshot needed to finish later.
    pub async fn begin_login(&mut self) -> Outcome<PendingLogin> {
        self.acquire_token().await?;
        self.fetch_session_status().await?;
        self.validate_session_tan().await?;
        self.pending_login()
            .cloned()
            .ok_or_else(|| self.invalid_state("begin-login", SessionState::ChallengeIssued))
    }

    /// Steps D and E.
    pub async fn complete_login(&mut self) -> Outcome<()> {
        self.activate_session_tan().await?;
        self.secondary_exchange().await
    }

    /// Full login with the approval gate between steps C and D.
    pub async fn connect(&mut self, approval: &dyn TanApproval) -> Outcome<()> {
        let pending = self.begin_login().await?;
        approval.approve(pending.challenge()).await?;
        self.complete_login().await
    }

    /// Revoke the session token.
    ///
    /// Returns `NoActiveSession` without a request unless `Connected`. An
    /// empty 204 reply yields `{}`.
    pub async fn revoke(&mut self) -> Outcome<Value> {
        let Stage::Connected { tokens, .. } = &self.stage else {
            return Err(Failure::no_active_session());
        };

        let headers = form_headers(Some(&tokens.access_token));
        let reply = self
            .transport
            .execute(
                REVOKE,
                Method::DELETE,
                &self.config.endpoints.session_revoke,
                &headers,
                RequestBody::Empty,
            )
            .await?;

        self.stage = Stage::Revoked;
        self.depot = None;
        tracing::info!(state = %self.state(), "Session revoked");
        Ok(reply.body)
    }

    // =========================================================================
    // Authenticated calls
    // =========================================================================

    /// Send a call that requires `Connected`, with a fresh request id.
    pub(crate) async fn call(
        &mut self,
        label: &str,
        method: Method,
        url: &str,
        body: RequestBody,
        flavor: HeaderFlavor,
        challenge: Option<&Challenge>,
    ) -> Outcome<ApiReply> {
        let Stage::Connected {
            tokens,
            correlation,
        } = &mut self.stage
        else {
            return Err(Failure::no_active_session());
        };

        correlation.refresh_request_id();
        let headers = build_headers(flavor, tokens, correlation, challenge)?;
        self.transport
            .execute(label, method, url, &headers, body)
            .await
    }

    /// `NoActiveSession` unless `Connected`.
    pub(crate) fn ensure_connected(&self) -> Outcome<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(Failure::no_active_session())
        }
    }

    fn invalid_state(&self, step: &str, expected: SessionState) -> Failure {
        Failure::new(
            FailureKind::InvalidState,
            format!(
                "{step} requires state {expected}, session is {}",
                self.state()
            ),
        )
    }
}

fn session_tan_body(identifier: &str) -> Value {
    json!({
        "identifier": identifier,
        "sessionTanActive": true,
        "activated2FA": true,
    })
}

/// Challenge from the `x-once-authentication-info` response header.
pub(crate) fn parse_challenge(reply: &ApiReply, label: &str) -> Outcome<Challenge> {
    let raw = reply.header(Challenge::HEADER).ok_or_else(|| {
        Failure::protocol_violation(format!("response lacks the {} header", Challenge::HEADER))
            .for_request(label)
    })?;
    Challenge::from_header(raw).map_err(|f| f.for_request(label))
}

fn auth_failed(failure: Failure) -> Failure {
    let status = failure
        .status()
        .map_or_else(|| "no status".to_string(), |s| s.to_string());
    let mut auth = Failure::new(
        FailureKind::AuthFailed,
        format!("Authentication failed ({status}): {}", failure.message),
    );
    auth.diagnostic = failure.diagnostic;
    auth
}
