//! Login, reads and revocation against a scripted brokerage server.

#![allow(clippy::unwrap_used)]

mod common;

use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use comdirect_session::{
    DepotHandle, FailureKind, PendingLogin, PreApproved, SessionProtocol, SessionState,
};
use common::{
    BALANCES, DEPOTS, ELEVATED_BEARER, IDENTIFIER, SESSIONS, config, connected_session, eur,
    mount_depots, mount_login, mount_login_finish, mount_login_start,
};

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn synchronous_login_reaches_connected() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let mut session = SessionProtocol::new(config(&server)).unwrap();
    assert_eq!(session.state(), SessionState::Unauthenticated);

    session.connect(&PreApproved).await.unwrap();

    assert_eq!(session.state(), SessionState::Connected);
    assert!(session.is_connected());
    assert!(session.pending_login().is_none());
}

#[tokio::test]
async fn split_login_resumes_from_serialized_snapshot() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let stored = {
        let mut first = SessionProtocol::new(config(&server)).unwrap();
        let pending = first.begin_login().await.unwrap();
        assert_eq!(first.state(), SessionState::ChallengeIssued);
        assert_eq!(pending.identifier(), IDENTIFIER);
        assert_eq!(pending.challenge().id, "login-ch");
        serde_json::to_string(&pending).unwrap()
    };

    let snapshot: PendingLogin = serde_json::from_str(&stored).unwrap();
    let mut resumed = SessionProtocol::resume(config(&server), snapshot).unwrap();
    assert_eq!(resumed.state(), SessionState::ChallengeIssued);

    resumed.complete_login().await.unwrap();
    assert_eq!(resumed.state(), SessionState::Connected);
}

#[tokio::test]
async fn activation_before_validation_is_rejected_without_request() {
    let server = MockServer::start().await;
    mount_login_start(&server).await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = SessionProtocol::new(config(&server)).unwrap();
    session.acquire_token().await.unwrap();
    session.fetch_session_status().await.unwrap();

    let failure = session.activate_session_tan().await.unwrap_err();
    assert_eq!(failure.kind, FailureKind::InvalidState);
    assert_eq!(session.state(), SessionState::Identified);

    // The skipped step can still be taken afterwards.
    session.validate_session_tan().await.unwrap();
    assert_eq!(session.state(), SessionState::ChallengeIssued);
}

#[tokio::test]
async fn failed_activation_keeps_challenge_for_retry() {
    let server = MockServer::start().await;
    mount_login_start(&server).await;
    Mock::given(method("PATCH"))
        .and(path(format!("{SESSIONS}/{IDENTIFIER}")))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "messages": [{"key": "tan-nicht-freigegeben", "message": "TAN not approved"}]
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_login_finish(&server).await;

    let mut session = SessionProtocol::new(config(&server)).unwrap();
    session.begin_login().await.unwrap();

    let failure = session.complete_login().await.unwrap_err();
    assert!(matches!(failure.kind, FailureKind::UnprocessableEntity(_)));
    assert_eq!(session.state(), SessionState::ChallengeIssued);

    session.complete_login().await.unwrap();
    assert!(session.is_connected());
}

#[tokio::test]
async fn password_grant_on_connected_session_is_rejected() {
    let server = MockServer::start().await;
    let mut session = connected_session(&server).await;

    let failure = session.acquire_token().await.unwrap_err();
    assert_eq!(failure.kind, FailureKind::InvalidState);
    assert!(session.is_connected());
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn reads_before_connect_make_no_requests() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = SessionProtocol::new(config(&server)).unwrap();
    let depot = DepotHandle::new("D1");

    assert_eq!(
        session.account_balances().await.unwrap_err().kind,
        FailureKind::NoActiveSession
    );
    assert_eq!(
        session.depots().await.unwrap_err().kind,
        FailureKind::NoActiveSession
    );
    assert_eq!(
        session.depot_position(&depot).await.unwrap_err().kind,
        FailureKind::NoActiveSession
    );
    assert_eq!(
        session.orders(&depot).await.unwrap_err().kind,
        FailureKind::NoActiveSession
    );
    assert!(session.trading().await.is_err());
}

#[tokio::test]
async fn connected_reads_map_payloads() {
    let server = MockServer::start().await;
    let mut session = connected_session(&server).await;

    Mock::given(method("GET"))
        .and(path(BALANCES))
        .and(header("Authorization", ELEVATED_BEARER))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [{
                "account": {"accountId": "A1", "accountDisplayId": "0123", "currency": "EUR"},
                "availableCashAmount": eur("250.00"),
                "availableCashAmountEUR": eur("250.00"),
                "balance": eur("300.00"),
                "balanceEUR": eur("300.00")
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_depots(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/api/brokerage/v3/depots/D1/positions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "aggregated": {
                "depot": {"depotId": "D1"},
                "purchaseValue": eur("100"),
                "currentValue": eur("120")
            },
            "values": []
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/brokerage/depots/D1/v3/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [{
                "orderId": "OCO", "orderType": "ONE_CANCELS_OTHER",
                "subOrders": [
                    {"orderType": "STOP_MARKET", "orderStatus": "OPEN", "side": "SELL",
                     "validityType": "GTD", "quantity": {"value": "4"}, "triggerLimit": eur("9")},
                    {"orderType": "LIMIT", "orderStatus": "OPEN", "side": "SELL",
                     "validityType": "GTD", "quantity": {"value": "4"}, "limit": eur("14")}
                ]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let balances = session.account_balances().await.unwrap();
    assert_eq!(balances[0].available_cash.value, dec!(250.00));

    assert!(session.depot_handle().is_none());
    let depots = session.depots().await.unwrap();
    assert_eq!(depots.len(), 1);
    let handle = session.depot_handle().cloned().unwrap();
    assert_eq!(handle.as_str(), "D1");

    let position = session.depot_position(&handle).await.unwrap();
    assert_eq!(position.aggregated.current_value.value, dec!(120));
    assert!(position.positions.is_empty());

    let book = session.orders(&handle).await.unwrap();
    assert_eq!(book.orders.len(), 2);
    assert!(book.orders.iter().all(|o| o.order_type == "ONE_CANCELS_OTHER"));
}

#[tokio::test]
async fn unauthorized_read_is_reported_and_session_stays_connected() {
    let server = MockServer::start().await;
    let mut session = connected_session(&server).await;
    Mock::given(method("GET"))
        .and(path(DEPOTS))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let failure = session.depots().await.unwrap_err();
    assert_eq!(failure.kind, FailureKind::Unauthorized);
    assert_eq!(failure.diagnostic.unwrap().request, "depots");
    assert!(session.is_connected());
    assert!(session.depot_handle().is_none());
}

#[tokio::test]
async fn empty_depot_listing_is_protocol_violation() {
    let server = MockServer::start().await;
    let mut session = connected_session(&server).await;
    Mock::given(method("GET"))
        .and(path(DEPOTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"values": []})))
        .expect(1)
        .mount(&server)
        .await;

    let failure = session.depots().await.unwrap_err();
    assert_eq!(failure.kind, FailureKind::ProtocolViolation);
    assert_eq!(failure.diagnostic.unwrap().request, "depots");
    assert!(session.depot_handle().is_none());
}

// =============================================================================
// Revocation
// =============================================================================

#[tokio::test]
async fn revoke_then_reads_return_no_active_session() {
    let server = MockServer::start().await;
    let mut session = connected_session(&server).await;

    Mock::given(method("DELETE"))
        .and(path("/oauth/revoke"))
        .and(header("Authorization", ELEVATED_BEARER))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(BALANCES))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_depots(&server, 0).await;

    let reply = session.revoke().await.unwrap();
    assert_eq!(reply, json!({}));
    assert_eq!(session.state(), SessionState::Revoked);

    assert_eq!(
        session.account_balances().await.unwrap_err().kind,
        FailureKind::NoActiveSession
    );
    assert_eq!(
        session.depots().await.unwrap_err().kind,
        FailureKind::NoActiveSession
    );
    // A second revoke is guarded the same way and sends nothing.
    assert_eq!(
        session.revoke().await.unwrap_err().kind,
        FailureKind::NoActiveSession
    );
}
