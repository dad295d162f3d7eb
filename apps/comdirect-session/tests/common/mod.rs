//! Scripted brokerage server shared by the integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use comdirect_session::{Credentials, EndpointTable, PreApproved, SessionConfig, SessionProtocol};

pub const IDENTIFIER: &str = "ident-1";
pub const LOGIN_CHALLENGE: &str = r#"{"id":"login-ch","typ":"P_TAN_PUSH"}"#;
pub const PRIMARY_ACCESS: &str = "primary-access";
pub const ELEVATED_ACCESS: &str = "elevated-access";
pub const ELEVATED_BEARER: &str = "Bearer elevated-access";

pub const SESSIONS: &str = "/api/session/clients/user/v1/sessions";
pub const BALANCES: &str = "/api/banking/clients/user/v2/accounts/balances";
pub const DEPOTS: &str = "/api/brokerage/clients/user/v3/depots";
pub const DIMENSIONS: &str = "/api/brokerage/v3/orders/dimensions";
pub const QUOTE_TICKET: &str = "/api/brokerage/v3/quoteticket";
pub const QUOTES: &str = "/api/brokerage/v3/quotes";
pub const VALIDATION: &str = "/api/brokerage/v3/orders/validation";
pub const COST_INDICATION: &str = "/api/brokerage/v3/orders/costindicationexante";
pub const ORDERS: &str = "/api/brokerage/v3/orders";

pub fn config(server: &MockServer) -> SessionConfig {
    SessionConfig::new(
        Credentials::new("client", "secret", "user", "1234"),
        EndpointTable::with_base(&server.uri()),
    )
    .with_possible_venues(["Xetra", "Tradegate", "LT Lang & Schwarz"])
}

/// Steps A to C, each expected exactly once.
pub async fn mount_login_start(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=user"))
        .and(body_string_contains("password=1234"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": PRIMARY_ACCESS,
            "refresh_token": "primary-refresh",
            "token_type": "bearer",
            "expires_in": 599
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(SESSIONS))
        .and(header("Authorization", "Bearer primary-access"))
        .and(header_exists("x-http-request-info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"identifier": IDENTIFIER, "sessionTanActive": false, "activated2FA": false}
        ])))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("{SESSIONS}/{IDENTIFIER}/validate")))
        .and(body_partial_json(json!({
            "identifier": IDENTIFIER,
            "sessionTanActive": true,
            "activated2FA": true
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("x-once-authentication-info", LOGIN_CHALLENGE)
                .set_body_json(json!({"identifier": IDENTIFIER})),
        )
        .expect(1)
        .mount(server)
        .await;
}

/// Steps D and E, each expected exactly once.
pub async fn mount_login_finish(server: &MockServer) {
    Mock::given(method("PATCH"))
        .and(path(format!("{SESSIONS}/{IDENTIFIER}")))
        .and(header("x-once-authentication-info", r#"{"id":"login-ch"}"#))
        .and(header_exists("x-once-authentication"))
        .and(body_partial_json(json!({"sessionTanActive": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "identifier": IDENTIFIER, "sessionTanActive": true, "activated2FA": true
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=cd_secondary"))
        .and(body_string_contains("token=primary-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ELEVATED_ACCESS,
            "refresh_token": "elevated-refresh"
        })))
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_login(server: &MockServer) {
    mount_login_start(server).await;
    mount_login_finish(server).await;
}

pub async fn connected_session(server: &MockServer) -> SessionProtocol {
    mount_login(server).await;
    let mut session = SessionProtocol::new(config(server)).unwrap();
    session.connect(&PreApproved).await.unwrap();
    session
}

pub async fn mount_depots(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(DEPOTS))
        .and(header("Authorization", ELEVATED_BEARER))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "paging": {"index": 0, "matches": 1},
            "values": [{
                "depotId": "D1",
                "depotDisplayId": "123456789",
                "depotType": "STANDARD_DEPOT",
                "holderName": "Test Holder",
                "clientId": "C1",
                "defaultSettlementAccountId": "A1"
            }]
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

pub fn eur(value: &str) -> serde_json::Value {
    json!({"value": value, "unit": "EUR"})
}
