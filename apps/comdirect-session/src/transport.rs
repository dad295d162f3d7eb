//! HTTP transport for the brokerage API.
//!
//! Thin wrapper over `reqwest`: send, read the body, hand the status and raw
//! text to [`classify`]. No retries; every failure goes back to the caller.

use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use serde_json::Value;

use crate::config::HttpConfig;
use crate::error::{Diagnostic, Failure, FailureKind, Outcome};
use crate::signer::{HeaderSet, classify};

/// Request body variants used by the protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body.
    Empty,
    /// `application/json` body.
    Json(Value),
    /// `application/x-www-form-urlencoded` body.
    Form(Vec<(&'static str, String)>),
}

/// A classified successful response.
#[derive(Debug, Clone)]
pub struct ApiReply {
    /// HTTP status.
    pub status: u16,
    /// Parsed body (`{}` when empty).
    pub body: Value,
    /// Response headers.
    pub headers: HeaderMap,
}

impl ApiReply {
    /// Header value as UTF-8 text.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Shared HTTP client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a client with the configured timeout.
    pub fn new(config: &HttpConfig) -> Outcome<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                Failure::new(
                    FailureKind::TransportFault,
                    format!("failed to build HTTP client: {e}"),
                )
            })?;
        Ok(Self { client })
    }

    /// Send one request and classify the response.
    ///
    /// `label` names the protocol step in logs and diagnostics.
    pub async fn execute(
        &self,
        label: &str,
        method: Method,
        url: &str,
        headers: &HeaderSet,
        body: RequestBody,
    ) -> Outcome<ApiReply> {
        let mut request = self.client.request(method.clone(), url);
        for (name, value) in headers.iter() {
            request = request.header(name, value);
        }
        request = match &body {
            RequestBody::Empty => request,
            RequestBody::Json(json) => request.json(json),
            RequestBody::Form(fields) => request.form(fields),
        };

        tracing::debug!(request = label, %method, url, "Sending request");

        let response = request.send().await.map_err(|e| {
            tracing::warn!(request = label, url, error = %e, "Request produced no response");
            transport_fault(label, &e)
        })?;

        let status = response.status().as_u16();
        let response_headers = response.headers().clone();
        let raw_body = response
            .text()
            .await
            .map_err(|e| transport_fault(label, &e))?;

        tracing::debug!(request = label, status, "Received response");

        let parsed = classify(status, &raw_body).map_err(|f| f.for_request(label))?;
        Ok(ApiReply {
            status,
            body: parsed,
            headers: response_headers,
        })
    }
}

fn transport_fault(label: &str, error: &reqwest::Error) -> Failure {
    let kind = if error.is_timeout() {
        "timed out"
    } else if error.is_connect() {
        "connection failed"
    } else {
        "transport error"
    };
    Failure::new(FailureKind::TransportFault, format!("{label}: {kind}: {error}")).with_diagnostic(
        Diagnostic {
            request: label.to_string(),
            status: None,
            body: String::new(),
        },
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::error::UnprocessableKind;
    use crate::signer::form_headers;

    fn transport() -> HttpTransport {
        HttpTransport::new(&HttpConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn success_body_and_headers_are_returned() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/echo"))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("x-once-authentication-info", r#"{"id":"1","typ":"P"}"#)
                    .set_body_json(json!({"ok": true})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let reply = transport()
            .execute(
                "echo",
                Method::POST,
                &format!("{}/echo", server.uri()),
                &HeaderSet::default(),
                RequestBody::Json(json!({"a": 1})),
            )
            .await
            .unwrap();

        assert_eq!(reply.status, 201);
        assert_eq!(reply.body["ok"], true);
        assert_eq!(
            reply.header("x-once-authentication-info"),
            Some(r#"{"id":"1","typ":"P"}"#)
        );
    }

    #[tokio::test]
    async fn form_body_is_url_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(header("Content-Type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let result = transport()
            .execute(
                "token",
                Method::POST,
                &format!("{}/oauth/token", server.uri()),
                &form_headers(None),
                RequestBody::Form(vec![("grant_type", "password".to_string())]),
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn error_status_is_classified_and_labelled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_string(
                r#"{"messages":[{"key":"fehler-kein-handelbares-instrument","message":"no"}]}"#,
            ))
            .mount(&server)
            .await;

        let failure = transport()
            .execute(
                "order-validation",
                Method::POST,
                &server.uri(),
                &HeaderSet::default(),
                RequestBody::Empty,
            )
            .await
            .unwrap_err();

        assert_eq!(
            failure.kind,
            FailureKind::UnprocessableEntity(UnprocessableKind::NoTradableInstrument)
        );
        let diagnostic = failure.diagnostic.unwrap();
        assert_eq!(diagnostic.request, "order-validation");
        assert_eq!(diagnostic.status, Some(422));
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_fault() {
        // Port 9 (discard) on localhost is closed in test environments.
        let failure = transport()
            .execute(
                "status",
                Method::GET,
                "http://127.0.0.1:9/unreachable",
                &HeaderSet::default(),
                RequestBody::Empty,
            )
            .await
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::TransportFault);
        assert_eq!(failure.status(), None);
    }
}
