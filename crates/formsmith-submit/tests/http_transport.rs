// crates/formsmith-submit/tests/http_transport.rs
// ============================================================================
// Module: HTTP Transport Tests
// Description: Local-server tests for the blocking HTTP transport.
// Purpose: Verify headers, body, status handling, redirects, and size caps.
// Dependencies: formsmith-core, formsmith-submit, serde_json, tiny_http
// ============================================================================

//! ## Overview
//! Each test starts a one-shot `tiny_http` server on an ephemeral port.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_docs,
    reason = "Test-only panic-based assertions are permitted."
)]

use std::sync::mpsc;
use std::thread;

use formsmith_core::Field;
use formsmith_core::FieldType;
use formsmith_core::FormDefinition;
use formsmith_core::FormPreview;
use formsmith_core::HttpMethod;
use formsmith_core::SubmitError;
use formsmith_core::SubmitOutcome;
use formsmith_core::TransportError;
use formsmith_submit::HttpTransport;
use formsmith_submit::HttpTransportConfig;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Request fields captured by the test server.
struct Captured {
    method: String,
    url: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Serves one request with `status`/`body`/`extra` headers and reports what it saw.
fn serve_once(
    status: u16,
    body: &'static str,
    extra: Vec<Header>,
) -> (String, mpsc::Receiver<Captured>, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").expect("http server");
    let addr = format!("http://{}", server.server_addr());
    let (tx, rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        if let Ok(mut request) = server.recv() {
            let mut text = String::new();
            request.as_reader().read_to_string(&mut text).unwrap();
            let captured = Captured {
                method: request.method().to_string(),
                url: request.url().to_string(),
                headers: request
                    .headers()
                    .iter()
                    .map(|header| (header.field.to_string(), header.value.to_string()))
                    .collect(),
                body: text,
            };
            tx.send(captured).unwrap();
            let mut response = Response::from_string(body).with_status_code(status);
            for header in extra {
                response = response.with_header(header);
            }
            request.respond(response).expect("respond");
        }
    });
    (addr, rx, handle)
}

fn local_transport() -> HttpTransport {
    HttpTransport::with_config(HttpTransportConfig {
        allow_http: true,
        ..HttpTransportConfig::default()
    })
    .unwrap()
}

fn contact_form(endpoint: &str, method: HttpMethod) -> FormDefinition {
    let mut form = FormDefinition::new("Contact");
    let mut name = Field::new(FieldType::Text, "Name").with_required(true);
    name.key = "name".into();
    let mut plan = Field::new(FieldType::Checkbox, "Plans").with_options(["free", "pro"]);
    plan.key = "plans".into();
    form.fields = vec![name, plan];
    form.endpoint = Some(endpoint.to_string());
    form.method = method;
    form.headers.insert("X-Test".to_string(), "1".to_string());
    form.headers.insert("content-type".to_string(), "text/plain".to_string());
    form
}

fn values(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn post_submission_sends_json_with_forced_content_type() {
    let (addr, rx, handle) = serve_once(201, r#"{"ok":true}"#, Vec::new());
    let form = contact_form(&format!("{addr}/submit"), HttpMethod::Post);
    let preview = FormPreview::new(&form).unwrap();

    let outcome = preview
        .submit(&local_transport(), &values(json!({ "name": "Ada", "plans": ["pro"] })))
        .unwrap();
    let SubmitOutcome::Sent { response, .. } = outcome else {
        panic!("expected a sent submission");
    };
    assert_eq!(response.status, 201);
    assert_eq!(response.body, r#"{"ok":true}"#);

    let captured = rx.recv().unwrap();
    handle.join().unwrap();
    assert_eq!(captured.method, "POST");
    assert_eq!(captured.url, "/submit");
    assert_eq!(captured.header("X-Test"), Some("1"));
    assert_eq!(captured.header("Content-Type"), Some("application/json"));
    assert_eq!(captured.body, r#"{"name":"Ada","plans":["pro"]}"#);
}

#[test]
fn get_submission_uses_query_string() {
    let (addr, rx, handle) = serve_once(200, "ok", Vec::new());
    let form = contact_form(&format!("{addr}/search"), HttpMethod::Get);
    let preview = FormPreview::new(&form).unwrap();

    preview
        .submit(&local_transport(), &values(json!({ "name": "Ada Lovelace", "plans": ["free", "pro"] })))
        .unwrap();

    let captured = rx.recv().unwrap();
    handle.join().unwrap();
    assert_eq!(captured.method, "GET");
    assert_eq!(captured.url, "/search?name=Ada+Lovelace&plans=free&plans=pro");
    assert!(captured.body.is_empty());
}

#[test]
fn non_success_status_is_rejected() {
    let (addr, _rx, handle) = serve_once(422, "bad input", Vec::new());
    let form = contact_form(&addr, HttpMethod::Post);
    let preview = FormPreview::new(&form).unwrap();

    let err = preview.submit(&local_transport(), &values(json!({ "name": "Ada" }))).unwrap_err();
    handle.join().unwrap();
    let SubmitError::Rejected(response) = err else {
        panic!("expected a rejected submission");
    };
    assert_eq!(response.status, 422);
    assert_eq!(response.body, "bad input");
}

#[test]
fn redirects_are_not_followed() {
    let location = Header::from_bytes("Location", "https://elsewhere.test/").unwrap();
    let (addr, _rx, handle) = serve_once(302, "", vec![location]);
    let form = contact_form(&addr, HttpMethod::Post);
    let preview = FormPreview::new(&form).unwrap();

    let err = preview.submit(&local_transport(), &values(json!({ "name": "Ada" }))).unwrap_err();
    handle.join().unwrap();
    assert!(matches!(err, SubmitError::Rejected(response) if response.status == 302));
}

#[test]
fn oversized_response_is_rejected() {
    let (addr, _rx, handle) = serve_once(200, "0123456789abcdef", Vec::new());
    let transport = HttpTransport::with_config(HttpTransportConfig {
        allow_http: true,
        max_response_bytes: 8,
        ..HttpTransportConfig::default()
    })
    .unwrap();
    let form = contact_form(&addr, HttpMethod::Post);
    let preview = FormPreview::new(&form).unwrap();

    let err = preview.submit(&transport, &values(json!({ "name": "Ada" }))).unwrap_err();
    handle.join().unwrap();
    assert!(matches!(err, SubmitError::Transport(TransportError::TooLarge { limit: 8, .. })));
}

#[test]
fn plain_http_is_refused_by_default() {
    let form = contact_form("http://127.0.0.1:9/never", HttpMethod::Post);
    let preview = FormPreview::new(&form).unwrap();
    let err = preview.submit(&HttpTransport::new().unwrap(), &values(json!({ "name": "Ada" }))).unwrap_err();
    assert!(matches!(err, SubmitError::Transport(TransportError::InvalidEndpoint(_))));
}
