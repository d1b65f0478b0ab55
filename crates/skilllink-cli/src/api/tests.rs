//! Tests for the marketplace API client and error extraction.

use std::sync::{Arc, Mutex};

use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use serde_json::json;
use skilllink_core::model::{BidDraft, ProjectFilters, SkillsUpdate};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use super::client::ApiClient;
use super::error::{ApiError, ErrorBody};
use super::{BidDecision, MarketplaceApi, ProfileUpdate, endpoints};
use crate::storage::ClientStorage;

fn client_with(storage: ClientStorage) -> ApiClient {
    ApiClient::new("http://127.0.0.1:8000/", Arc::new(storage)).unwrap()
}

// =============================================================================
// Client construction
// =============================================================================

#[test]
fn empty_base_url_returns_config_error() {
    let err = ApiClient::new("  ", Arc::new(ClientStorage::in_memory())).unwrap_err();
    assert!(matches!(err, ApiError::Config(_)));
}

#[test]
fn unparseable_base_url_returns_config_error() {
    let err = ApiClient::new("not a url", Arc::new(ClientStorage::in_memory())).unwrap_err();
    assert!(matches!(err, ApiError::Config(_)));
}

#[test]
fn endpoint_joins_without_double_slash() {
    let client = client_with(ClientStorage::in_memory());
    assert_eq!(
        client.endpoint(&endpoints::create_bid(9)).unwrap().as_str(),
        "http://127.0.0.1:8000/projects/api/9/bid/create/"
    );
    assert_eq!(
        client.endpoint(&endpoints::accept_bid(4)).unwrap().path(),
        "/projects/api/bids/4/accept/"
    );
}

#[test]
fn stored_csrf_token_restored_into_cookie_jar() {
    let storage = ClientStorage::in_memory();
    storage.set_csrf_token("tok-from-last-run").unwrap();
    let client = client_with(storage);
    assert_eq!(client.cookie_csrf().as_deref(), Some("tok-from-last-run"));
    assert_eq!(client.csrf_token().as_deref(), Some("tok-from-last-run"));
}

// =============================================================================
// Request headers
// =============================================================================

#[test]
fn request_carries_bearer_and_csrf_headers() {
    let storage = ClientStorage::in_memory();
    storage.set_auth_token("abc123").unwrap();
    storage.set_csrf_token("csrf-1").unwrap();
    let client = client_with(storage);

    let url = client.endpoint(endpoints::PROFILE).unwrap();
    let request = client.request(Method::PATCH, url).unwrap().build().unwrap();
    assert_eq!(request.headers()[AUTHORIZATION], "Bearer abc123");
    assert_eq!(request.headers()["X-CSRFToken"], "csrf-1");
}

#[test]
fn anonymous_request_has_no_auth_header() {
    let client = client_with(ClientStorage::in_memory());
    let url = client.endpoint(endpoints::AVAILABLE_PROJECTS).unwrap();
    let request = client.request(Method::GET, url).unwrap().build().unwrap();
    assert!(request.headers().get(AUTHORIZATION).is_none());
    assert!(request.headers().get("X-CSRFToken").is_none());
}

#[test]
fn legacy_token_key_is_sent() {
    let storage = ClientStorage::in_memory();
    storage
        .set(crate::storage::LEGACY_AUTH_TOKEN_KEY, "legacy")
        .unwrap();
    let client = client_with(storage);
    let url = client.endpoint(endpoints::MY_BIDS).unwrap();
    let request = client.request(Method::GET, url).unwrap().build().unwrap();
    assert_eq!(request.headers()[AUTHORIZATION], "Bearer legacy");
}

#[tokio::test]
async fn bid_actions_refused_without_token() {
    let client = client_with(ClientStorage::in_memory());
    let draft = BidDraft {
        amount: 100.0,
        delivery_days: 3,
        proposal: "pitch".into(),
    };
    let err = client.submit_bid(1, draft).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
    assert!(err.is_auth_failure());

    let err = client.decide_bid(1, BidDecision::Accept).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
}

// =============================================================================
// Error body extraction
// =============================================================================

#[test]
fn empty_body_has_no_message() {
    assert_eq!(ErrorBody::parse("   "), ErrorBody::Empty);
    assert_eq!(ErrorBody::Empty.message(), None);
}

#[test]
fn detail_string_preferred() {
    let body = ErrorBody::parse(r#"{"error": "second", "detail": "Invalid credentials"}"#);
    assert_eq!(body.message().as_deref(), Some("Invalid credentials"));
}

#[test]
fn nested_detail_uses_first_field_message() {
    let body = ErrorBody::parse(
        r#"{"detail": {"email": ["Enter a valid email address."], "password": ["Too short."]}}"#,
    );
    assert_eq!(body.message().as_deref(), Some("Enter a valid email address."));
}

#[test]
fn error_key_then_first_field() {
    let body = ErrorBody::parse(r#"{"error": "Project closed"}"#);
    assert_eq!(body.message().as_deref(), Some("Project closed"));

    let body = ErrorBody::parse(r#"{"amount": ["Ensure this value is greater than 0."]}"#);
    assert_eq!(
        body.message().as_deref(),
        Some("Ensure this value is greater than 0.")
    );
}

#[test]
fn non_json_body_kept_as_capped_text() {
    let html = format!("<html>{}</html>", "x".repeat(500));
    let body = ErrorBody::parse(&html);
    assert!(!body.is_json());
    assert_eq!(body.message().unwrap().chars().count(), 200);
}

#[test]
fn field_errors_join_messages_with_spaces() {
    let body = ErrorBody::Json(json!({
        "email": ["This field is required.", "Must be unique."],
        "password": "Too common."
    }));
    assert_eq!(
        body.field_errors(),
        vec![
            (
                "email".to_string(),
                "This field is required. Must be unique.".to_string()
            ),
            ("password".to_string(), "Too common.".to_string()),
        ]
    );
    assert_eq!(
        body.field_message("email").as_deref(),
        Some("This field is required.")
    );
}

#[test]
fn server_error_carries_extracted_message() {
    let err = ApiError::server(400, ErrorBody::parse(r#"{"detail": "Nope"}"#));
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.server_message(), Some("Nope"));
    assert!(err.is_rejection());
    assert!(!err.is_auth_failure());
    assert!(ApiError::server(403, ErrorBody::Empty).is_auth_failure());
}

#[test]
fn text_body_is_its_own_detail() {
    let body = ErrorBody::parse("  Bad Gateway\n");
    assert_eq!(body.detail().as_deref(), Some("Bad Gateway"));
    assert_eq!(body.field_message("detail"), None);

    let body = ErrorBody::parse(r#"{"email": ["Taken"]}"#);
    assert_eq!(body.detail(), None);
}

// =============================================================================
// Requests against a loopback backend
// =============================================================================

/// A request as the loopback backend received it.
#[derive(Debug, Clone)]
struct Received {
    method: String,
    /// Path including the query string.
    path: String,
    /// Header names lowercased.
    headers: Vec<(String, String)>,
    body: String,
}

impl Received {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A scripted response.
#[derive(Debug, Clone)]
struct Canned {
    status: u16,
    headers: Vec<String>,
    body: String,
}

impl Canned {
    fn json(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            headers: vec!["Content-Type: application/json".into()],
            body: body.to_string(),
        }
    }

    fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: vec!["Content-Type: text/html".into()],
            body: body.to_string(),
        }
    }

    fn header(mut self, line: &str) -> Self {
        self.headers.push(line.to_string());
        self
    }

    fn render(&self) -> String {
        let extra: String = self.headers.iter().map(|h| format!("{h}\r\n")).collect();
        format!(
            "HTTP/1.1 {} Canned\r\nContent-Length: {}\r\nConnection: close\r\n{extra}\r\n{}",
            self.status,
            self.body.len(),
            self.body
        )
    }
}

type Log = Arc<Mutex<Vec<Received>>>;

/// Serve `routes` (keyed by `"METHOD /path"`) on a loopback port. Unknown
/// routes answer 404. Returns the base URL and the request log.
async fn backend(routes: Vec<(&'static str, Canned)>) -> (String, Log) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let log: Log = Arc::default();
    let routes = Arc::new(routes);
    let seen = Arc::clone(&log);
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let routes = Arc::clone(&routes);
            let seen = Arc::clone(&seen);
            tokio::spawn(async move { answer(stream, &routes, &seen).await });
        }
    });
    (base, log)
}

async fn answer(
    mut stream: TcpStream,
    routes: &[(&'static str, Canned)],
    log: &Mutex<Vec<Received>>,
) {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 4096];
    let head_end = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(i) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break i + 4;
        }
    };
    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap().split(' ');
    let method = request_line.next().unwrap().to_string();
    let path = request_line.next().unwrap().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();
    let length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < head_end + length {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[head_end..]).into_owned();

    let key = format!("{method} {}", path.split('?').next().unwrap_or_default());
    let response = routes
        .iter()
        .find(|(route, _)| *route == key)
        .map_or_else(|| Canned::text(404, "").render(), |(_, canned)| canned.render());
    log.lock().unwrap().push(Received {
        method,
        path,
        headers,
        body,
    });
    stream.write_all(response.as_bytes()).await.unwrap();
    let _ = stream.shutdown().await;
}

fn received(log: &Log) -> Vec<Received> {
    log.lock().unwrap().clone()
}

fn signed_in_storage() -> Arc<ClientStorage> {
    let storage = Arc::new(ClientStorage::in_memory());
    storage.set_auth_token("tok").unwrap();
    storage
}

#[tokio::test]
async fn csrf_cookie_is_primed_then_sent_with_bearer() {
    let (base, log) = backend(vec![
        (
            "GET /projects/marketplace/",
            Canned::text(200, "<html></html>").header("Set-Cookie: csrftoken=cookie-tok; Path=/"),
        ),
        (
            "POST /projects/api/3/bid/create/",
            Canned::json(201, &json!({"id": 1})),
        ),
    ])
    .await;
    let storage = signed_in_storage();
    let client = ApiClient::new(&base, Arc::clone(&storage)).unwrap();
    let draft = BidDraft {
        amount: 1500.0,
        delivery_days: 7,
        proposal: "pitch".into(),
    };
    client.submit_bid(3, draft).await.unwrap();

    let requests = received(&log);
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, "GET");
    let post = &requests[1];
    assert_eq!(post.method, "POST");
    assert_eq!(post.header("authorization"), Some("Bearer tok"));
    assert_eq!(post.header("x-csrftoken"), Some("cookie-tok"));
    assert!(post.header("cookie").unwrap().contains("csrftoken=cookie-tok"));
    assert_eq!(post.header("content-type"), Some("application/json"));
    assert!(post.body.contains("\"proposal\":\"pitch\""));
    assert_eq!(storage.csrf_token().as_deref(), Some("cookie-tok"));
}

#[tokio::test]
async fn csrf_falls_back_to_hidden_form_field() {
    let page = r#"<form><input type="hidden" name="csrfmiddlewaretoken" value="form-tok"></form>"#;
    let (base, log) = backend(vec![
        ("GET /users/login/", Canned::text(200, page)),
        (
            "POST /users/login/",
            Canned::json(200, &json!({"token": "t", "user": {"role": "client"}})),
        ),
    ])
    .await;
    let storage = Arc::new(ClientStorage::in_memory());
    let client = ApiClient::new(&base, Arc::clone(&storage)).unwrap();
    let request = skilllink_core::model::LoginRequest {
        email: "ada@example.test".into(),
        password: "engine42".into(),
    };
    let reply = client.login(request).await.unwrap();
    assert_eq!(reply.token.as_deref(), Some("t"));

    let requests = received(&log);
    assert_eq!(requests[1].header("x-csrftoken"), Some("form-tok"));
    assert!(requests[1].header("authorization").is_none());
    assert_eq!(storage.csrf_token().as_deref(), Some("form-tok"));
}

#[tokio::test]
async fn known_csrf_token_skips_priming() {
    let (base, log) = backend(vec![(
        "PUT /projects/api/bids/4/accept/",
        Canned::text(200, ""),
    )])
    .await;
    let storage = signed_in_storage();
    storage.set_csrf_token("stored").unwrap();
    let client = ApiClient::new(&base, storage).unwrap();
    client.decide_bid(4, BidDecision::Accept).await.unwrap();

    let requests = received(&log);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].header("x-csrftoken"), Some("stored"));
}

#[tokio::test]
async fn empty_success_body_is_none() {
    let (base, _log) = backend(vec![("PATCH /users/profile/", Canned::text(200, ""))]).await;
    let storage = signed_in_storage();
    storage.set_csrf_token("stored").unwrap();
    let client = ApiClient::new(&base, storage).unwrap();
    let update = ProfileUpdate::Skills(SkillsUpdate {
        skills: vec!["Rust".into()],
    });
    assert_eq!(client.update_profile(update).await.unwrap(), None);
}

#[tokio::test]
async fn rejections_carry_status_and_parsed_body() {
    let (base, _log) = backend(vec![
        ("GET /users/profile/", Canned::json(400, &json!({"detail": "Nope"}))),
        ("GET /projects/api/5/", Canned::text(502, "Bad Gateway")),
    ])
    .await;
    let client = ApiClient::new(&base, signed_in_storage()).unwrap();

    let err = client.fetch_profile().await.unwrap_err();
    let ApiError::Server {
        status,
        message,
        body,
    } = err
    else {
        panic!("expected a server rejection");
    };
    assert_eq!(status, 400);
    assert_eq!(message.as_deref(), Some("Nope"));
    assert_eq!(body, ErrorBody::Json(json!({"detail": "Nope"})));

    let err = client.project_detail(5).await.unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert!(matches!(&err, ApiError::Server { body: ErrorBody::Text(_), .. }));
    assert_eq!(err.server_message(), Some("Bad Gateway"));
}

#[tokio::test]
async fn listing_sends_filters_and_reads_paginated_body() {
    let project = json!({
        "id": 1,
        "title": "Logo",
        "description": "Design a logo",
        "budget": "15000.00",
        "status": "open",
        "created_at": "2026-10-19T08:30:00Z"
    });
    let (base, log) = backend(vec![(
        "GET /projects/api/available/",
        Canned::json(200, &json!({"count": 1, "results": [project]})),
    )])
    .await;
    let client = ApiClient::new(&base, Arc::new(ClientStorage::in_memory())).unwrap();
    let filters = ProjectFilters {
        search: "logo".into(),
        page: Some(2),
        ..ProjectFilters::default()
    };
    let projects = client.list_projects(filters).await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(received(&log)[0].path, "/projects/api/available/?search=logo&page=2");
}
