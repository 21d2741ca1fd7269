//! Tests for the backend module

use super::*;
use crate::config::BackendConfiguration;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::format::Formatter;
use crate::http::ClientState;
use crate::types::{AuthenticationMode, JsonValue};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use test_case::test_case;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(mock_server: &MockServer) -> CouchdbBackend {
    let config =
        BackendConfiguration::new(mock_server.uri()).with_resource("widgets", "/widgets");
    CouchdbBackend::new(config).unwrap()
}

async fn mount_all_docs(mock_server: &MockServer, limit: &str, ids: &[&str]) {
    let rows: Vec<JsonValue> = ids
        .iter()
        .map(|id| json!({"id": id, "key": id, "value": {"rev": "1-x"}}))
        .collect();

    Mock::given(method("GET"))
        .and(path("/widgets/_all_docs"))
        .and(query_param("limit", limit))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_rows": ids.len(),
            "offset": 0,
            "rows": rows
        })))
        .expect(1)
        .mount(mock_server)
        .await;
}

async fn mount_widget(mock_server: &MockServer, id: &str, rev: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/widgets/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": id,
            "_rev": rev,
            "name": "x"
        })))
        .mount(mock_server)
        .await;
}

// ============================================================================
// URIs and validation
// ============================================================================

#[test]
fn test_resource_uri() {
    let config = BackendConfiguration::new("http://db.local").with_resource("widgets", "/widgets");
    let backend = CouchdbBackend::new(config).unwrap();

    assert_eq!(
        backend.resource_uri("widgets").unwrap(),
        "http://db.local/widgets"
    );
    assert!(matches!(
        backend.resource_uri("gadgets"),
        Err(Error::UnknownResourceSchema { .. })
    ));
}

#[test]
fn test_new_backend_is_unconfigured() {
    let backend = CouchdbBackend::new(BackendConfiguration::new("http://db.local")).unwrap();
    assert_eq!(backend.client_state(), ClientState::Unconfigured);
}

#[test]
fn test_new_backend_rejects_cookie_auth_without_loginpath() {
    let config = BackendConfiguration::new("http://db.local")
        .with_authentication(AuthenticationMode::CookieAuthentication);
    assert!(CouchdbBackend::new(config).is_err());
}

#[test]
fn test_find_args_builder() {
    let args = FindArgs::new().with_id("abc").with_limit(5);
    assert_eq!(args.id.as_deref(), Some("abc"));
    assert_eq!(args.limit, Some(5));
    assert_eq!(FindArgs::default().limit, None);
}

#[tokio::test]
async fn test_unknown_schema_fails_before_io() {
    let mock_server = MockServer::start().await;
    let backend = backend_for(&mock_server);
    let doc = Document::new()
        .with_field("name", "x")
        .with_metadata("_id", "abc")
        .with_metadata("_rev", "1-xyz");

    let err = backend.try_find("gadgets", &FindArgs::new()).await.unwrap_err();
    assert!(err.is_validation());
    assert!(backend.try_create("gadgets", doc.clone()).await.is_err());
    assert!(backend.try_read("gadgets", "abc").await.is_err());
    assert!(backend.try_update("gadgets", doc.clone()).await.is_err());
    assert!(backend.try_delete("gadgets", "abc").await.is_err());

    assert!(backend.find("gadgets", &FindArgs::new()).await.is_empty());
    assert!(backend.create("gadgets", doc).await.is_none());
    assert!(!backend.delete("gadgets", "abc").await);

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.is_empty());
    assert_eq!(backend.client_state(), ClientState::Unconfigured);
}

// ============================================================================
// find
// ============================================================================

#[tokio::test]
async fn test_find_default_limit() {
    let mock_server = MockServer::start().await;
    mount_all_docs(&mock_server, "1000", &["c", "a", "b"]).await;

    let backend = backend_for(&mock_server);
    let ids = backend.find("widgets", &FindArgs::new()).await;

    // Store order is preserved
    assert_eq!(ids, vec!["c", "a", "b"]);
}

#[tokio::test]
async fn test_find_explicit_limit() {
    let mock_server = MockServer::start().await;
    mount_all_docs(&mock_server, "5", &["a"]).await;

    let backend = backend_for(&mock_server);
    let ids = backend
        .try_find("widgets", &FindArgs::new().with_limit(5))
        .await
        .unwrap();

    assert_eq!(ids, vec!["a"]);
}

#[tokio::test]
async fn test_find_custom_page_size() {
    let mock_server = MockServer::start().await;
    mount_all_docs(&mock_server, "50", &[]).await;

    let backend = backend_for(&mock_server).with_page_size(50);
    let ids = backend.try_find("widgets", &FindArgs::new()).await.unwrap();

    assert!(ids.is_empty());
}

#[tokio::test]
async fn test_find_existing_id() {
    let mock_server = MockServer::start().await;
    mount_widget(&mock_server, "abc", "1-xyz").await;

    Mock::given(method("GET"))
        .and(path("/widgets/_all_docs"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let ids = backend
        .find("widgets", &FindArgs::new().with_id("abc"))
        .await;

    assert_eq!(ids, vec!["abc"]);
}

#[tokio::test]
async fn test_find_missing_id_falls_through_to_listing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/widgets/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "not_found",
            "reason": "missing"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_all_docs(&mock_server, "1000", &["a", "b"]).await;

    let backend = backend_for(&mock_server);
    let ids = backend.find("widgets", &FindArgs::new().with_id("nope")).await;

    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn test_find_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/widgets/_all_docs"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);

    let err = backend.try_find("widgets", &FindArgs::new()).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(backend.find("widgets", &FindArgs::new()).await.is_empty());
}

#[tokio::test]
async fn test_find_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/widgets/_all_docs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total_rows": 0})))
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let err = backend.try_find("widgets", &FindArgs::new()).await.unwrap_err();

    assert!(matches!(err, Error::Decode { .. }));
}

#[tokio::test]
async fn test_find_row_without_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/widgets/_all_docs"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"rows": [{"id": "a"}, {"key": "b"}]})),
        )
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let err = backend.try_find("widgets", &FindArgs::new()).await.unwrap_err();

    assert!(err.to_string().contains("Row is missing 'id'"));
}

#[tokio::test]
async fn test_find_unreachable_store() {
    let config = BackendConfiguration::new("http://127.0.0.1:1").with_resource("widgets", "/widgets");
    let backend = CouchdbBackend::new(config).unwrap();

    let err = backend.try_find("widgets", &FindArgs::new()).await.unwrap_err();
    assert!(err.is_transport());
    assert!(backend.find("widgets", &FindArgs::new()).await.is_empty());
}

// ============================================================================
// create / read
// ============================================================================

#[tokio::test]
async fn test_create() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/widgets"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "x"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "ok": true,
            "id": "abc",
            "rev": "1-xyz"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let doc = Document::new()
        .with_field("name", "x")
        .with_metadata("_id", "ignored");

    let created = backend.create("widgets", doc).await.unwrap();

    assert_eq!(created.id(), Some("abc"));
    assert_eq!(created.rev(), Some("1-xyz"));
    assert_eq!(created.field("name"), Some(&json!("x")));
    assert_eq!(created.metadata_map().len(), 2);
}

#[test_case(409 ; "conflict")]
#[test_case(400 ; "bad request")]
#[test_case(202 ; "accepted is not created")]
#[tokio::test]
async fn test_create_unexpected_status(status: u16) {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/widgets"))
        .respond_with(
            ResponseTemplate::new(status).set_body_json(json!({"id": "abc", "rev": "1-xyz"})),
        )
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let doc = Document::new().with_field("name", "x");

    assert!(backend.create("widgets", doc.clone()).await.is_none());
    let err = backend.try_create("widgets", doc).await.unwrap_err();
    assert_eq!(err.status(), Some(status));
}

#[tokio::test]
async fn test_read() {
    let mock_server = MockServer::start().await;
    mount_widget(&mock_server, "abc", "1-xyz").await;

    let backend = backend_for(&mock_server);
    let doc = backend.read("widgets", "abc").await.unwrap();

    assert_eq!(doc.id(), Some("abc"));
    assert_eq!(doc.rev(), Some("1-xyz"));
    assert_eq!(doc.fields().len(), 1);
    assert_eq!(backend.backend_content_id(&doc), Some("abc".to_string()));
}

#[tokio::test]
async fn test_read_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/widgets/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);

    assert!(backend.read("widgets", "missing").await.is_none());
    let err = backend.try_read("widgets", "missing").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_read_encodes_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/widgets/a%20b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": "a b", "_rev": "1-x"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let doc = backend.read("widgets", "a b").await.unwrap();

    assert_eq!(doc.id(), Some("a b"));
}

#[tokio::test]
async fn test_create_then_read() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/widgets"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"ok": true, "id": "abc", "rev": "1-xyz"})),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/widgets/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "abc",
            "_rev": "1-xyz",
            "name": "x",
            "size": 3
        })))
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let sent = Document::new().with_field("name", "x").with_field("size", 3);

    let created = backend.create("widgets", sent.clone()).await.unwrap();
    let read = backend.read("widgets", created.id().unwrap()).await.unwrap();

    assert_eq!(read.fields(), sent.fields());
    assert_eq!(read.rev(), created.rev());
}

// ============================================================================
// update
// ============================================================================

#[tokio::test]
async fn test_update() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/widgets/abc"))
        .and(query_param("rev", "1-xyz"))
        .and(body_json(json!({"name": "y"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "ok": true,
            "id": "abc",
            "rev": "2-def"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let doc = Document::new()
        .with_field("name", "y")
        .with_metadata("_id", "abc")
        .with_metadata("_rev", "1-xyz");

    let updated = backend.update("widgets", doc).await.unwrap();

    assert_eq!(updated.id(), Some("abc"));
    assert_eq!(updated.rev(), Some("2-def"));
    assert_eq!(updated.field("name"), Some(&json!("y")));
}

#[tokio::test]
async fn test_update_after_read_keeps_attachments() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/widgets/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "abc",
            "_rev": "1-xyz",
            "name": "x",
            "_attachments": {
                "a.txt": {"content_type": "text/plain", "stub": true, "length": 5}
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/widgets/abc"))
        .and(query_param("rev", "1-xyz"))
        .and(body_json(json!({
            "name": "y",
            "_attachments": {
                "a.txt": {"content_type": "text/plain", "stub": true, "length": 5}
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "ok": true,
            "id": "abc",
            "rev": "2-def"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let mut doc = backend.read("widgets", "abc").await.unwrap();
    doc.set_field("name", "y");

    let updated = backend.try_update("widgets", doc).await.unwrap();

    assert_eq!(updated.rev(), Some("2-def"));
    assert!(updated.metadata("_attachments").is_some());
}

#[tokio::test]
async fn test_update_conflict() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/widgets/abc"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": "conflict",
            "reason": "Document update conflict."
        })))
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let doc = Document::new()
        .with_metadata("_id", "abc")
        .with_metadata("_rev", "1-old");

    let err = backend.try_update("widgets", doc.clone()).await.unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert!(backend.update("widgets", doc).await.is_none());
}

#[test_case("_id" ; "without id")]
#[test_case("_rev" ; "without rev")]
#[tokio::test]
async fn test_update_requires_metadata(missing: &str) {
    let mock_server = MockServer::start().await;
    let backend = backend_for(&mock_server);

    let mut doc = Document::new()
        .with_field("name", "y")
        .with_metadata("_id", "abc")
        .with_metadata("_rev", "1-xyz");
    doc.delete_metadata(missing);

    let err = backend.try_update("widgets", doc).await.unwrap_err();
    assert!(matches!(err, Error::MissingMetadata { ref field } if field == missing));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

// ============================================================================
// delete
// ============================================================================

#[test_case(200, true ; "deleted")]
#[test_case(409, false ; "conflict")]
#[test_case(404, false ; "gone meanwhile")]
#[tokio::test]
async fn test_delete(status: u16, expected: bool) {
    let mock_server = MockServer::start().await;
    mount_widget(&mock_server, "abc", "1-xyz").await;

    Mock::given(method("DELETE"))
        .and(path("/widgets/abc"))
        .and(query_param("rev", "1-xyz"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    assert_eq!(backend.delete("widgets", "abc").await, expected);
}

#[tokio::test]
async fn test_delete_skipped_when_read_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/widgets/abc"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    assert!(!backend.delete("widgets", "abc").await);
}

#[tokio::test]
async fn test_delete_requires_revision() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/widgets/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": "abc"})))
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let err = backend.try_delete("widgets", "abc").await.unwrap_err();

    assert!(matches!(err, Error::MissingMetadata { .. }));
}

// ============================================================================
// is_alive
// ============================================================================

#[test_case(200, true ; "ok")]
#[test_case(201, false ; "created")]
#[test_case(401, false ; "unauthorized")]
#[test_case(503, false ; "unavailable")]
#[tokio::test]
async fn test_is_alive(status: u16, expected: bool) {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({"couchdb": "Welcome"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    assert_eq!(backend.is_alive().await, expected);
}

#[tokio::test]
async fn test_is_alive_connection_refused() {
    let backend = CouchdbBackend::new(BackendConfiguration::new("http://127.0.0.1:1")).unwrap();
    assert!(!backend.is_alive().await);
}

// ============================================================================
// Session behaviour
// ============================================================================

#[tokio::test]
async fn test_cookie_login_once_across_operations() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/_session"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "AuthSession=c2Vzc2lvbg; Path=/; HttpOnly")
                .set_body_json(json!({"ok": true})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/widgets/abc"))
        .and(header("cookie", "AuthSession=c2Vzc2lvbg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": "abc", "_rev": "1-x"})))
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/widgets/_all_docs"))
        .and(header("cookie", "AuthSession=c2Vzc2lvbg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rows": [{"id": "abc"}]})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = BackendConfiguration::new(mock_server.uri())
        .with_resource("widgets", "/widgets")
        .with_authentication(AuthenticationMode::CookieAuthentication)
        .with_component_setting("authentication_handler", "username", "admin")
        .with_component_setting("authentication_handler", "password", "secret")
        .with_component_setting("authentication_handler", "loginpath", "/_session");
    let backend = CouchdbBackend::new(config).unwrap();

    assert!(backend.read("widgets", "abc").await.is_some());
    assert_eq!(backend.find("widgets", &FindArgs::new()).await, vec!["abc"]);
    assert!(backend.read("widgets", "abc").await.is_some());
}

#[tokio::test]
async fn test_failed_login_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/_session"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/widgets/abc"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = BackendConfiguration::new(mock_server.uri())
        .with_resource("widgets", "/widgets")
        .with_authentication(AuthenticationMode::CookieAuthentication)
        .with_component_setting("authentication_handler", "loginpath", "/_session");
    let backend = CouchdbBackend::new(config).unwrap();

    assert!(backend.read("widgets", "abc").await.is_none());
    assert!(backend.read("widgets", "abc").await.is_none());
}

#[tokio::test]
async fn test_http_authentication_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = BackendConfiguration::new(mock_server.uri())
        .with_authentication(AuthenticationMode::HttpAuthentication)
        .with_component_setting("authentication_handler", "username", "user")
        .with_component_setting("authentication_handler", "password", "pass");
    let backend = CouchdbBackend::new(config).unwrap();

    assert!(backend.is_alive().await);
}

#[tokio::test]
async fn test_injected_client_is_used() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("x-injected", "yes"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert("x-injected", reqwest::header::HeaderValue::from_static("yes"));
    let client = reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .unwrap();

    let mut backend = backend_for(&mock_server);
    backend.set_client(client);

    assert_eq!(backend.client_state(), ClientState::Ready);
    assert!(backend.is_alive().await);
}

struct PlainFormatter;

impl Formatter for PlainFormatter {
    fn content_type(&self) -> &str {
        "application/vnd.widgets+json"
    }

    fn encode(&self, document: &Document) -> Result<String> {
        Ok(serde_json::to_string(document.fields())?)
    }

    fn encode_for_update(&self, document: &Document) -> Result<String> {
        Ok(serde_json::to_string(&document.update_members())?)
    }

    fn decode(&self, body: &str) -> Result<JsonValue> {
        Ok(serde_json::from_str(body)?)
    }
}

#[tokio::test]
async fn test_custom_formatter_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/widgets"))
        .and(header("content-type", "application/vnd.widgets+json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "abc", "rev": "1-x"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server).with_formatter(Arc::new(PlainFormatter));
    let created = backend
        .create("widgets", Document::new().with_field("name", "x"))
        .await;

    assert!(created.is_some());
}
