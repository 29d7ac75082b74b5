use std::time::Duration;

use conector::chat::{Chat, Role};
use conector::client::{BackendClient, MockSource, SuggestionSource, Suggestions};
use conector::controller::{self, REPHRASE_TEXT};
use conector::error::SuggestionError;
use conector::form::InterestForm;
use serde_json::json;
use tokio::sync::Mutex;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn profile() -> InterestForm {
    InterestForm {
        interests: "environment".to_string(),
        skills: "gardening".to_string(),
        contribution_method: "weekends".to_string(),
        location: "Porto Alegre".to_string(),
    }
}

/// A URL nothing listens on, so connecting fails immediately.
fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn test_posts_camel_case_body_and_returns_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/get-suggestions"))
        .and(body_json(json!({
            "interests": "environment",
            "skills": "gardening",
            "contributionMethod": "weekends",
            "location": "Porto Alegre"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "processedResponse": "Community gardens would love your help."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = BackendClient::new(format!("{}/", server.uri()));
    let text = client.get_suggestions(&profile()).await.unwrap();

    assert_eq!(text.as_deref(), Some("Community gardens would love your help."));
}

#[tokio::test]
async fn test_success_without_payload_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "processedResponse": "   " })))
        .mount(&server)
        .await;

    let client = BackendClient::new(server.uri());
    assert_eq!(client.get_suggestions(&profile()).await.unwrap(), None);
}

#[tokio::test]
async fn test_error_body_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "Missing location" })))
        .mount(&server)
        .await;

    let client = BackendClient::new(server.uri());
    let err = client.get_suggestions(&profile()).await.unwrap_err();

    match &err {
        SuggestionError::Backend { status, message } => {
            assert_eq!(*status, 400);
            assert_eq!(message.as_deref(), Some("Missing location"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.chat_text().contains("Missing location"));
}

#[tokio::test]
async fn test_unparseable_error_body_falls_back_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("<html>Service Unavailable</html>"))
        .mount(&server)
        .await;

    let client = BackendClient::new(server.uri());
    let err = client.get_suggestions(&profile()).await.unwrap_err();

    assert!(matches!(err, SuggestionError::Backend { status: 503, message: None }));
    assert!(err.chat_text().contains("503"));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let client = BackendClient::new(unreachable_url());
    let err = client.get_suggestions(&profile()).await.unwrap_err();
    assert!(matches!(err, SuggestionError::Transport(_)));
}

#[test_log::test(tokio::test)]
async fn test_submit_success_appends_exact_text_as_assistant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/get-suggestions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "processedResponse": "You could help an urban reforestation project."
        })))
        .mount(&server)
        .await;

    let chat = Mutex::new(Chat::new());
    let source = SuggestionSource::Backend(BackendClient::new(server.uri()));
    let outcome = controller::submit(&chat, &source, &profile()).await;

    let chat = chat.lock().await;
    let last = chat.messages().last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert_eq!(last.text, "You could help an urban reforestation project.");
    assert_eq!(chat.count(Role::Loading), 0);
    assert!(outcome.show_contact);
}

#[tokio::test]
async fn test_submit_empty_payload_asks_to_rephrase() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let chat = Mutex::new(Chat::new());
    let source = SuggestionSource::Backend(BackendClient::new(server.uri()));
    let outcome = controller::submit(&chat, &source, &profile()).await;

    let chat = chat.lock().await;
    let last = chat.messages().last().unwrap();
    assert_eq!(last.role, Role::Info);
    assert_eq!(last.text, REPHRASE_TEXT);
    assert!(!outcome.show_contact);
}

#[test_log::test(tokio::test)]
async fn test_submit_network_failure_single_error_and_no_placeholder() {
    let chat = Mutex::new(Chat::new());
    let source = SuggestionSource::Backend(BackendClient::new(unreachable_url()));
    let outcome = controller::submit(&chat, &source, &profile()).await;

    let chat = chat.lock().await;
    assert_eq!(chat.count(Role::Error), 1);
    assert_eq!(chat.count(Role::Loading), 0);
    assert!(chat.messages().last().unwrap().text.contains("Could not connect"));
    assert!(!outcome.show_contact);
    assert!(outcome.submitted.is_some());
}

#[tokio::test]
async fn test_submit_with_empty_field_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "processedResponse": "x" })))
        .expect(0)
        .mount(&server)
        .await;

    let chat = Mutex::new(Chat::new());
    let source = SuggestionSource::Backend(BackendClient::new(server.uri()));
    let mut form = profile();
    form.location = " ".to_string();
    controller::submit(&chat, &source, &form).await;

    let chat = chat.lock().await;
    assert_eq!(chat.len(), 1);
    assert_eq!(chat.count(Role::Error), 1);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_mock_source_waits_then_returns_list() {
    let source = SuggestionSource::Mock(MockSource::new(Duration::from_millis(20)));
    let started = std::time::Instant::now();
    let result = source.fetch(&profile()).await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(20));
    match result {
        Suggestions::Opportunities(ops) => assert_eq!(ops.len(), 3),
        other => panic!("unexpected result: {other:?}"),
    }
}
