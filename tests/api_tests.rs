mod common;

use axum_test::TestServer;
use common::mocks::{FailingMailer, FailureKind, RecordingMailer};
use serde_json::json;
use std::sync::Arc;

use hatch::{
    AppState, HatchConfig, HatchConfigManager, Mailer, api,
    faq::DEFAULT_FALLBACK,
    utils::toml_config::FaqRuleConfig,
};

const SERVICES: &str = "We provide intelligent automation";
const TECHNOLOGY: &str = "Our stack includes";
const CONTACT: &str = "Use the Contact section";

/// Build a test server over the full application router
fn create_test_server_with(config: HatchConfig, mailer: Option<Arc<dyn Mailer>>) -> TestServer {
    let server_config = config.server.clone();
    let manager =
        Arc::new(HatchConfigManager::from_config(config).expect("Failed to build config manager"));
    let app = api::app(AppState::new(manager, mailer), &server_config);
    TestServer::new(app).expect("Failed to create test server")
}

fn create_test_server() -> TestServer {
    create_test_server_with(HatchConfig::default(), None)
}

fn server_with_mailer(mailer: impl Mailer + 'static) -> TestServer {
    create_test_server_with(HatchConfig::default(), Some(Arc::new(mailer)))
}

async fn ask(server: &TestServer, text: &str) -> String {
    let response = server
        .post("/api/chat")
        .json(&json!({ "messages": [{ "role": "user", "content": text }] }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    body["reply"].as_str().unwrap_or_default().to_string()
}

fn valid_contact() -> serde_json::Value {
    json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "company": "Analytical Engines",
        "message": "Hello\nWe need a model."
    })
}

// ============= Health Check Tests =============

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();

    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

// ============= Chat Tests =============

#[tokio::test]
async fn test_chat_services_question() {
    let server = create_test_server();
    let reply = ask(&server, "What services do you offer?").await;
    assert!(reply.starts_with(SERVICES));
}

#[tokio::test]
async fn test_chat_is_case_insensitive() {
    let server = create_test_server();
    assert!(ask(&server, "TELL ME ABOUT YOUR TECH").await.starts_with(TECHNOLOGY));
    assert!(ask(&server, "How do I Reach you?").await.starts_with(CONTACT));
}

#[tokio::test]
async fn test_chat_fallback() {
    let server = create_test_server();
    assert_eq!(ask(&server, "hello there").await, DEFAULT_FALLBACK);
}

#[tokio::test]
async fn test_chat_whitespace_only_gets_fallback() {
    let server = create_test_server();
    assert_eq!(ask(&server, "   \n\t ").await, DEFAULT_FALLBACK);
}

#[tokio::test]
async fn test_chat_first_listed_rule_wins() {
    let server = create_test_server();
    // Mentions both "email" (contact) and "services"; services is listed first
    let reply = ask(&server, "Can you email me about your services?").await;
    assert!(reply.starts_with(SERVICES));
}

#[tokio::test]
async fn test_chat_empty_messages_gets_fallback() {
    let server = create_test_server();

    let response = server.post("/api/chat").json(&json!({ "messages": [] })).await;
    response.assert_status_ok();
    response.assert_json(&json!({ "reply": DEFAULT_FALLBACK }));
}

#[tokio::test]
async fn test_chat_missing_messages_field_gets_fallback() {
    let server = create_test_server();

    let response = server.post("/api/chat").json(&json!({})).await;
    response.assert_status_ok();
    response.assert_json(&json!({ "reply": DEFAULT_FALLBACK }));
}

#[tokio::test]
async fn test_chat_uses_only_latest_user_message() {
    let server = create_test_server();

    let response = server
        .post("/api/chat")
        .json(&json!({
            "messages": [
                { "role": "user", "content": "What services do you offer?" },
                { "role": "assistant", "content": "Contact us by phone" },
                { "role": "user", "content": "What is your tech stack?" },
                { "role": "assistant", "content": "services services" }
            ]
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["reply"].as_str().unwrap().starts_with(TECHNOLOGY));
}

#[tokio::test]
async fn test_chat_no_user_message_gets_fallback() {
    let server = create_test_server();

    let response = server
        .post("/api/chat")
        .json(&json!({
            "messages": [{ "role": "assistant", "content": "What services do you offer?" }]
        }))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({ "reply": DEFAULT_FALLBACK }));
}

#[tokio::test]
async fn test_chat_malformed_json() {
    let server = create_test_server();

    let response = server
        .post("/api/chat")
        .text("{not json")
        .content_type("application/json")
        .await;

    response.assert_status_bad_request();
    response.assert_json(&json!({ "error": "Bad request" }));
}

#[tokio::test]
async fn test_chat_wrong_shape() {
    let server = create_test_server();

    let response = server
        .post("/api/chat")
        .json(&json!({ "messages": "what services?" }))
        .await;

    response.assert_status_bad_request();
    response.assert_json(&json!({ "error": "Bad request" }));
}

async fn chat_reply(server: &TestServer, body: serde_json::Value) -> String {
    let response = server.post("/api/chat").json(&body).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    body["reply"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn test_chat_message_without_role_is_not_a_user_turn() {
    let server = create_test_server();
    let reply = chat_reply(&server, json!({ "messages": [{ "content": "services" }] })).await;
    assert_eq!(reply, DEFAULT_FALLBACK);
}

#[tokio::test]
async fn test_chat_null_messages_gets_fallback() {
    let server = create_test_server();
    let reply = chat_reply(&server, json!({ "messages": null })).await;
    assert_eq!(reply, DEFAULT_FALLBACK);
}

#[tokio::test]
async fn test_chat_null_content_gets_fallback() {
    let server = create_test_server();
    let reply = chat_reply(
        &server,
        json!({
            "messages": [
                { "role": "user", "content": "What services do you offer?" },
                { "role": "user", "content": null }
            ]
        }),
    )
    .await;
    assert_eq!(reply, DEFAULT_FALLBACK);
}

#[tokio::test]
async fn test_chat_skips_non_object_entries() {
    let server = create_test_server();
    let reply = chat_reply(
        &server,
        json!({ "messages": ["hi", 42, { "role": "user", "content": "services" }, null] }),
    )
    .await;
    assert!(reply.starts_with(SERVICES));
}

#[tokio::test]
async fn test_chat_null_body_gets_fallback() {
    let server = create_test_server();
    let reply = chat_reply(&server, serde_json::Value::Null).await;
    assert_eq!(reply, DEFAULT_FALLBACK);
}

#[tokio::test]
async fn test_chat_configured_rules_come_first() {
    let mut config = HatchConfig::default();
    config.faq.rules.push(FaqRuleConfig {
        pattern: r"pric(e|ing)|services".to_string(),
        answer: "Pricing depends on scope.".to_string(),
    });
    config.faq.fallback = Some("Ask me anything about S-HATCH.".to_string());
    let server = create_test_server_with(config, None);

    assert_eq!(ask(&server, "What services do you sell?").await, "Pricing depends on scope.");
    assert!(ask(&server, "how to reach you").await.starts_with(CONTACT));
    assert_eq!(ask(&server, "good morning").await, "Ask me anything about S-HATCH.");
}

// ============= Contact Tests =============

#[tokio::test]
async fn test_contact_sends_email() {
    let mailer = RecordingMailer::new();
    let server = server_with_mailer(mailer.clone());

    let response = server.post("/api/contact").json(&valid_contact()).await;

    response.assert_status_ok();
    response.assert_json(&json!({ "message": "Email sent successfully!" }));

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "New Contact Form Submission from Ada Lovelace");
    assert!(sent[0].html.contains("Analytical Engines"));
    assert!(sent[0].html.contains("Hello<br>We need a model."));
    assert_eq!(sent[0].reply_to.email.to_string(), "ada@example.com");
}

#[tokio::test]
async fn test_contact_escapes_html() {
    let mailer = RecordingMailer::new();
    let server = server_with_mailer(mailer.clone());

    let response = server
        .post("/api/contact")
        .json(&json!({
            "name": "Mallory",
            "email": "mallory@example.com",
            "message": "<script>alert(1)</script>"
        }))
        .await;

    response.assert_status_ok();
    let sent = mailer.sent();
    let html = &sent[0].html;
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}

#[tokio::test]
async fn test_contact_missing_fields() {
    let mailer = RecordingMailer::new();
    let server = server_with_mailer(mailer.clone());

    for body in [
        json!({ "email": "ada@example.com", "message": "hi" }),
        json!({ "name": "Ada", "message": "hi" }),
        json!({ "name": "Ada", "email": "ada@example.com", "message": "   " }),
    ] {
        let response = server.post("/api/contact").json(&body).await;
        response.assert_status_bad_request();
        response.assert_json(&json!({ "error": "Name, email, and message are required" }));
    }

    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn test_contact_invalid_email() {
    let server = server_with_mailer(RecordingMailer::new());

    let response = server
        .post("/api/contact")
        .json(&json!({ "name": "Ada", "email": "not-an-email", "message": "hi" }))
        .await;

    response.assert_status_bad_request();
    response.assert_json(&json!({ "error": "Please provide a valid email address" }));
}

#[tokio::test]
async fn test_contact_malformed_json() {
    let server = server_with_mailer(RecordingMailer::new());

    let response = server
        .post("/api/contact")
        .text("[1, 2, 3]")
        .content_type("application/json")
        .await;

    response.assert_status_bad_request();
    response.assert_json(&json!({ "error": "Bad request" }));
}

#[tokio::test]
async fn test_contact_without_mailer() {
    let server = create_test_server();

    let response = server.post("/api/contact").json(&valid_contact()).await;

    response.assert_status_internal_server_error();
    response.assert_json(&json!({
        "error": "Email configuration is missing. Please check environment variables."
    }));
}

#[tokio::test]
async fn test_contact_auth_failure() {
    let server = server_with_mailer(FailingMailer::new(FailureKind::Auth));

    let response = server.post("/api/contact").json(&valid_contact()).await;

    response.assert_status_internal_server_error();
    response.assert_json(&json!({
        "error": "Email authentication failed. Please check your SMTP credentials."
    }));
}

#[tokio::test]
async fn test_contact_network_failure() {
    let server = server_with_mailer(FailingMailer::new(FailureKind::Network));

    let response = server.post("/api/contact").json(&valid_contact()).await;

    response.assert_status_internal_server_error();
    response.assert_json(&json!({
        "error": "Network error. Please check your internet connection."
    }));
}

#[tokio::test]
async fn test_contact_other_failure() {
    let server = server_with_mailer(FailingMailer::new(FailureKind::Other));

    let response = server.post("/api/contact").json(&valid_contact()).await;

    response.assert_status_internal_server_error();
    response.assert_json(&json!({ "error": "Email error: mailbox unavailable" }));
}

// ============= Documentation Tests =============

#[tokio::test]
async fn test_openapi_document() {
    let server = create_test_server();

    let response = server.get("/api/openapi.json").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert!(body["paths"]["/api/chat"]["post"].is_object());
    assert!(body["paths"]["/api/contact"]["post"].is_object());
}

// ============= Middleware Tests =============

#[tokio::test]
async fn test_body_limit() {
    let mut config = HatchConfig::default();
    config.server.body_limit_bytes = 128;
    let server = create_test_server_with(config, None);

    let long = "a".repeat(1024);
    let response = server
        .post("/api/chat")
        .json(&json!({ "messages": [{ "role": "user", "content": long }] }))
        .await;

    response.assert_status(axum::http::StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_body_limit_on_contact() {
    let mut config = HatchConfig::default();
    config.server.body_limit_bytes = 128;
    let server = create_test_server_with(config, Some(Arc::new(RecordingMailer::new())));

    let response = server
        .post("/api/contact")
        .json(&json!({
            "name": "Ada",
            "email": "ada@example.com",
            "message": "a".repeat(1024)
        }))
        .await;

    response.assert_status(axum::http::StatusCode::PAYLOAD_TOO_LARGE);
}
