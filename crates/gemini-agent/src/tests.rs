use crate::types::GenerateRequest;
use crate::*;
use mockito::Matcher;
use serde_json::json;

const MODEL: &str = "gemini-test";
const ENDPOINT: &str = "/v1beta/models/gemini-test:generateContent";

fn candidate(text: &str) -> String {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] }
        }]
    })
    .to_string()
}

// ─── Reply decoding ───────────────────────────────────────────────────────

#[test]
fn decodes_full_reply() {
    let parsed = ParsedCommand::from_reply_text(
        r#"{"assistant_message":"Watching Close","spec":{"field":"Close","operator":">","value":"100","value_type":"number"}}"#,
    )
    .unwrap();
    assert_eq!(parsed.assistant_message, "Watching Close");
    assert_eq!(
        parsed.spec,
        RawSpec {
            field: "Close".into(),
            operator: ">".into(),
            value: "100".into(),
            value_type: "number".into(),
        }
    );
}

#[test]
fn missing_members_take_defaults() {
    let parsed = ParsedCommand::from_reply_text(r#"{"spec":{"field":"Close","value":100}}"#).unwrap();
    assert_eq!(parsed.assistant_message, DEFAULT_ASSISTANT_MESSAGE);
    assert_eq!(parsed.spec.operator, "");
    assert_eq!(parsed.spec.value, "100");
    assert_eq!(parsed.spec.value_type, "string");
}

#[test]
fn missing_spec_is_an_error() {
    let err = ParsedCommand::from_reply_text(r#"{"assistant_message":"hm"}"#).unwrap_err();
    assert!(matches!(err, GeminiError::MissingSpec));
    let err = ParsedCommand::from_reply_text(r#"{"spec":"Close > 100"}"#).unwrap_err();
    assert!(matches!(err, GeminiError::MissingSpec));
}

#[test]
fn non_json_reply_is_an_error() {
    let err = ParsedCommand::from_reply_text("Sure! Close > 100").unwrap_err();
    assert!(matches!(err, GeminiError::InvalidJson { .. }));
}

#[test]
fn request_serializes_generation_config() {
    let body = serde_json::to_value(GenerateRequest::json_prompt("hi", 0.2)).unwrap();
    assert_eq!(body["contents"][0]["role"], "user");
    assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    assert!(body["generationConfig"]["temperature"].as_f64().unwrap() > 0.19);
}

#[test]
fn prompt_carries_command_and_row() {
    let prompt = condition_prompt("close above 100", r#"{"Close":"95"}"#);
    assert!(prompt.contains("User command: close above 100"));
    assert!(prompt.contains(r#"CSV row fields and values: {"Close":"95"}"#));
}

// ─── HTTP ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn parse_condition_posts_prompt_and_decodes_reply() {
    let mut server = mockito::Server::new_async().await;
    let reply = r#"{"assistant_message":"OK","spec":{"field":"Close","operator":">=","value":"21,700","value_type":"number"}}"#;
    let mock = server
        .mock("POST", ENDPOINT)
        .match_header("x-goog-api-key", "secret")
        .match_body(Matcher::PartialJson(json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(candidate(reply))
        .create_async()
        .await;

    let client = GeminiClient::new(Some("secret".into()), MODEL).with_base_url(server.url());
    let parsed = client
        .parse_condition("close at least 21,700", r#"{"Close":"21,650"}"#)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(parsed.spec.operator, ">=");
    assert_eq!(parsed.spec.value, "21,700");
}

#[tokio::test]
async fn upstream_error_status_is_reported() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", ENDPOINT)
        .with_status(429)
        .with_body("quota exceeded")
        .create_async()
        .await;

    let client = GeminiClient::new(Some("k".into()), MODEL).with_base_url(server.url());
    let err = client.parse_condition("x", "{}").await.unwrap_err();
    match err {
        GeminiError::Status { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "quota exceeded");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn empty_candidates_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", ENDPOINT)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"candidates":[]}"#)
        .create_async()
        .await;

    let client = GeminiClient::new(Some("k".into()), MODEL).with_base_url(server.url());
    let err = client.parse_condition("x", "{}").await.unwrap_err();
    assert!(matches!(err, GeminiError::EmptyReply));
}

#[tokio::test]
async fn missing_api_key_fails_without_request() {
    let client = GeminiClient::new(Some("  ".into()), MODEL).with_base_url("http://127.0.0.1:9");
    assert!(!client.has_api_key());
    let err = client.parse_condition("x", "{}").await.unwrap_err();
    assert!(matches!(err, GeminiError::MissingApiKey));
}
