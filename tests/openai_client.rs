//! Integration tests for the direct chat-completions client
//!
//! Uses wiremock to stand in for the hosted completions API and verifies the
//! request body, authentication header, and every failure mapping.

use chatrelay::client::{CompletionClient, OpenAiClient};
use chatrelay::config::Config;
use chatrelay::error::CompletionError;
use chatrelay::message::Message;
use chatrelay::router::ModelKey;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OpenAiClient {
    let config: Config = format!(
        r#"
[upstream]
base_url = "{}/v1"
api_key = "sk-test"
max_completion_tokens = 256

[models]
chat = "chat-model"
reason = "reason-model"
search = "search-model"
"#,
        server.uri()
    )
    .parse()
    .expect("should parse test config");
    OpenAiClient::from_config(&config).expect("should build client")
}

fn completion(content: serde_json::Value) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ]
    })
}

#[tokio::test]
async fn test_request_carries_mapped_model_and_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_json(json!({
            "model": "reason-model",
            "messages": [
                {"role": "system", "content": "You are a helpful assistant."},
                {"role": "user", "content": "Prove it."}
            ],
            "max_tokens": 256
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!("Done."))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let messages = vec![
        Message::system("You are a helpful assistant."),
        Message::user("Prove it."),
    ];

    let reply = assert_ok!(client.generate(&messages, ModelKey::Reason).await);
    assert_eq!(reply, Message::assistant("Done."));
}

#[tokio::test]
async fn test_each_model_key_maps_to_configured_model() {
    let server = MockServer::start().await;
    for model in ["chat-model", "reason-model", "search-model"] {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(wiremock::matchers::body_partial_json(json!({"model": model})))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!(model))))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client_for(&server);
    let messages = [Message::user("hi")];
    for (key, expected) in [
        (ModelKey::Chat, "chat-model"),
        (ModelKey::Reason, "reason-model"),
        (ModelKey::Search, "search-model"),
    ] {
        let reply = client.generate(&messages, key).await.unwrap();
        assert_eq!(reply.content, expected);
    }
}

#[tokio::test]
async fn test_non_success_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = assert_err!(client.generate(&[Message::user("hi")], ModelKey::Chat).await);

    assert_eq!(err, CompletionError::Status { status: 500 });
    assert_eq!(err.to_string(), "Server responded with status: 500");
}

#[tokio::test]
async fn test_malformed_payload_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.generate(&[Message::user("hi")], ModelKey::Chat).await;
    assert!(matches!(result, Err(CompletionError::MalformedResponse { .. })));
}

#[tokio::test]
async fn test_empty_choices_are_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.generate(&[Message::user("hi")], ModelKey::Search).await;
    assert_eq!(result, Err(CompletionError::NoChoices));
}

#[tokio::test]
async fn test_null_content_becomes_empty_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!(null))))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let reply = client
        .generate(&[Message::user("hi")], ModelKey::Chat)
        .await
        .unwrap();
    assert_eq!(reply, Message::assistant(""));
}

#[tokio::test]
async fn test_empty_conversation_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!("unused"))))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.generate(&[], ModelKey::Chat).await;
    assert_eq!(result, Err(CompletionError::EmptyConversation));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_request_error() {
    // Bind and drop a listener to get a port nothing is listening on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config: Config = format!(
        "[upstream]\nbase_url = \"http://{}/v1\"\napi_key = \"sk-test\"\n",
        addr
    )
    .parse()
    .unwrap();
    let client = OpenAiClient::from_config(&config).unwrap();

    let result = client.generate(&[Message::user("hi")], ModelKey::Chat).await;
    assert!(matches!(result, Err(CompletionError::Request { .. })));
}
