use brewlog_ai::catalog::{ModelCatalog, Provider};
use brewlog_ai::errors::AppError;
use brewlog_ai::providers::{
    ChatAdapter, ChatMessage, CompletionRequest, OpenAIAdapter, TokenUsage,
};
use reqwest::Client;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion_request(messages: Vec<ChatMessage>, system: Option<&str>) -> CompletionRequest {
    CompletionRequest {
        provider: Provider::OpenAi,
        model: "gpt-4o".to_string(),
        api_key: "test-api-key".to_string(),
        messages,
        system: system.map(str::to_string),
    }
}

#[tokio::test]
async fn test_openai_complete_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-api-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "max_tokens": 16384,
            "messages": [
                {"role": "user", "content": "Hello"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-01",
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hi! Ready to brew?"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 9, "completion_tokens": 7, "total_tokens": 16}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let catalog = ModelCatalog::new();
    let model = catalog.lookup("gpt-4o").unwrap();
    let adapter = OpenAIAdapter::new(mock_server.uri(), Client::new());

    let request = completion_request(vec![ChatMessage::user("Hello")], None);
    let response = adapter.complete(model, &request).await.unwrap();

    assert_eq!(response.text, "Hi! Ready to brew?");
    assert_eq!(response.model, "gpt-4o");
    assert_eq!(
        response.usage,
        Some(TokenUsage {
            input_tokens: 9,
            output_tokens: 7
        })
    );
}

#[tokio::test]
async fn test_openai_system_becomes_leading_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-02",
            "model": "gpt-4o",
            "choices": [{
                "message": {"role": "assistant", "content": "{}"},
                "finish_reason": "stop"
            }]
        })))
        .mount(&mock_server)
        .await;

    let catalog = ModelCatalog::new();
    let model = catalog.lookup("gpt-4o").unwrap();
    let adapter = OpenAIAdapter::new(mock_server.uri(), Client::new());

    let request = completion_request(
        vec![ChatMessage::user("18 grams in, 280 out")],
        Some("You parse brewing notes."),
    );
    adapter.complete(model, &request).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();

    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[0]["content"], "You parse brewing notes.");
    assert_eq!(messages[1]["role"], "user");
}

#[tokio::test]
async fn test_openai_image_becomes_data_url_part() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-03",
            "model": "gpt-4o",
            "choices": [{
                "message": {"role": "assistant", "content": "{\"roaster\": null}"},
                "finish_reason": "stop"
            }]
        })))
        .mount(&mock_server)
        .await;

    let catalog = ModelCatalog::new();
    let model = catalog.lookup("gpt-4o").unwrap();
    let adapter = OpenAIAdapter::new(mock_server.uri(), Client::new());

    let request = completion_request(
        vec![ChatMessage::user_with_image(
            "Identify this bag.",
            "aGVsbG8gY29mZmVl",
            "image/webp",
        )],
        None,
    );
    adapter.complete(model, &request).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();

    let parts = body["messages"][0]["content"].as_array().unwrap();
    assert_eq!(parts[0]["type"], "image_url");
    assert_eq!(
        parts[0]["image_url"]["url"],
        "data:image/webp;base64,aGVsbG8gY29mZmVl"
    );
    assert_eq!(parts[1]["type"], "text");
    assert_eq!(parts[1]["text"], "Identify this bag.");
}

#[tokio::test]
async fn test_openai_plain_text_stays_a_string() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-04",
            "model": "gpt-4o",
            "choices": [{
                "message": {"role": "assistant", "content": "ok"},
                "finish_reason": "stop"
            }]
        })))
        .mount(&mock_server)
        .await;

    let catalog = ModelCatalog::new();
    let model = catalog.lookup("gpt-4o").unwrap();
    let adapter = OpenAIAdapter::new(mock_server.uri(), Client::new());

    let request = completion_request(vec![ChatMessage::user("Hello")], None);
    adapter.complete(model, &request).await.unwrap();

    // Text-only messages serialize as a bare string, not a part array.
    let requests = mock_server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert!(body["messages"][0]["content"].is_string());
}

#[tokio::test]
async fn test_openai_error_envelope_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {
                "message": "Rate limit reached for gpt-4o",
                "type": "tokens",
                "code": "rate_limit_exceeded"
            }
        })))
        .mount(&mock_server)
        .await;

    let catalog = ModelCatalog::new();
    let model = catalog.lookup("gpt-4o").unwrap();
    let adapter = OpenAIAdapter::new(mock_server.uri(), Client::new());

    let request = completion_request(vec![ChatMessage::user("Hello")], None);
    let result = adapter.complete(model, &request).await;

    match result {
        Err(AppError::Provider { status, message }) => {
            assert_eq!(status, 429);
            assert_eq!(message, "Rate limit reached for gpt-4o");
        }
        other => panic!("Expected Provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_openai_non_json_error_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&mock_server)
        .await;

    let catalog = ModelCatalog::new();
    let model = catalog.lookup("gpt-4o").unwrap();
    let adapter = OpenAIAdapter::new(mock_server.uri(), Client::new());

    let request = completion_request(vec![ChatMessage::user("Hello")], None);
    let result = adapter.complete(model, &request).await;

    match result {
        Err(AppError::Provider { status, message }) => {
            assert_eq!(status, 502);
            assert_eq!(message, "OpenAI API error: bad gateway");
        }
        other => panic!("Expected Provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_openai_empty_choices_is_empty_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-05",
            "model": "gpt-4o",
            "choices": []
        })))
        .mount(&mock_server)
        .await;

    let catalog = ModelCatalog::new();
    let model = catalog.lookup("gpt-4o").unwrap();
    let adapter = OpenAIAdapter::new(mock_server.uri(), Client::new());

    let request = completion_request(vec![ChatMessage::user("Hello")], None);
    let result = adapter.complete(model, &request).await;

    assert_eq!(
        result.unwrap_err().to_string(),
        "Empty response from OpenAI"
    );
}

#[tokio::test]
async fn test_openai_null_content_is_empty_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-06",
            "model": "gpt-4o",
            "choices": [{
                "message": {"role": "assistant", "content": null},
                "finish_reason": "stop"
            }]
        })))
        .mount(&mock_server)
        .await;

    let catalog = ModelCatalog::new();
    let model = catalog.lookup("gpt-4o").unwrap();
    let adapter = OpenAIAdapter::new(mock_server.uri(), Client::new());

    let request = completion_request(vec![ChatMessage::user("Hello")], None);
    let result = adapter.complete(model, &request).await;

    assert!(matches!(result, Err(AppError::EmptyResponse(_))));
}

#[tokio::test]
async fn test_openai_partial_usage_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-08",
            "model": "gpt-4o",
            "choices": [{
                "message": {"role": "assistant", "content": "ok"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 9}
        })))
        .mount(&mock_server)
        .await;

    let catalog = ModelCatalog::new();
    let model = catalog.lookup("gpt-4o").unwrap();
    let adapter = OpenAIAdapter::new(mock_server.uri(), Client::new());

    let request = completion_request(vec![ChatMessage::user("Hello")], None);
    let response = adapter.complete(model, &request).await.unwrap();

    assert!(response.usage.is_none());
}

#[tokio::test]
async fn test_openai_missing_usage_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-07",
            "model": "gpt-4o",
            "choices": [{
                "message": {"role": "assistant", "content": "ok"},
                "finish_reason": "stop"
            }]
        })))
        .mount(&mock_server)
        .await;

    let catalog = ModelCatalog::new();
    let model = catalog.lookup("gpt-4o").unwrap();
    let adapter = OpenAIAdapter::new(mock_server.uri(), Client::new());

    let request = completion_request(vec![ChatMessage::user("Hello")], None);
    let response = adapter.complete(model, &request).await.unwrap();

    assert!(response.usage.is_none());
}
