use brewlog_ai::catalog::{ModelCatalog, Provider};
use brewlog_ai::errors::AppError;
use brewlog_ai::providers::{ChatAdapter, ChatMessage, CompletionRequest, GeminiAdapter, TokenUsage};
use reqwest::Client;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion_request(messages: Vec<ChatMessage>, system: Option<&str>) -> CompletionRequest {
    CompletionRequest {
        provider: Provider::Gemini,
        model: "gemini-2.0-flash".to_string(),
        api_key: "test-api-key".to_string(),
        messages,
        system: system.map(str::to_string),
    }
}

#[tokio::test]
async fn test_gemini_complete_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(query_param("key", "test-api-key"))
        .and(body_partial_json(json!({
            "contents": [
                {"role": "user", "parts": [{"text": "What roaster is this?"}]},
                {"role": "model", "parts": [{"text": "I need a photo."}]},
                {"role": "user", "parts": [{"text": "Here it is."}]}
            ],
            "generationConfig": {"maxOutputTokens": 8192}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "Counter Culture Coffee"}]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {
                "promptTokenCount": 12,
                "candidatesTokenCount": 5,
                "totalTokenCount": 17
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let catalog = ModelCatalog::new();
    let model = catalog.lookup("gemini-2.0-flash").unwrap();
    let adapter = GeminiAdapter::new(mock_server.uri(), Client::new());

    let request = completion_request(
        vec![
            ChatMessage::user("What roaster is this?"),
            ChatMessage::assistant("I need a photo."),
            ChatMessage::user("Here it is."),
        ],
        None,
    );

    let response = adapter.complete(model, &request).await.unwrap();

    assert_eq!(response.text, "Counter Culture Coffee");
    assert_eq!(response.model, "gemini-2.0-flash");
    assert_eq!(
        response.usage,
        Some(TokenUsage {
            input_tokens: 12,
            output_tokens: 5
        })
    );
}

#[tokio::test]
async fn test_gemini_system_prompt_becomes_system_instruction() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(body_partial_json(json!({
            "systemInstruction": {
                "parts": [{"text": "You parse brewing notes."}]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "{}"}]}
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let catalog = ModelCatalog::new();
    let model = catalog.lookup("gemini-2.0-flash").unwrap();
    let adapter = GeminiAdapter::new(mock_server.uri(), Client::new());

    let request = completion_request(
        vec![ChatMessage::user("18 grams in, 280 out")],
        Some("You parse brewing notes."),
    );

    adapter.complete(model, &request).await.unwrap();
}

#[tokio::test]
async fn test_gemini_image_rides_as_inline_data() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "{\"roaster\": null}"}]}
            }]
        })))
        .mount(&mock_server)
        .await;

    let catalog = ModelCatalog::new();
    let model = catalog.lookup("gemini-2.0-flash").unwrap();
    let adapter = GeminiAdapter::new(mock_server.uri(), Client::new());

    let request = completion_request(
        vec![ChatMessage::user_with_image(
            "Identify this bag.",
            "aGVsbG8gY29mZmVl",
            "image/jpeg",
        )],
        None,
    );

    adapter.complete(model, &request).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();

    // Image first, text second, payload byte-for-byte untouched.
    let parts = &body["contents"][0]["parts"];
    assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
    assert_eq!(parts[0]["inlineData"]["data"], "aGVsbG8gY29mZmVl");
    assert_eq!(parts[1]["text"], "Identify this bag.");
    // No system prompt, no systemInstruction key at all.
    assert!(body.get("systemInstruction").is_none());
}

#[tokio::test]
async fn test_gemini_error_envelope_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        })))
        .mount(&mock_server)
        .await;

    let catalog = ModelCatalog::new();
    let model = catalog.lookup("gemini-2.0-flash").unwrap();
    let adapter = GeminiAdapter::new(mock_server.uri(), Client::new());

    let request = completion_request(vec![ChatMessage::user("Hello")], None);
    let result = adapter.complete(model, &request).await;

    match result {
        Err(AppError::Provider { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "API key not valid. Please pass a valid API key.");
        }
        other => panic!("Expected Provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_gemini_non_json_error_body_kept_raw() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
        .mount(&mock_server)
        .await;

    let catalog = ModelCatalog::new();
    let model = catalog.lookup("gemini-2.0-flash").unwrap();
    let adapter = GeminiAdapter::new(mock_server.uri(), Client::new());

    let request = completion_request(vec![ChatMessage::user("Hello")], None);
    let result = adapter.complete(model, &request).await;

    match result {
        Err(AppError::Provider { status, message }) => {
            assert_eq!(status, 503);
            assert!(message.contains("Gemini API error: upstream overloaded"));
        }
        other => panic!("Expected Provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_gemini_empty_candidates_is_empty_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": []
        })))
        .mount(&mock_server)
        .await;

    let catalog = ModelCatalog::new();
    let model = catalog.lookup("gemini-2.0-flash").unwrap();
    let adapter = GeminiAdapter::new(mock_server.uri(), Client::new());

    let request = completion_request(vec![ChatMessage::user("Hello")], None);
    let result = adapter.complete(model, &request).await;

    assert!(matches!(result, Err(AppError::EmptyResponse(_))));
    assert_eq!(
        result.unwrap_err().to_string(),
        "Empty response from Gemini"
    );
}

#[tokio::test]
async fn test_gemini_missing_usage_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "ok"}]}
            }]
        })))
        .mount(&mock_server)
        .await;

    let catalog = ModelCatalog::new();
    let model = catalog.lookup("gemini-2.0-flash").unwrap();
    let adapter = GeminiAdapter::new(mock_server.uri(), Client::new());

    let request = completion_request(vec![ChatMessage::user("Hello")], None);
    let response = adapter.complete(model, &request).await.unwrap();

    assert_eq!(response.text, "ok");
    assert!(response.usage.is_none());
}

#[tokio::test]
async fn test_gemini_partial_usage_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "ok"}]}
            }],
            "usageMetadata": {"promptTokenCount": 12}
        })))
        .mount(&mock_server)
        .await;

    let catalog = ModelCatalog::new();
    let model = catalog.lookup("gemini-2.0-flash").unwrap();
    let adapter = GeminiAdapter::new(mock_server.uri(), Client::new());

    let request = completion_request(vec![ChatMessage::user("Hello")], None);
    let response = adapter.complete(model, &request).await.unwrap();

    assert!(response.usage.is_none());
}
