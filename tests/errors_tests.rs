use brewlog_ai::errors::*;
use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::Value;

async fn response_parts(error: AppError) -> (StatusCode, Value) {
    let response = error.into_response();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

#[test]
fn test_app_error_constructors() {
    assert!(matches!(AppError::bad_request("x"), AppError::BadRequest(_)));
    assert!(matches!(AppError::model_not_found("m"), AppError::ModelNotFound(_)));
    assert!(matches!(AppError::config("c"), AppError::Config(_)));
    assert!(matches!(
        AppError::provider_error(429, "slow down"),
        AppError::Provider { status: 429, .. }
    ));
    assert!(matches!(AppError::internal("i"), AppError::Internal(_)));
}

#[test]
fn test_error_display() {
    assert_eq!(
        AppError::BadRequest("transcript is required".to_string()).to_string(),
        "Bad request: transcript is required"
    );
    assert_eq!(
        AppError::ModelNotFound("gpt-99".to_string()).to_string(),
        "Unknown model: gpt-99"
    );
    assert_eq!(
        AppError::VisionNotSupported("gpt-3.5-turbo".to_string()).to_string(),
        "Model gpt-3.5-turbo does not support image input"
    );
    assert_eq!(
        AppError::MissingUserApiKey("Google".to_string()).to_string(),
        "No API key configured for Google"
    );
    assert_eq!(
        AppError::EmptyResponse("Gemini".to_string()).to_string(),
        "Empty response from Gemini"
    );
    assert_eq!(
        AppError::NoImageProduced("OpenAI".to_string()).to_string(),
        "OpenAI returned no image"
    );
    assert_eq!(
        AppError::NoStructuredData.to_string(),
        "No structured data found in model response"
    );
}

#[tokio::test]
async fn test_caller_mistakes_map_to_400() {
    for error in [
        AppError::bad_request("imageBase64 is required"),
        AppError::model_not_found("gpt-99"),
        AppError::VisionNotSupported("gpt-3.5-turbo".to_string()),
        AppError::MissingUserApiKey("Google".to_string()),
    ] {
        let (status, _) = response_parts(error).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_server_side_failures_map_to_500() {
    for error in [
        AppError::config("No AI provider key configured on the server"),
        AppError::EmptyResponse("Gemini".to_string()),
        AppError::NoStructuredData,
        AppError::MalformedStructuredData("expected value".to_string()),
        AppError::NoImageProduced("Google".to_string()),
        AppError::internal("boom"),
    ] {
        let (status, _) = response_parts(error).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}

#[tokio::test]
async fn test_provider_status_is_preserved() {
    let (status, _) = response_parts(AppError::provider_error(429, "rate limited")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let (status, _) = response_parts(AppError::provider_error(401, "bad key")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Nonsense statuses collapse to 500 instead of panicking.
    let (status, _) = response_parts(AppError::provider_error(1, "weird")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_error_body_is_single_string_field() {
    let (_, body) = response_parts(AppError::bad_request("transcript is required")).await;

    assert_eq!(body["error"], "Bad request: transcript is required");
    assert_eq!(body.as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn test_image_error_body_text() {
    let (status, body) = response_parts(AppError::provider_error(
        400,
        "Unable to generate this image. Try refining the description.",
    ))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Try refining the description"));
}

#[test]
fn test_from_anyhow_error() {
    let anyhow_error = anyhow::anyhow!("settings store unavailable");
    let app_error = AppError::from(anyhow_error);

    assert!(matches!(app_error, AppError::Internal(_)));
    assert!(app_error.to_string().contains("settings store unavailable"));
}

#[test]
fn test_app_result_type_alias() {
    fn ok() -> AppResult<&'static str> {
        Ok("fine")
    }
    fn err() -> AppResult<&'static str> {
        Err(AppError::bad_request("nope"))
    }

    assert!(ok().is_ok());
    assert!(err().is_err());
}
