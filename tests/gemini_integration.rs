use serde_json::json;

use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chatboard::config::ChatConfig;
use chatboard::credentials::ApiKey;
use chatboard::error::{error_kind, ChatboardError};
use chatboard::providers::{GeminiProvider, Message, Provider};

fn provider_for(server: &MockServer) -> GeminiProvider {
    let cfg = ChatConfig {
        api_base: format!("{}/", server.uri()),
        model: "gemini-1.5-flash".to_string(),
        ..Default::default()
    };
    GeminiProvider::new(&cfg, ApiKey::new("test-key").unwrap()).unwrap()
}

/// Full history goes out with Gemini role names and the key header
#[tokio::test]
async fn test_generate_content_sends_history_and_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [
                {"role": "user", "parts": [{"text": "Hi"}]},
                {"role": "model", "parts": [{"text": "Hello!"}]},
                {"role": "user", "parts": [{"text": "How are you?"}]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Fine, "}, {"text": "thanks."}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 3}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let history = vec![
        Message::user("Hi"),
        Message::assistant("Hello!"),
        Message::user("How are you?"),
    ];
    let completion = provider.complete(&history).await.unwrap();

    assert_eq!(completion.message.content, "Fine, thanks.");
    let usage = completion.usage.unwrap();
    assert_eq!(usage.prompt_tokens, 12);
    assert_eq!(usage.completion_tokens, 3);
}

#[tokio::test]
async fn test_forbidden_maps_to_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .complete(&[Message::user("Hi")])
        .await
        .unwrap_err();
    assert!(matches!(
        error_kind(&err),
        Some(ChatboardError::Authentication(_))
    ));
}

#[tokio::test]
async fn test_invalid_key_400_maps_to_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT",
                "details": [{"reason": "API_KEY_INVALID"}]
            }
        })))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .complete(&[Message::user("Hi")])
        .await
        .unwrap_err();
    assert!(matches!(
        error_kind(&err),
        Some(ChatboardError::Authentication(_))
    ));
}

#[tokio::test]
async fn test_server_error_maps_to_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .complete(&[Message::user("Hi")])
        .await
        .unwrap_err();
    assert!(matches!(error_kind(&err), Some(ChatboardError::Provider(_))));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_blocked_prompt_reports_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        })))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .complete(&[Message::user("Hi")])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("SAFETY"));
}

#[tokio::test]
async fn test_unreachable_endpoint_maps_to_network_error() {
    let cfg = ChatConfig {
        api_base: "http://127.0.0.1:9".to_string(),
        ..Default::default()
    };
    let provider = GeminiProvider::new(&cfg, ApiKey::new("k").unwrap()).unwrap();

    let err = provider.complete(&[Message::user("Hi")]).await.unwrap_err();
    assert!(matches!(error_kind(&err), Some(ChatboardError::Network(_))));
}

#[tokio::test]
async fn test_list_models_follows_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{
                "name": "models/text-embedding-004",
                "supportedGenerationMethods": ["embedContent"]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{
                "name": "models/gemini-1.5-flash",
                "displayName": "Gemini 1.5 Flash",
                "supportedGenerationMethods": ["generateContent"]
            }],
            "nextPageToken": "page-2"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let models = provider_for(&server).list_models().await.unwrap();
    let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["gemini-1.5-flash", "text-embedding-004"]);
    assert!(models[0].supports_generate_content());
    assert!(!models[1].supports_generate_content());
    assert_eq!(models[1].display_name, "text-embedding-004");
}
