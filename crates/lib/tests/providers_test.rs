//! # Provider Tests
//!
//! Exercises the Gemini and local AI providers and the grounded search provider
//! against mock HTTP servers.

use seo_audit::{
    errors::PromptError,
    providers::{
        ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider},
        search::{grounded::GroundedSearchProvider, SearchProvider},
    },
    ErrorKind,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gemini_reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]}
        }]
    })
}

#[tokio::test]
async fn test_gemini_sends_system_instruction_and_key() {
    // --- 1. Arrange ---
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/test:generateContent"))
        .and(query_param("key", "secret"))
        .and(body_partial_json(json!({
            "systemInstruction": {"parts": [{"text": "be an auditor"}]},
            "contents": [{"role": "user", "parts": [{"text": "audit this"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("{\"ok\": true}")))
        .expect(1)
        .mount(&server)
        .await;
    let provider = GeminiProvider::new(
        format!("{}/v1beta/models/test:generateContent", server.uri()),
        "secret".to_string(),
    )
    .unwrap();

    // --- 2. Act ---
    let response = provider.generate("be an auditor", "audit this").await.unwrap();

    // --- 3. Assert ---
    assert_eq!(response, "{\"ok\": true}");
}

#[tokio::test]
async fn test_gemini_error_status_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exhausted"))
        .mount(&server)
        .await;
    let provider = GeminiProvider::new(server.uri(), "secret".to_string()).unwrap();

    let err = provider.generate("sys", "user").await.unwrap_err();

    match err {
        PromptError::AiApi(detail) => {
            assert!(detail.contains("429"));
            assert!(detail.contains("quota exhausted"));
        }
        other => panic!("Expected AiApi error, but got {other:?}"),
    }
}

#[tokio::test]
async fn test_local_provider_uses_chat_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer local-key"))
        .and(body_partial_json(json!({
            "model": "llama",
            "messages": [
                {"role": "system", "content": "sys"},
                {"role": "user", "content": "user"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "local answer"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let provider = LocalAiProvider::new(
        format!("{}/v1/chat/completions", server.uri()),
        Some("local-key".to_string()),
        Some("llama".to_string()),
    )
    .unwrap();

    let response = provider.generate("sys", "user").await.unwrap();

    assert_eq!(response, "local answer");
}

#[tokio::test]
async fn test_local_provider_drops_reasoning_blocks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "<think>Check the title length first.</think>\n{\"ok\": true}"
                },
                "finish_reason": "stop"
            }]
        })))
        .mount(&server)
        .await;
    let provider =
        LocalAiProvider::new(format!("{}/v1/chat/completions", server.uri()), None, None)
            .unwrap();

    let response = provider.generate("sys", "user").await.unwrap();

    assert_eq!(response, "{\"ok\": true}");
}

#[tokio::test]
async fn test_local_provider_without_choices_is_an_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;
    let provider =
        LocalAiProvider::new(format!("{}/v1/chat/completions", server.uri()), None, None)
            .unwrap();

    let err = provider.generate("sys", "user").await.unwrap_err();

    assert!(matches!(err, PromptError::AiApi(ref detail) if detail.contains("no choices")));
}

#[tokio::test]
async fn test_grounded_search_enables_google_search_tool() {
    // --- 1. Arrange ---
    let server = MockServer::start().await;
    let answer = r#"```json
{"query": "ceramic mugs", "results": [
  {"title": "Best Ceramic Mugs", "url": "https://mugs.example.org", "snippet": "Top picks"},
  {"title": "Mug Buying Guide", "url": "https://guide.example.org", "snippet": "How to choose"}
]}
```"#;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "ceramic mugs"}]}],
            "tools": [{"google_search": {}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(answer)))
        .expect(1)
        .mount(&server)
        .await;
    let provider = GeminiProvider::new(server.uri(), "secret".to_string())
        .unwrap()
        .with_google_search();
    let search = GroundedSearchProvider::new(Box::new(provider));

    // --- 2. Act ---
    let results = search.search("ceramic mugs").await.unwrap();

    // --- 3. Assert ---
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].url, "https://mugs.example.org");
    assert_eq!(results[1].title, "Mug Buying Guide");
}

#[tokio::test]
async fn test_grounded_search_failure_is_search_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend down"))
        .mount(&server)
        .await;
    let provider = GeminiProvider::new(server.uri(), "secret".to_string())
        .unwrap()
        .with_google_search();
    let search = GroundedSearchProvider::new(Box::new(provider));

    let err = search.search("ceramic mugs").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SearchFailed);
    assert!(err.to_string().contains("'ceramic mugs'"));
}
