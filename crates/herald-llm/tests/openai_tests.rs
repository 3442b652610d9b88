//! HTTP-level tests for the OpenAI-compatible client

use herald_domain::traits::{CompletionService, DeltaStream, ModerationService};
use herald_domain::{CompletionRequest, PromptPayload};
use herald_llm::{LlmError, OpenAiClient};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> OpenAiClient {
    OpenAiClient::new(server.uri(), "test-key").unwrap()
}

fn request() -> CompletionRequest {
    CompletionRequest::new("gpt-4o", PromptPayload::new("Tell me".to_string()), 512)
}

fn sse_body(deltas: &[&str], done: bool) -> String {
    let mut body = String::new();
    body.push_str("data: {\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"}}]}\n\n");
    for delta in deltas {
        let chunk = serde_json::json!({
            "choices": [{ "index": 0, "delta": { "content": delta } }]
        });
        body.push_str(&format!("data: {}\n\n", chunk));
    }
    if done {
        body.push_str("data: [DONE]\n\n");
    }
    body
}

async fn collect<S: DeltaStream>(stream: &mut S) -> (Vec<String>, Option<String>) {
    let mut texts = Vec::new();
    while let Some(item) = stream.next_delta().await {
        match item {
            Ok(chunk) => texts.push(chunk.text().to_string()),
            Err(e) => return (texts, Some(e.to_string())),
        }
    }
    (texts, None)
}

#[tokio::test]
async fn test_moderation_parses_verdicts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/moderations"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({ "input": "hello there" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "modr-1",
            "model": "omni-moderation-latest",
            "results": [{
                "flagged": true,
                "categories": { "violence": true, "hate": false },
                "category_scores": { "violence": 0.97, "hate": 0.01 }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let verdicts = client(&server).moderate("hello there").await.unwrap();

    assert_eq!(verdicts.len(), 1);
    assert!(verdicts[0].flagged);
    assert_eq!(verdicts[0].flagged_categories(), vec!["violence"]);
    assert_eq!(verdicts[0].category_scores.get("violence"), Some(&0.97));
}

#[tokio::test]
async fn test_moderation_missing_results_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/moderations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "x" })))
        .mount(&server)
        .await;

    let verdicts = client(&server).moderate("hi").await.unwrap();
    assert!(verdicts.is_empty());
}

#[tokio::test]
async fn test_moderation_rejection_carries_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/moderations"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": { "message": "Incorrect API key provided" }
        })))
        .mount(&server)
        .await;

    match client(&server).moderate("hi").await {
        Err(LlmError::Rejected { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided");
        }
        other => panic!("expected Rejected, got {:?}", other.map(|v| v.len())),
    }
}

#[tokio::test]
async fn test_moderation_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/moderations"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server).moderate("hi").await;
    assert!(matches!(result, Err(LlmError::RateLimitExceeded)));
}

#[tokio::test]
async fn test_completion_streams_deltas() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o",
            "messages": [{ "role": "user", "content": "Tell me" }],
            "max_tokens": 512,
            "temperature": 0.0,
            "stream": true
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse_body(&["He led ", "InfoSec and IT."], true)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut stream = client(&server).stream_completion(request()).await.unwrap();
    let (texts, error) = collect(&mut stream).await;

    assert!(error.is_none());
    // the role-only chunk arrives as an empty delta
    assert_eq!(texts, vec!["", "He led ", "InfoSec and IT."]);
}

#[tokio::test]
async fn test_completion_without_done_is_read_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(sse_body(&["partial"], false)),
        )
        .mount(&server)
        .await;

    let mut stream = client(&server).stream_completion(request()).await.unwrap();
    let (texts, error) = collect(&mut stream).await;

    assert_eq!(texts, vec!["", "partial"]);
    assert!(error.unwrap().contains("[DONE]"));
}

#[tokio::test]
async fn test_completion_malformed_chunk() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("data: not-json\n\n"))
        .mount(&server)
        .await;

    let mut stream = client(&server).stream_completion(request()).await.unwrap();
    let (texts, error) = collect(&mut stream).await;

    assert!(texts.is_empty());
    assert!(error.unwrap().contains("Malformed stream chunk"));
}

#[tokio::test]
async fn test_completion_unknown_model() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": { "message": "The model does not exist" }
        })))
        .mount(&server)
        .await;

    let result = client(&server).stream_completion(request()).await;
    match result {
        Err(LlmError::ModelNotAvailable(model)) => assert_eq!(model, "gpt-4o"),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("expected an error"),
    }
}

#[tokio::test]
async fn test_unreachable_provider() {
    let client = OpenAiClient::new("http://127.0.0.1:9", "key").unwrap();
    let result = client.moderate("hi").await;
    assert!(matches!(result, Err(LlmError::Communication(_))));
}
