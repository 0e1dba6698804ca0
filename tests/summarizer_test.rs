use mockito::Matcher;
use serde_json::json;

use secdigest::llm::remote::GroqClient;
use secdigest::model::{Category, NormalizedItem};
use secdigest::summarizer::Summarizer;

fn test_item() -> NormalizedItem {
    NormalizedItem {
        title: "Critical RCE in widget-lib".to_string(),
        url: "https://example.com/rce".to_string(),
        content: "A remote code execution flaw was found in widget-lib 2.3.".to_string(),
        published: "2026-08-30T08:00:00+00:00".to_string(),
        source: "The Hacker News".to_string(),
        category: Category::News,
        severity: None,
    }
}

fn valid_summary_json() -> String {
    json!({
        "what": "An RCE flaw was disclosed in widget-lib.",
        "why_it_matters_security": "Patch immediately.",
        "why_it_matters_grc": "Document the response.",
        "why_it_matters_privacy": "No PII impact known.",
        "estimated_read_time": "3 min",
        "for_security_engineer": true,
        "for_grc": false,
        "for_data_privacy": false,
        "tags": ["rce", "supply-chain"],
        "region": ["Global"]
    })
    .to_string()
}

fn chat_response(content: &str) -> String {
    json!({
        "choices": [{
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

fn summarizer_for(server: &mockito::Server, models: &[&str]) -> Summarizer {
    let client = GroqClient::new(server.url(), "fake-api-key").expect("client");
    Summarizer::new(
        Box::new(client),
        models.iter().map(|m| m.to_string()).collect(),
        0.3,
        2000,
    )
}

#[tokio::test]
async fn test_fallback_model_wins_after_primary_http_error() {
    let mut server = mockito::Server::new_async().await;

    let primary = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJsonString(r#"{"model": "primary"}"#.to_string()))
        .with_status(500)
        .with_body(r#"{"error": "internal"}"#)
        .create_async()
        .await;

    let fallback = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJsonString(r#"{"model": "fallback-1"}"#.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_response(&valid_summary_json()))
        .create_async()
        .await;

    let third = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJsonString(r#"{"model": "fallback-2"}"#.to_string()))
        .with_status(200)
        .with_body(chat_response(&valid_summary_json()))
        .expect(0)
        .create_async()
        .await;

    let summarizer = summarizer_for(&server, &["primary", "fallback-1", "fallback-2"]);
    let summary = summarizer.summarize(&test_item()).await;

    let summary = summary.expect("fallback model should have produced a summary");
    assert_eq!(summary.what, "An RCE flaw was disclosed in widget-lib.");
    assert_eq!(summary.tags.unwrap(), vec!["rce", "supply-chain"]);

    primary.assert_async().await;
    fallback.assert_async().await;
    third.assert_async().await;
}

#[tokio::test]
async fn test_fenced_json_completion_parses() {
    let mut server = mockito::Server::new_async().await;

    let fenced = format!("Here is the analysis:\n```json\n{}\n```", valid_summary_json());
    let mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_response(&fenced))
        .create_async()
        .await;

    let summarizer = summarizer_for(&server, &["only-model"]);
    let summary = summarizer.summarize(&test_item()).await;

    assert!(summary.is_some());
    assert_eq!(summary.unwrap().estimated_read_time.unwrap(), "3 min");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unparseable_completions_exhaust_all_models() {
    let mut server = mockito::Server::new_async().await;

    // Every model answers, but never with the expected JSON shape.
    let mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_response("I could not produce structured output, sorry."))
        .expect(3)
        .create_async()
        .await;

    let summarizer = summarizer_for(&server, &["m1", "m2", "m3"]);
    let summary = summarizer.summarize(&test_item()).await;

    assert!(summary.is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_malformed_json_inside_fences_is_a_failure() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_body(chat_response("```json\n{\"tags\": [\"missing what\"]}\n```"))
        .create_async()
        .await;

    let summarizer = summarizer_for(&server, &["only-model"]);
    assert!(summarizer.summarize(&test_item()).await.is_none());
}
