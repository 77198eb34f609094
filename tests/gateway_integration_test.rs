//! Integration tests for the model gateway and the full forge pipeline
//!
//! Validates tier fallback and the two-pass workflow against a mock
//! chat-completions server.

use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chromeforge::config::LlmConfig;
use chromeforge::llm::{BundleGenerator, Message, ModelGateway, ModelTier, OpenAiTransport};
use chromeforge::materializer::Materializer;
use chromeforge::orchestrator::Orchestrator;

fn reply_with(content: serde_json::Value) -> serde_json::Value {
    json!({ "choices": [{ "message": { "content": content.to_string() } }] })
}

fn gateway_for(server: &MockServer) -> ModelGateway<OpenAiTransport> {
    let config = LlmConfig {
        base_url: server.uri(),
        request_timeout_secs: 5,
        ..LlmConfig::default()
    };
    let transport = OpenAiTransport::new(config.clone(), "test-key").unwrap();
    ModelGateway::new(transport, &config)
}

#[tokio::test]
async fn test_frontier_failure_falls_back_over_http() {
    let server = MockServer::start().await;

    // Frontier model is unavailable
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "gpt-5"})))
        .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
        .expect(1)
        .mount(&server)
        .await;

    // Stable model succeeds with an identical payload
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "gpt-4o"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_with(json!({
            "analysis": "from the stable tier",
            "manifest": {"manifest_version": 3},
            "files": {"content.js": "x"}
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let bundle = gateway
        .generate(&[Message::user("build it")], ModelTier::Frontier)
        .await
        .unwrap();

    assert_eq!(bundle.analysis, "from the stable tier");
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_stable_failure_makes_exactly_one_attempt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let result = gateway
        .generate(&[Message::user("build it")], ModelTier::Stable)
        .await;

    assert!(result.is_err());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_two_pass_pipeline_end_to_end() {
    let server = MockServer::start().await;

    // Draft pass runs at the frontier tier
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "gpt-5"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_with(json!({
            "analysis": "draft",
            "manifest": {"manifest_version": 3, "name": "Highlighter"},
            "files": {"content.js": "// draft, missing permission"}
        }))))
        .expect(1)
        .mount(&server)
        .await;

    // Audit pass always runs at the stable tier and corrects the draft
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "gpt-4o"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_with(json!({
            "analysis": "audited: added activeTab permission",
            "manifest": {
                "manifest_version": 3,
                "name": "Highlighter",
                "permissions": ["activeTab"]
            },
            "files": {"content.js": "// audited", "icon.svg": "<svg/>"}
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let output_dir = dir.path().join("out");
    let mut orchestrator = Orchestrator::new(
        Arc::new(gateway_for(&server)),
        Materializer::new(output_dir.clone()),
    );

    let outcome = orchestrator
        .forge("create a link highlighter", ModelTier::Frontier)
        .await
        .unwrap();

    // The materialized output reflects the audited bundle, never the draft
    assert_eq!(outcome.analysis, "audited: added activeTab permission");
    assert_eq!(
        outcome.files,
        vec!["content.js", "icon.png", "icon.svg", "manifest.json"]
    );
    let content = std::fs::read_to_string(output_dir.join("content.js")).unwrap();
    assert_eq!(content, "// audited");

    // Memory holds exactly one completed exchange with the final bundle
    assert_eq!(orchestrator.memory().len(), 2);
    assert!(orchestrator.memory().turns()[1].content.contains("audited"));
}
