//! Runs the client and the full chain against a fake Responses API.

use pretty_assertions::assert_eq;
use prompt_chain::ai::client::{CompletionRequest, ModelEndpoint, OpenAiClient, ReasoningEffort};
use prompt_chain::config::Config;
use prompt_chain::core::handlers::handle_chain;
use prompt_chain::core::types::{ChainRequest, ChainResponse};
use prompt_chain::error::{ChainError, ErrorKind};
use prompt_chain::orchestrator::ChainOrchestrator;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    Config {
        api_key: Some("sk-test".into()),
        base_url: format!("{}/v1", server.uri()),
        ..Config::default()
    }
}

fn text_response(text: &str, request_id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("x-request-id", request_id)
        .set_body_json(json!({
            "id": "resp_1",
            "output": [{
                "type": "message",
                "role": "assistant",
                "content": [{ "type": "output_text", "text": text }]
            }]
        }))
}

#[tokio::test]
async fn client_posts_to_responses_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "model": "gpt-4.1-mini", "instructions": "sys", "input": "hi" })))
        .respond_with(text_response("hello", "req_123"))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config_for(&server)).unwrap();
    let completion = client
        .complete(&CompletionRequest {
            model: "gpt-4.1-mini".into(),
            instructions: "sys".into(),
            input: "hi".into(),
            reasoning_effort: ReasoningEffort::default(),
            output_format: None,
        })
        .await
        .unwrap();

    assert_eq!(completion.text, "hello");
    assert_eq!(completion.request_id.as_deref(), Some("req_123"));
}

#[tokio::test]
async fn client_maps_upstream_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(
            ResponseTemplate::new(400)
                .insert_header("x-request-id", "req_bad")
                .set_body_json(json!({
                    "error": {
                        "message": "Invalid schema for response_format 'ClinicalJSON'",
                        "type": "invalid_request_error"
                    }
                })),
        )
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config_for(&server)).unwrap();
    let err = client
        .complete(&CompletionRequest {
            model: "gpt-4.1-mini".into(),
            instructions: String::new(),
            input: String::new(),
            reasoning_effort: ReasoningEffort::default(),
            output_format: None,
        })
        .await
        .unwrap_err();

    let ChainError::Upstream(upstream) = err else { panic!("expected upstream error") };
    assert_eq!(upstream.status, Some(400));
    assert_eq!(upstream.message, "Invalid schema for response_format 'ClinicalJSON'");
    assert_eq!(upstream.request_id.as_deref(), Some("req_bad"));
    assert_eq!(upstream.hints.len(), 1);
    assert_eq!(upstream.hints[0].title, "migrated parameter");
}

#[tokio::test]
async fn structured_chain_end_to_end() {
    let server = MockServer::start().await;
    let schema = json!({
        "type": "object",
        "properties": { "x": { "type": "string" } },
        "required": ["x"],
        "additionalProperties": false
    });

    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(body_partial_json(json!({
            "model": "gpt-5",
            "reasoning": { "effort": "low" },
            "text": { "format": { "type": "json_schema", "name": "Extraction", "schema": schema, "strict": true } }
        })))
        .respond_with(text_response("{\"x\":\"42\"}", "req_first"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(body_partial_json(json!({
            "model": "gpt-4.1-mini",
            "instructions": "Explain for Ana.",
            "input": "First response (JSON):\n```json\n{\"x\":\"42\"}\n```"
        })))
        .respond_with(text_response("It is 42.", "req_second"))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let orchestrator = ChainOrchestrator::new(OpenAiClient::new(&config).unwrap(), config);
    let request: ChainRequest = serde_json::from_value(json!({
        "modelA": "gpt-5",
        "reasoningEffortA": "low",
        "instructionsA": "Extract x.",
        "inputA": "x is 42",
        "instructionsB": "Explain for ${who}.",
        "inputB": "${data}",
        "placeholderBindings": { "who": "Ana", "data": "FIRST_RESPONSE" },
        "schemaName": "Extraction",
        "schemaText": schema.to_string()
    }))
    .unwrap();

    let res = handle_chain(&orchestrator, &request).await;
    assert_eq!(res.status, 200);
    let body = serde_json::to_value(&res.body).unwrap();
    assert_eq!(
        body,
        json!({
            "firstOutputText": "{\"x\":\"42\"}",
            "secondOutputText": "It is 42.",
            "structuredModeUsed": true,
            "schemaName": "Extraction",
            "requestId": "req_second"
        })
    );
}

#[tokio::test]
async fn failed_second_call_surfaces_upstream_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(body_partial_json(json!({ "input": "first" })))
        .respond_with(text_response("draft", "req_first"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(body_partial_json(json!({ "input": "Polish draft" })))
        .respond_with(
            ResponseTemplate::new(503)
                .insert_header("x-request-id", "req_second")
                .set_body_string("upstream overloaded"),
        )
        .mount(&server)
        .await;

    let config = config_for(&server);
    let orchestrator = ChainOrchestrator::new(OpenAiClient::new(&config).unwrap(), config);
    let request = ChainRequest {
        input_a: "first".into(),
        input_b: "Polish FIRST_RESPONSE".into(),
        ..Default::default()
    };

    let res = handle_chain(&orchestrator, &request).await;
    assert_eq!(res.status, 503);
    let ChainResponse::Error(body) = res.body else { panic!("expected error body") };
    assert_eq!(body.error, "upstream overloaded");
    assert_eq!(body.request_id.as_deref(), Some("req_second"));
    assert_eq!(body.issues, None);
}

#[tokio::test]
async fn rejected_schema_never_reaches_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(text_response("unused", "req"))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let orchestrator = ChainOrchestrator::new(OpenAiClient::new(&config).unwrap(), config);
    let request = ChainRequest {
        schema_text: r#"{"type":"object","properties":{"x":{"type":"string"}},"required":["x"]}"#.into(),
        ..Default::default()
    };

    let res = handle_chain(&orchestrator, &request).await;
    assert_eq!(res.status, 400);
    let body: Value = serde_json::to_value(&res.body).unwrap();
    assert_eq!(body["error"], "invalid schema for structured outputs");
    assert_eq!(body["issues"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["issues"][0]["title"], "additionalProperties required");
}

#[tokio::test]
async fn unreachable_endpoint_is_an_upstream_failure() {
    let config = Config {
        api_key: Some("sk-test".into()),
        base_url: "http://127.0.0.1:1/v1".into(),
        ..Config::default()
    };
    let orchestrator = ChainOrchestrator::new(OpenAiClient::new(&config).unwrap(), config);

    let err = orchestrator.run(&ChainRequest::default()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamError);
    assert_eq!(err.status_code(), 500);

    let res = handle_chain(&orchestrator, &ChainRequest::default()).await;
    assert_eq!(res.status, 500);
    let ChainResponse::Error(body) = res.body else { panic!("expected error body") };
    assert!(body.error.contains("127.0.0.1:1"));
    assert!(!body.error.starts_with("Transport Error"));
}

#[tokio::test]
async fn undecodable_success_body_keeps_request_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-request-id", "req_garbled")
                .set_body_string("<html>not json</html>"),
        )
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config_for(&server)).unwrap();
    let err = client
        .complete(&CompletionRequest {
            model: "gpt-4.1-mini".into(),
            instructions: String::new(),
            input: String::new(),
            reasoning_effort: ReasoningEffort::default(),
            output_format: None,
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UpstreamError);
    assert_eq!(err.status_code(), 500);
    assert_eq!(err.request_id(), Some("req_garbled"));
}
