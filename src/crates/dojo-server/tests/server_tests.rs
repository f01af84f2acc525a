//! End-to-end router tests with a stub model

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use dojo_llm::{ChatModel, ChatRequest, ChatResponse, LlmError, Message, ToolCall};
use dojo_server::{build_app_with_model, Example, PersistenceMode, ServerConfig};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Echoes the last user message, or calls `setTheme` when asked to
struct StubModel {
    calls: Mutex<usize>,
}

impl StubModel {
    fn new() -> Arc<Self> {
        Arc::new(Self { calls: Mutex::new(0) })
    }
}

#[async_trait]
impl ChatModel for StubModel {
    async fn chat(&self, request: ChatRequest) -> dojo_llm::Result<ChatResponse> {
        *self.calls.lock().unwrap() += 1;
        let last = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == dojo_llm::MessageRole::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();

        if last.contains("dark mode") {
            return Ok(ChatResponse::new(Message::assistant("").with_tool_calls(vec![
                ToolCall::new("call_1", "setTheme", json!({"dark": true})),
            ])));
        }
        let history = request.messages.len();
        Ok(ChatResponse::new(Message::assistant(format!(
            "echo: {} ({} messages)",
            last, history
        ))))
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

struct FailingModel;

#[async_trait]
impl ChatModel for FailingModel {
    async fn chat(&self, _request: ChatRequest) -> dojo_llm::Result<ChatResponse> {
        Err(LlmError::RateLimitExceeded("slow down".to_string()))
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

fn server_config(example: Example, env: &[(&str, &str)]) -> ServerConfig {
    let map: HashMap<String, String> = env
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ServerConfig::from_lookup(example, move |key| map.get(key).cloned())
}

fn app(example: Example, env: &[(&str, &str)], model: Arc<dyn ChatModel>) -> Router {
    build_app_with_model(&server_config(example, env), model).unwrap()
}

fn run_body(thread: &str, run: &str, text: &str) -> Value {
    json!({
        "threadId": thread,
        "runId": run,
        "state": {},
        "messages": [{"id": format!("{run}-user"), "role": "user", "content": text}],
        "tools": [],
        "context": [],
        "forwardedProps": {}
    })
}

fn post(path: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Send a run and collect the decoded SSE events
async fn run(app: &Router, body: Value) -> Vec<Value> {
    let response = app.clone().oneshot(post("/agent", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec())
        .unwrap()
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).unwrap())
        .collect()
}

fn types(events: &[Value]) -> Vec<&str> {
    events.iter().map(|e| e["type"].as_str().unwrap()).collect()
}

#[tokio::test]
async fn test_text_reply_event_sequence() {
    let app = app(Example::Langgraph, &[], StubModel::new());
    let events = run(&app, run_body("t1", "r1", "hello")).await;

    assert_eq!(
        types(&events),
        vec![
            "RUN_STARTED",
            "TEXT_MESSAGE_START",
            "TEXT_MESSAGE_CONTENT",
            "TEXT_MESSAGE_END",
            "STATE_SNAPSHOT",
            "MESSAGES_SNAPSHOT",
            "RUN_FINISHED",
        ]
    );
    assert_eq!(events[0]["threadId"], "t1");
    assert_eq!(events[0]["runId"], "r1");
    assert_eq!(events[2]["delta"], "echo: hello (2 messages)");
    assert_eq!(events[5]["messages"].as_array().unwrap().len(), 2);
    assert!(events[4]["snapshot"].get("messages").is_none());
}

#[tokio::test]
async fn test_in_memory_mode_keeps_thread_history() {
    let app = app(Example::Langgraph, &[("LANGGRAPH_FAST_API", "true")], StubModel::new());
    run(&app, run_body("t1", "r1", "first")).await;
    let events = run(&app, run_body("t1", "r2", "second")).await;

    // system prompt + first exchange + new user message
    assert_eq!(events[2]["delta"], "echo: second (4 messages)");
    assert_eq!(events[5]["messages"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_external_mode_keeps_nothing() {
    let app = app(Example::Langgraph, &[("LANGGRAPH_FAST_API", "false")], StubModel::new());
    run(&app, run_body("t1", "r1", "first")).await;
    let events = run(&app, run_body("t1", "r2", "second")).await;

    assert_eq!(events[2]["delta"], "echo: second (2 messages)");
}

#[tokio::test]
async fn test_frontend_tool_call_is_streamed() {
    let app = app(Example::Langgraph, &[], StubModel::new());
    let mut body = run_body("t1", "r1", "switch to dark mode");
    body["tools"] = json!([{
        "name": "setTheme",
        "description": "Switch the UI theme",
        "parameters": {"type": "object", "properties": {"dark": {"type": "boolean"}}}
    }]);

    let events = run(&app, body).await;

    assert_eq!(
        types(&events),
        vec![
            "RUN_STARTED",
            "TOOL_CALL_START",
            "TOOL_CALL_ARGS",
            "TOOL_CALL_END",
            "STATE_SNAPSHOT",
            "MESSAGES_SNAPSHOT",
            "RUN_FINISHED",
        ]
    );
    assert_eq!(events[1]["toolCallName"], "setTheme");
    assert_eq!(events[2]["delta"], "{\"dark\":true}");
    assert_eq!(events[4]["snapshot"]["copilotkit"]["actions"][0]["name"], "setTheme");
}

#[tokio::test]
async fn test_model_failure_emits_run_error() {
    let app = app(Example::Langgraph, &[], Arc::new(FailingModel));
    let events = run(&app, run_body("t1", "r1", "hello")).await;

    assert_eq!(types(&events), vec!["RUN_STARTED", "RUN_ERROR"]);
    assert_eq!(events[1]["code"], "MODEL_ERROR");
    assert!(events[1]["message"].as_str().unwrap().contains("slow down"));
}

#[tokio::test]
async fn test_exactly_one_route() {
    let app = app(Example::Deepagents, &[], StubModel::new());

    let response = app
        .clone()
        .oneshot(post("/other", &run_body("t", "r", "hi")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/agent").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let events = run(&app, run_body("t", "r", "hi")).await;
    assert_eq!(types(&events).last(), Some(&"RUN_FINISHED"));
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let app = app(Example::Langgraph, &[], StubModel::new());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/agent")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_empty_thread_id_is_bad_request() {
    let app = app(Example::Langgraph, &[], StubModel::new());
    let response = app.oneshot(post("/agent", &run_body("", "r", "hi"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_cors_preflight_allows_any_origin() {
    let app = app(Example::Langgraph, &[], StubModel::new());
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/agent")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_adk_sessions_keep_history() {
    let app = app(Example::Adk, &[("LANGGRAPH_FAST_API", "false")], StubModel::new());
    run(&app, run_body("s1", "r1", "first")).await;
    let events = run(&app, run_body("s1", "r2", "second")).await;

    assert_eq!(events[2]["delta"], "echo: second (4 messages)");

    let events = run(&app, run_body("s2", "r3", "other session")).await;
    assert_eq!(events[2]["delta"], "echo: other session (2 messages)");
}

#[test]
fn test_port_configuration() {
    assert_eq!(server_config(Example::Langgraph, &[("PORT", "9001")]).port, 9001);
    assert_eq!(server_config(Example::Langgraph, &[]).port, 8000);
    assert_eq!(
        server_config(Example::Langgraph, &[]).persistence,
        PersistenceMode::InMemory
    );
}
