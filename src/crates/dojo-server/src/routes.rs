//! HTTP routing
//!
//! The router carries exactly one route: `POST <path>` for the registered
//! agent. Responses are Server-Sent Events; once the stream has started,
//! failures are reported in-band as `RUN_ERROR`.

use crate::adapter::AgUiAgent;
use crate::agui::{AgUiEvent, AgUiMessage, RunAgentInput};
use crate::error::ServerError;
use crate::translator::translate;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::post,
    Json, Router,
};
use dojo_agent::EventSink;
use futures::Stream;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Buffered agent events per run
const EVENT_BUFFER: usize = 64;

/// Where an agent is mounted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRegistration {
    pub path: String,
    pub name: String,
    pub description: String,
}

impl EndpointRegistration {
    /// `path` is normalized to an absolute route: `./agent` and `agent`
    /// both become `/agent`
    pub fn new(path: &str, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            path: normalize_path(path),
            name: name.into(),
            description: description.into(),
        }
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_start_matches('.').trim_start_matches('/');
    format!("/{}", trimmed)
}

#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<dyn AgUiAgent>,
    pub registration: Arc<EndpointRegistration>,
}

/// Build the application router for a single agent
pub fn create_router(registration: EndpointRegistration, agent: Arc<dyn AgUiAgent>) -> Router {
    tracing::info!(
        path = %registration.path,
        agent = %registration.name,
        "registering AG-UI endpoint"
    );
    let path = registration.path.clone();
    let state = AppState {
        agent,
        registration: Arc::new(registration),
    };

    Router::new()
        .route(&path, post(run_agent))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn run_agent(
    State(state): State<AppState>,
    Json(input): Json<RunAgentInput>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ServerError> {
    if input.thread_id.trim().is_empty() {
        return Err(ServerError::BadRequest("threadId must not be empty".to_string()));
    }
    if input.run_id.trim().is_empty() {
        return Err(ServerError::BadRequest("runId must not be empty".to_string()));
    }

    let thread_id = input.thread_id.clone();
    let run_id = input.run_id.clone();
    tracing::info!(
        agent = %state.registration.name,
        thread_id = %thread_id,
        run_id = %run_id,
        messages = input.messages.len(),
        "run requested"
    );

    let (sink, mut rx) = EventSink::channel(EVENT_BUFFER);
    let agent = Arc::clone(&state.agent);
    let task = tokio::spawn(async move { agent.run(input, sink).await });

    let stream = async_stream::stream! {
        yield Event::default().json_data(AgUiEvent::RunStarted {
            thread_id: thread_id.clone(),
            run_id: run_id.clone(),
        });

        while let Some(event) = rx.recv().await {
            for translated in translate(event) {
                yield Event::default().json_data(translated);
            }
        }

        match task.await {
            Ok(Ok(messages)) => {
                let messages: Vec<AgUiMessage> = messages.iter().map(AgUiMessage::from).collect();
                yield Event::default().json_data(AgUiEvent::MessagesSnapshot { messages });
                yield Event::default().json_data(AgUiEvent::RunFinished {
                    thread_id: thread_id.clone(),
                    run_id: run_id.clone(),
                });
                tracing::info!(thread_id = %thread_id, run_id = %run_id, "run completed");
            }
            Ok(Err(e)) => {
                tracing::error!(thread_id = %thread_id, run_id = %run_id, error = %e, "run failed");
                let message = e.to_string();
                let code = ServerError::Agent(e).code().to_string();
                yield Event::default().json_data(AgUiEvent::RunError {
                    message,
                    code: Some(code),
                });
            }
            Err(join_error) => {
                tracing::error!(thread_id = %thread_id, run_id = %run_id, error = %join_error, "run task aborted");
                yield Event::default().json_data(AgUiEvent::RunError {
                    message: join_error.to_string(),
                    code: Some("INTERNAL_ERROR".to_string()),
                });
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_normalization() {
        assert_eq!(normalize_path("/agent"), "/agent");
        assert_eq!(normalize_path("./agent"), "/agent");
        assert_eq!(normalize_path("agent"), "/agent");
        assert_eq!(normalize_path(" /agent "), "/agent");
    }
}
