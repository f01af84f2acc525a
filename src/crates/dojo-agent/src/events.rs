//! Run inputs and the events an agent emits while running.

use dojo_llm::{Message, ToolCall, ToolDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

/// A piece of application context supplied by the client for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextItem {
    pub description: String,
    pub value: String,
}

/// Per-run information that is not part of the conversation itself
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub thread_id: String,
    pub run_id: String,
    /// Tools implemented by the client ("frontend actions")
    pub frontend_tools: Vec<ToolDefinition>,
    pub context: Vec<ContextItem>,
}

impl RunContext {
    pub fn new(thread_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            run_id: run_id.into(),
            ..Self::default()
        }
    }

    pub fn with_frontend_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.frontend_tools = tools;
        self
    }

    pub fn with_context(mut self, context: Vec<ContextItem>) -> Self {
        self.context = context;
        self
    }

    pub fn is_frontend_tool(&self, name: &str) -> bool {
        self.frontend_tools.iter().any(|t| t.name == name)
    }
}

/// Everything a single run needs
#[derive(Debug, Clone, Default)]
pub struct RunInput {
    pub context: RunContext,
    /// New (or re-sent) messages from the client
    pub messages: Vec<Message>,
    /// Client-supplied state keys to overlay on the thread state
    pub state: Option<Value>,
}

impl RunInput {
    pub fn new(context: RunContext, messages: Vec<Message>) -> Self {
        Self {
            context,
            messages,
            state: None,
        }
    }

    pub fn with_state(mut self, state: Value) -> Self {
        self.state = Some(state);
        self
    }
}

/// Progress reported by a running agent
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// Assistant text produced by a model turn
    TextMessage { message_id: String, content: String },
    /// The model asked for a tool to be called
    ToolCall { message_id: String, call: ToolCall },
    /// A backend tool finished
    ToolResult { message: Message },
    /// State after the run, without the message history
    StateSnapshot(Value),
}

/// Where a run sends its [`AgentEvent`]s.
///
/// A closed receiver (e.g. a client that disconnected) does not stop the run;
/// the state is still saved.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::Sender<AgentEvent>>,
}

impl EventSink {
    pub fn new(tx: mpsc::Sender<AgentEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Sink that drops every event
    pub fn none() -> Self {
        Self { tx: None }
    }

    /// Channel pair with a sink on one end
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<AgentEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    pub async fn emit(&self, event: AgentEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).await.is_err() {
                tracing::debug!("event receiver dropped, continuing run");
            }
        }
    }
}
