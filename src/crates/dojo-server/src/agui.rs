//! AG-UI protocol types
//!
//! A client starts a run by POSTing a [`RunAgentInput`]; the server answers
//! with a `text/event-stream` of [`AgUiEvent`]s, each a JSON object tagged by
//! `type`:
//!
//! ```text
//! RUN_STARTED
//!   TEXT_MESSAGE_START / TEXT_MESSAGE_CONTENT* / TEXT_MESSAGE_END
//!   TOOL_CALL_START / TOOL_CALL_ARGS* / TOOL_CALL_END
//!   TOOL_CALL_RESULT
//!   STATE_SNAPSHOT
//! MESSAGES_SNAPSHOT
//! RUN_FINISHED  |  RUN_ERROR
//! ```

use dojo_agent::{ContextItem, RunContext, RunInput};
use dojo_llm::{Message, MessageRole, ToolCall, ToolDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a run request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAgentInput {
    pub thread_id: String,
    pub run_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_run_id: Option<String>,
    #[serde(default)]
    pub state: Value,
    #[serde(default)]
    pub messages: Vec<AgUiMessage>,
    #[serde(default)]
    pub tools: Vec<AgUiTool>,
    #[serde(default)]
    pub context: Vec<ContextItem>,
    #[serde(default)]
    pub forwarded_props: Value,
}

impl RunAgentInput {
    pub fn new(thread_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            run_id: run_id.into(),
            parent_run_id: None,
            state: Value::Null,
            messages: Vec::new(),
            tools: Vec::new(),
            context: Vec::new(),
            forwarded_props: Value::Null,
        }
    }

    pub fn with_message(mut self, message: AgUiMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Convert into the agent's run input
    pub fn into_run_input(self) -> RunInput {
        let context = RunContext::new(self.thread_id, self.run_id)
            .with_frontend_tools(self.tools.into_iter().map(ToolDefinition::from).collect())
            .with_context(self.context);
        let messages = self.messages.into_iter().map(Message::from).collect();

        let run = RunInput::new(context, messages);
        match self.state {
            Value::Object(map) if !map.is_empty() => run.with_state(Value::Object(map)),
            _ => run,
        }
    }
}

/// A tool the client implements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgUiTool {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

impl From<AgUiTool> for ToolDefinition {
    fn from(tool: AgUiTool) -> Self {
        let def = ToolDefinition::new(tool.name, tool.description);
        match tool.parameters {
            Some(parameters) => def.with_parameters(parameters),
            None => def,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgUiRole {
    Developer,
    System,
    Assistant,
    User,
    Tool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgUiFunctionCall {
    pub name: String,
    /// JSON-encoded arguments
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgUiToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub kind: String,
    pub function: AgUiFunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

/// A message in AG-UI wire form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgUiMessage {
    pub id: String,
    pub role: AgUiRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<AgUiToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl AgUiMessage {
    pub fn user(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: AgUiRole::User,
            content: Some(content.into()),
            name: None,
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }
}

impl From<AgUiMessage> for Message {
    fn from(msg: AgUiMessage) -> Self {
        let role = match msg.role {
            AgUiRole::Developer | AgUiRole::System => MessageRole::System,
            AgUiRole::Assistant => MessageRole::Assistant,
            AgUiRole::User => MessageRole::User,
            AgUiRole::Tool => MessageRole::Tool,
        };
        let tool_calls = msg
            .tool_calls
            .into_iter()
            .map(|call| {
                let args = parse_arguments(&call.function.arguments);
                ToolCall::new(call.id, call.function.name, args)
            })
            .collect();

        let mut message = Message::new(role, msg.content.unwrap_or_default())
            .with_id(msg.id)
            .with_tool_calls(tool_calls);
        message.name = msg.name;
        message.tool_call_id = msg.tool_call_id;
        message
    }
}

impl From<&Message> for AgUiMessage {
    fn from(msg: &Message) -> Self {
        let role = match msg.role {
            MessageRole::System => AgUiRole::System,
            MessageRole::User => AgUiRole::User,
            MessageRole::Assistant => AgUiRole::Assistant,
            MessageRole::Tool => AgUiRole::Tool,
        };
        let tool_calls = msg
            .tool_calls
            .iter()
            .map(|call| AgUiToolCall {
                id: call.id.clone(),
                kind: function_type(),
                function: AgUiFunctionCall {
                    name: call.name.clone(),
                    arguments: call.encoded_args(),
                },
            })
            .collect();

        let content = if msg.content.is_empty() && msg.has_tool_calls() {
            None
        } else {
            Some(msg.content.clone())
        };

        Self {
            id: msg.id.clone().unwrap_or_default(),
            role,
            content,
            name: msg.name.clone(),
            tool_calls,
            tool_call_id: msg.tool_call_id.clone(),
        }
    }
}

/// Tool arguments arrive as a JSON string; keep non-JSON text as a string
fn parse_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Events streamed back to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum AgUiEvent {
    RunStarted {
        thread_id: String,
        run_id: String,
    },
    RunFinished {
        thread_id: String,
        run_id: String,
    },
    RunError {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },
    TextMessageStart {
        message_id: String,
        role: AgUiRole,
    },
    TextMessageContent {
        message_id: String,
        delta: String,
    },
    TextMessageEnd {
        message_id: String,
    },
    ToolCallStart {
        tool_call_id: String,
        tool_call_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_message_id: Option<String>,
    },
    ToolCallArgs {
        tool_call_id: String,
        delta: String,
    },
    ToolCallEnd {
        tool_call_id: String,
    },
    ToolCallResult {
        message_id: String,
        tool_call_id: String,
        content: String,
        role: AgUiRole,
    },
    StateSnapshot {
        snapshot: Value,
    },
    MessagesSnapshot {
        messages: Vec<AgUiMessage>,
    },
}

impl AgUiEvent {
    /// Wire name of the event, e.g. `RUN_STARTED`
    pub fn event_type(&self) -> &'static str {
        match self {
            AgUiEvent::RunStarted { .. } => "RUN_STARTED",
            AgUiEvent::RunFinished { .. } => "RUN_FINISHED",
            AgUiEvent::RunError { .. } => "RUN_ERROR",
            AgUiEvent::TextMessageStart { .. } => "TEXT_MESSAGE_START",
            AgUiEvent::TextMessageContent { .. } => "TEXT_MESSAGE_CONTENT",
            AgUiEvent::TextMessageEnd { .. } => "TEXT_MESSAGE_END",
            AgUiEvent::ToolCallStart { .. } => "TOOL_CALL_START",
            AgUiEvent::ToolCallArgs { .. } => "TOOL_CALL_ARGS",
            AgUiEvent::ToolCallEnd { .. } => "TOOL_CALL_END",
            AgUiEvent::ToolCallResult { .. } => "TOOL_CALL_RESULT",
            AgUiEvent::StateSnapshot { .. } => "STATE_SNAPSHOT",
            AgUiEvent::MessagesSnapshot { .. } => "MESSAGES_SNAPSHOT",
        }
    }
}
