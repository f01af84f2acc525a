//! State schemas
//!
//! The state schema is the shape of the state threaded through an agent's run
//! and saved in checkpoints. Every schema carries the message history; richer
//! schemas add keys the client can read and write.
//!
//! | Schema | Keys |
//! |--------|------|
//! | [`MessagesState`] | `messages` |
//! | [`CopilotKitState`] | `messages`, `copilotkit { actions, context }` |

use crate::error::{AgentError, Result};
use crate::events::{ContextItem, RunContext};
use dojo_llm::{Message, ToolDefinition};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key holding the message history in every schema
pub const MESSAGES_KEY: &str = "messages";

/// A type describing the state threaded through an agent run.
///
/// Implementors must serialize to a JSON object so they can be checkpointed.
pub trait StateSchema:
    Serialize + DeserializeOwned + Clone + Default + Send + Sync + 'static
{
    /// Schema name, reported in logs and configuration summaries
    const NAME: &'static str;

    fn messages(&self) -> &[Message];

    fn messages_mut(&mut self) -> &mut Vec<Message>;

    /// Copy per-run client data into the state. No-op by default.
    fn apply_run_context(&mut self, _ctx: &RunContext) {}
}

/// Message history only
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagesState {
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl StateSchema for MessagesState {
    const NAME: &'static str = "MessagesState";

    fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn messages_mut(&mut self) -> &mut Vec<Message> {
        &mut self.messages
    }
}

/// Frontend actions and context shared by a CopilotKit client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CopilotKitProperties {
    #[serde(default)]
    pub actions: Vec<ToolDefinition>,
    #[serde(default)]
    pub context: Vec<ContextItem>,
}

/// Message history plus the `copilotkit` key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CopilotKitState {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub copilotkit: CopilotKitProperties,
}

impl StateSchema for CopilotKitState {
    const NAME: &'static str = "CopilotKitState";

    fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn messages_mut(&mut self) -> &mut Vec<Message> {
        &mut self.messages
    }

    fn apply_run_context(&mut self, ctx: &RunContext) {
        self.copilotkit.actions = ctx.frontend_tools.clone();
        self.copilotkit.context = ctx.context.clone();
    }
}

/// Overlay client-supplied keys on `state`.
///
/// `messages` in the patch is ignored; history only changes through the
/// message reducer. A non-object patch leaves the state untouched.
pub fn merge_client_state<S: StateSchema>(state: S, patch: &Value) -> Result<S> {
    let Value::Object(patch) = patch else {
        return Ok(state);
    };
    if patch.keys().all(|k| k == MESSAGES_KEY) {
        return Ok(state);
    }

    let mut current = match serde_json::to_value(&state)? {
        Value::Object(map) => map,
        _ => {
            return Err(AgentError::InvalidState(format!(
                "{} does not serialize to an object",
                S::NAME
            )))
        }
    };

    for (key, value) in patch {
        if key != MESSAGES_KEY {
            current.insert(key.clone(), value.clone());
        }
    }

    serde_json::from_value(Value::Object(current))
        .map_err(|e| AgentError::InvalidState(format!("{}: {}", S::NAME, e)))
}
