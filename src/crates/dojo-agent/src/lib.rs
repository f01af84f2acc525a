//! # dojo-agent - Agents for dojo example servers
//!
//! An agent is a chat model plus a system prompt, backend tools, middleware
//! and a state schema, optionally backed by a checkpoint store:
//!
//! ```rust,no_run
//! use dojo_agent::{AgentConfig, Agent, CopilotKitMiddleware, CopilotKitState};
//! use dojo_checkpoint::InMemoryCheckpointSaver;
//! use std::sync::Arc;
//!
//! # fn build() -> dojo_agent::Result<()> {
//! let config = AgentConfig::<CopilotKitState>::builder("openai:gpt-4o")
//!     .system_prompt("You are a helpful assistant.")
//!     .middleware(Arc::new(CopilotKitMiddleware::new()))
//!     .checkpointer(Arc::new(InMemoryCheckpointSaver::new()))
//!     .build()?;
//! let agent = Agent::from_config(config)?;
//! # Ok(())
//! # }
//! ```
//!
//! Each run restores the thread state (from the checkpoint store, or from a
//! caller-held session via [`SessionService`]), merges the new messages, and
//! loops over model turns until the model answers without calling a tool or a
//! middleware hands control back to the client. Progress is reported as
//! [`AgentEvent`]s.

pub mod agent;
pub mod config;
pub mod error;
pub mod events;
pub mod middleware;
pub mod session;
pub mod state;
pub mod tools;

pub use agent::{create_agent, snapshot, Agent};
pub use config::{AgentConfig, AgentConfigBuilder, DEFAULT_MAX_ITERATIONS};
pub use error::{AgentError, Result};
pub use events::{AgentEvent, ContextItem, EventSink, RunContext, RunInput};
pub use middleware::{AgentMiddleware, CopilotKitMiddleware, ModelDirective};
pub use session::{SessionKey, SessionService, DEFAULT_SESSION_TIMEOUT};
pub use state::{merge_client_state, CopilotKitProperties, CopilotKitState, MessagesState, StateSchema};
pub use tools::{Tool, ToolRegistry};
