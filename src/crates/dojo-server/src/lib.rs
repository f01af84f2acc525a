//! # dojo-server - AG-UI example agent servers
//!
//! Hosts one example agent behind a single AG-UI endpoint:
//!
//! ```text
//! POST /agent  (RunAgentInput JSON)
//!   └─► adapter ─► agent run loop ─► AgentEvent
//!                                       └─► translator ─► SSE AgUiEvent stream
//! ```
//!
//! Configuration comes from the environment ([`ServerConfig`]); the
//! `dojo-server` binary adds a small CLI on top.

pub mod adapter;
pub mod agui;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod translator;

pub use adapter::{AgUiAgent, LangGraphAgUiAgent, SessionAgUiAgent};
pub use agui::{AgUiEvent, AgUiMessage, RunAgentInput};
pub use bootstrap::{build_agent, build_app, build_app_with_model, chat_agent_config};
pub use config::{Example, PersistenceMode, ServerConfig, DEFAULT_PORT};
pub use error::{Result, ServerError};
pub use routes::{create_router, AppState, EndpointRegistration};
