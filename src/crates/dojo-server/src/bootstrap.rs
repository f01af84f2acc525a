//! Agent bootstrap
//!
//! Builds the one agent this process serves and mounts it on the router.
//!
//! | Example | Agent | Model | Thread state |
//! |---------|-------|-------|--------------|
//! | `langgraph` | `mcpAssistant` | `openai:gpt-4o` | in-memory checkpointer unless `LANGGRAPH_FAST_API` is not `true` |
//! | `deepagents` | `agentic_chat` | `openai:gpt-4o` | in-memory checkpointer |
//! | `adk` | `assistant` | `deepseek/deepseek-chat` | in-memory sessions, one hour idle timeout |

use crate::adapter::{AgUiAgent, LangGraphAgUiAgent, SessionAgUiAgent};
use crate::config::{Example, PersistenceMode, ServerConfig};
use crate::error::Result;
use crate::routes::{create_router, EndpointRegistration};
use axum::Router;
use dojo_agent::{
    create_agent, AgentConfig, CopilotKitMiddleware, CopilotKitState, MessagesState,
    SessionService, DEFAULT_SESSION_TIMEOUT,
};
use dojo_checkpoint::{CheckpointSaver, InMemoryCheckpointSaver};
use dojo_llm::{init_chat_model, ChatModel};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "openai:gpt-4o";
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

pub const ADK_MODEL: &str = "deepseek/deepseek-chat";
pub const ADK_INSTRUCTION: &str = "You are a helpful AI assistant that helps users with MCP Tools.\nNote: you can call multiple tools at the same time to save up time.";
pub const ADK_APP_NAME: &str = "agents";
pub const ADK_USER_ID: &str = "demo_user";

/// How often idle sessions are swept
pub const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

const CHAT_DESCRIPTION: &str = "An example for an agentic chat flow using LangGraph.";
const ADK_DESCRIPTION: &str = "ADK Middleware Basic Chat";

/// Configuration of the CopilotKit chat agent.
///
/// Identical in both persistence modes except for the checkpointer.
pub fn chat_agent_config(persistence: PersistenceMode) -> Result<AgentConfig<CopilotKitState>> {
    let checkpointer: Option<Arc<dyn CheckpointSaver>> = if persistence.attaches_checkpointer() {
        Some(Arc::new(InMemoryCheckpointSaver::new()))
    } else {
        None
    };

    Ok(AgentConfig::builder(DEFAULT_MODEL)
        .system_prompt(SYSTEM_PROMPT)
        .tools(Vec::new())
        .middleware(Arc::new(CopilotKitMiddleware::new()))
        .maybe_checkpointer(checkpointer)
        .build()?)
}

/// Configuration of the session-based assistant
pub fn adk_agent_config() -> Result<AgentConfig<MessagesState>> {
    Ok(AgentConfig::builder(ADK_MODEL)
        .system_prompt(ADK_INSTRUCTION)
        .build()?)
}

/// Persistence the example actually uses; only `langgraph` follows the flag
pub fn effective_persistence(example: Example, requested: PersistenceMode) -> PersistenceMode {
    match example {
        Example::Langgraph => requested,
        Example::Deepagents => PersistenceMode::InMemory,
        Example::Adk => PersistenceMode::Sessions,
    }
}

pub fn registration(example: Example) -> EndpointRegistration {
    match example {
        Example::Langgraph => EndpointRegistration::new("/agent", "mcpAssistant", CHAT_DESCRIPTION),
        Example::Deepagents => EndpointRegistration::new("./agent", "agentic_chat", CHAT_DESCRIPTION),
        Example::Adk => EndpointRegistration::new("/agent", "assistant", ADK_DESCRIPTION),
    }
}

/// Model identifier the example's agent uses
pub fn model_for(example: Example) -> &'static str {
    match example {
        Example::Langgraph | Example::Deepagents => DEFAULT_MODEL,
        Example::Adk => ADK_MODEL,
    }
}

/// Build the example's agent on top of `model`.
///
/// The `adk` example spawns its session sweeper, so this must run inside a
/// tokio runtime.
pub fn build_agent(config: &ServerConfig, model: Arc<dyn ChatModel>) -> Result<Arc<dyn AgUiAgent>> {
    let registration = registration(config.example);
    let persistence = effective_persistence(config.example, config.persistence);
    tracing::info!(
        example = %config.example,
        persistence = ?persistence,
        "building agent"
    );

    let agent: Arc<dyn AgUiAgent> = match config.example {
        Example::Langgraph | Example::Deepagents => {
            let agent = create_agent(chat_agent_config(persistence)?, model);
            Arc::new(LangGraphAgUiAgent::new(
                registration.name,
                registration.description,
                Arc::new(agent),
            ))
        }
        Example::Adk => {
            let agent = create_agent(adk_agent_config()?, model);
            let sessions = SessionService::new(ADK_APP_NAME, ADK_USER_ID, DEFAULT_SESSION_TIMEOUT);
            sessions.spawn_sweeper(SESSION_SWEEP_INTERVAL);
            Arc::new(SessionAgUiAgent::new(
                registration.name,
                registration.description,
                Arc::new(agent),
                sessions,
            ))
        }
    };
    Ok(agent)
}

/// Router serving the example's agent with a caller-supplied model
pub fn build_app_with_model(config: &ServerConfig, model: Arc<dyn ChatModel>) -> Result<Router> {
    let agent = build_agent(config, model)?;
    Ok(create_router(registration(config.example), agent))
}

/// Router serving the example's agent, with the model client built from
/// environment credentials
pub fn build_app(config: &ServerConfig) -> Result<Router> {
    let model_id = dojo_llm::ModelIdentifier::parse(model_for(config.example))
        .map_err(dojo_agent::AgentError::from)?;
    let model = init_chat_model(&model_id).map_err(dojo_agent::AgentError::from)?;
    build_app_with_model(config, model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_true_attaches_checkpointer() {
        let config = chat_agent_config(PersistenceMode::from_flag(Some("TRUE"))).unwrap();
        assert!(config.has_checkpointer());

        let config = chat_agent_config(PersistenceMode::from_flag(None)).unwrap();
        assert!(config.has_checkpointer());
    }

    #[test]
    fn test_flag_false_has_no_checkpointer() {
        let config = chat_agent_config(PersistenceMode::from_flag(Some("false"))).unwrap();
        assert!(!config.has_checkpointer());
    }

    #[test]
    fn test_chat_agent_shape() {
        for mode in [PersistenceMode::InMemory, PersistenceMode::External] {
            let config = chat_agent_config(mode).unwrap();
            assert_eq!(config.model().to_string(), "openai:gpt-4o");
            assert_eq!(config.system_prompt(), "You are a helpful assistant.");
            assert!(config.tools().is_empty());
            assert_eq!(config.middleware_names(), vec!["CopilotKitMiddleware"]);
            assert_eq!(config.state_schema(), "CopilotKitState");
        }
    }

    #[test]
    fn test_construction_is_deterministic() {
        let a = chat_agent_config(PersistenceMode::InMemory).unwrap();
        let b = chat_agent_config(PersistenceMode::InMemory).unwrap();
        assert_eq!(a.model(), b.model());
        assert_eq!(a.system_prompt(), b.system_prompt());
        assert_eq!(a.middleware_names(), b.middleware_names());
    }

    #[test]
    fn test_adk_agent_shape() {
        let config = adk_agent_config().unwrap();
        assert_eq!(config.model().to_string(), "deepseek:deepseek-chat");
        assert!(config.system_prompt().contains("MCP Tools"));
        assert!(config.middleware().is_empty());
        assert!(!config.has_checkpointer());
    }

    #[test]
    fn test_registrations() {
        assert_eq!(registration(Example::Langgraph).path, "/agent");
        assert_eq!(registration(Example::Langgraph).name, "mcpAssistant");
        assert_eq!(registration(Example::Deepagents).path, "/agent");
        assert_eq!(registration(Example::Deepagents).name, "agentic_chat");
        assert_eq!(registration(Example::Adk).name, "assistant");
    }

    #[test]
    fn test_deepagents_ignores_flag() {
        assert_eq!(
            effective_persistence(Example::Deepagents, PersistenceMode::External),
            PersistenceMode::InMemory
        );
        assert_eq!(
            effective_persistence(Example::Langgraph, PersistenceMode::External),
            PersistenceMode::External
        );
    }

    #[test]
    fn test_adk_reports_session_persistence() {
        for requested in [PersistenceMode::InMemory, PersistenceMode::External] {
            let mode = effective_persistence(Example::Adk, requested);
            assert_eq!(mode, PersistenceMode::Sessions);
            assert!(!mode.attaches_checkpointer());
        }
    }
}
