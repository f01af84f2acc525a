//! Agent configuration record
//!
//! An [`AgentConfig`] is assembled once at startup and never mutated. Two
//! builds from the same inputs compare equal on everything observable: model,
//! prompt, tool names, middleware names, checkpointer presence and schema.

use crate::error::Result;
use crate::middleware::AgentMiddleware;
use crate::state::StateSchema;
use crate::tools::Tool;
use dojo_checkpoint::CheckpointSaver;
use dojo_llm::ModelIdentifier;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Model turns allowed per run before giving up
pub const DEFAULT_MAX_ITERATIONS: usize = 25;

pub struct AgentConfig<S: StateSchema> {
    model: ModelIdentifier,
    system_prompt: String,
    tools: Vec<Arc<dyn Tool>>,
    middleware: Vec<Arc<dyn AgentMiddleware>>,
    checkpointer: Option<Arc<dyn CheckpointSaver>>,
    max_iterations: usize,
    _schema: PhantomData<fn() -> S>,
}

impl<S: StateSchema> AgentConfig<S> {
    /// Start a configuration for the model named by `model`
    /// (`openai:gpt-4o`, `deepseek/deepseek-chat`, ...)
    pub fn builder(model: impl Into<String>) -> AgentConfigBuilder<S> {
        AgentConfigBuilder::new(model)
    }

    pub fn model(&self) -> &ModelIdentifier {
        &self.model
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub fn middleware(&self) -> &[Arc<dyn AgentMiddleware>] {
        &self.middleware
    }

    pub fn middleware_names(&self) -> Vec<String> {
        self.middleware.iter().map(|m| m.name().to_string()).collect()
    }

    pub fn checkpointer(&self) -> Option<&Arc<dyn CheckpointSaver>> {
        self.checkpointer.as_ref()
    }

    pub fn has_checkpointer(&self) -> bool {
        self.checkpointer.is_some()
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn state_schema(&self) -> &'static str {
        S::NAME
    }
}

impl<S: StateSchema> Clone for AgentConfig<S> {
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
            system_prompt: self.system_prompt.clone(),
            tools: self.tools.clone(),
            middleware: self.middleware.clone(),
            checkpointer: self.checkpointer.clone(),
            max_iterations: self.max_iterations,
            _schema: PhantomData,
        }
    }
}

impl<S: StateSchema> fmt::Debug for AgentConfig<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tools: Vec<&str> = self.tools.iter().map(|t| t.name()).collect();
        f.debug_struct("AgentConfig")
            .field("model", &self.model.to_string())
            .field("system_prompt", &self.system_prompt)
            .field("tools", &tools)
            .field("middleware", &self.middleware_names())
            .field(
                "checkpointer",
                &self.checkpointer.as_ref().map(|c| c.name().to_string()),
            )
            .field("max_iterations", &self.max_iterations)
            .field("state_schema", &S::NAME)
            .finish()
    }
}

/// Builder for [`AgentConfig`]
pub struct AgentConfigBuilder<S: StateSchema> {
    model: String,
    system_prompt: String,
    tools: Vec<Arc<dyn Tool>>,
    middleware: Vec<Arc<dyn AgentMiddleware>>,
    checkpointer: Option<Arc<dyn CheckpointSaver>>,
    max_iterations: usize,
    _schema: PhantomData<fn() -> S>,
}

impl<S: StateSchema> AgentConfigBuilder<S> {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: String::new(),
            tools: Vec::new(),
            middleware: Vec::new(),
            checkpointer: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            _schema: PhantomData,
        }
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn tools(mut self, tools: Vec<Arc<dyn Tool>>) -> Self {
        self.tools = tools;
        self
    }

    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn middleware(mut self, middleware: Arc<dyn AgentMiddleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    pub fn checkpointer(mut self, saver: Arc<dyn CheckpointSaver>) -> Self {
        self.checkpointer = Some(saver);
        self
    }

    /// Attach `saver` when it is `Some`
    pub fn maybe_checkpointer(mut self, saver: Option<Arc<dyn CheckpointSaver>>) -> Self {
        self.checkpointer = saver;
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Parse the model identifier and freeze the configuration
    pub fn build(self) -> Result<AgentConfig<S>> {
        let model = ModelIdentifier::parse(&self.model)?;
        Ok(AgentConfig {
            model,
            system_prompt: self.system_prompt,
            tools: self.tools,
            middleware: self.middleware,
            checkpointer: self.checkpointer,
            max_iterations: self.max_iterations,
            _schema: PhantomData,
        })
    }
}
