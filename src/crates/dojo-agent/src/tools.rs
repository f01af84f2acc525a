//! Backend tools
//!
//! Tools an agent runs itself, as opposed to frontend tools that the client
//! executes. The example agents ship with no backend tools; the registry is
//! still consulted on every tool call so unknown names produce a tool message
//! instead of aborting the run.

use crate::error::{AgentError, Result};
use async_trait::async_trait;
use dojo_llm::ToolDefinition;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the arguments, if the tool declares one
    fn input_schema(&self) -> Option<Value> {
        None
    }

    async fn execute(&self, input: Value) -> Result<Value>;

    /// Definition advertised to the model
    fn definition(&self) -> ToolDefinition {
        let def = ToolDefinition::new(self.name(), self.description());
        match self.input_schema() {
            Some(schema) => def.with_parameters(schema),
            None => def,
        }
    }
}

/// Backend tools keyed by name
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry; later tools replace earlier ones with the same name
    pub fn from_tools(tools: &[Arc<dyn Tool>]) -> Self {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(Arc::clone(tool));
        }
        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Definitions sorted by name so requests are stable across runs
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<_> = self.tools.values().map(|t| t.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    pub async fn execute(&self, name: &str, input: Value) -> Result<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| AgentError::ToolExecution(format!("Tool not found: {}", name)))?;
        tool.execute(input).await
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.tools.keys().collect();
        names.sort();
        f.debug_struct("ToolRegistry").field("tools", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Upper;

    #[async_trait]
    impl Tool for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        fn description(&self) -> &str {
            "Upper-case a string"
        }

        fn input_schema(&self) -> Option<Value> {
            Some(json!({"type": "object", "properties": {"text": {"type": "string"}}}))
        }

        async fn execute(&self, input: Value) -> Result<Value> {
            let text = input["text"]
                .as_str()
                .ok_or_else(|| AgentError::ToolExecution("missing 'text'".to_string()))?;
            Ok(json!(text.to_uppercase()))
        }
    }

    #[tokio::test]
    async fn test_execute_registered_tool() {
        let registry = ToolRegistry::from_tools(&[Arc::new(Upper) as Arc<dyn Tool>]);
        let out = registry.execute("upper", json!({"text": "hi"})).await.unwrap();
        assert_eq!(out, json!("HI"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry.execute("nope", json!({})).await.unwrap_err();
        assert!(err.to_string().contains("Tool not found: nope"));
    }

    #[test]
    fn test_definition_carries_schema() {
        let def = Upper.definition();
        assert_eq!(def.name, "upper");
        assert!(def.parameters.is_some());
    }
}
