//! Server configuration
//!
//! Everything the server needs is read from the environment once at startup:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `PORT` | `8000` | Listen port; unparsable values fall back to the default |
//! | `HOST` | `0.0.0.0` | Listen address |
//! | `LANGGRAPH_FAST_API` | `true` | `true` (any case) attaches an in-memory checkpointer |
//! | `DOJO_EXAMPLE` | `langgraph` | Which example agent to serve (read by the CLI) |
//!
//! Lookups go through a closure so tests can supply their own environment.

use crate::error::{Result, ServerError};
use clap::ValueEnum;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_HOST: &str = "0.0.0.0";

pub const PORT_ENV: &str = "PORT";
pub const HOST_ENV: &str = "HOST";
pub const FAST_API_ENV: &str = "LANGGRAPH_FAST_API";

/// The example agents this server can host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Example {
    /// LangGraph agentic chat with CopilotKit middleware
    #[default]
    Langgraph,
    /// Deep-agents chat, always checkpointed in memory
    Deepagents,
    /// Session-based assistant with an idle timeout
    Adk,
}

impl Example {
    pub fn as_str(&self) -> &'static str {
        match self {
            Example::Langgraph => "langgraph",
            Example::Deepagents => "deepagents",
            Example::Adk => "adk",
        }
    }
}

impl fmt::Display for Example {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where thread state lives between runs.
///
/// `LANGGRAPH_FAST_API=true` (or unset) means the server runs standalone and
/// keeps state in memory itself. Any other value means a hosting platform
/// provides persistence, so the agent is built without a checkpointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceMode {
    InMemory,
    External,
    /// Per-session state held by the agent's own session service
    Sessions,
}

impl PersistenceMode {
    /// Interpret a raw `LANGGRAPH_FAST_API` value
    pub fn from_flag(raw: Option<&str>) -> Self {
        match raw {
            None => PersistenceMode::InMemory,
            Some(value) if value.eq_ignore_ascii_case("true") => PersistenceMode::InMemory,
            Some(_) => PersistenceMode::External,
        }
    }

    pub fn attaches_checkpointer(&self) -> bool {
        matches!(self, PersistenceMode::InMemory)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub example: Example,
    pub host: String,
    pub port: u16,
    pub persistence: PersistenceMode,
}

impl ServerConfig {
    /// Read configuration from the process environment
    pub fn from_env(example: Example) -> Self {
        Self::from_lookup(example, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(example: Example, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_port(lookup(PORT_ENV).as_deref());
        let host = lookup(HOST_ENV)
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let persistence = PersistenceMode::from_flag(lookup(FAST_API_ENV).as_deref());

        Self {
            example,
            host,
            port,
            persistence,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|e| ServerError::Config(format!("invalid host '{}': {}", self.host, e)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

fn parse_port(raw: Option<&str>) -> u16 {
    match raw.map(str::trim) {
        None | Some("") => DEFAULT_PORT,
        Some(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!(value, default = DEFAULT_PORT, "invalid PORT, using default");
            DEFAULT_PORT
        }),
    }
}
