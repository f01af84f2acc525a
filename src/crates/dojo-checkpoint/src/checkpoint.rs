//! Checkpoint data structures
//!
//! A [`Checkpoint`] is a point-in-time snapshot of an agent thread's state. The
//! state is stored as a map of top-level keys ("channels") to JSON values so a
//! saver never needs to know the concrete state schema of the agent writing it.
//!
//! ```text
//! CheckpointTuple
//!  ├─ config:   thread_id = "thread-1", checkpoint_id = "9f1c..."
//!  ├─ checkpoint
//!  │   ├─ id / ts
//!  │   └─ channel_values: { "messages": [...], "copilotkit": {...} }
//!  ├─ metadata: source = loop, step = 2, run_id = "run-7"
//!  └─ parent_config: checkpoint written just before this one
//! ```
//!
//! Checkpoints are grouped by thread. The latest checkpoint of a thread is what
//! an agent resumes from on the next run.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{CheckpointError, Result};

/// Current checkpoint format version
pub const CHECKPOINT_VERSION: u32 = 1;

/// Checkpoint identifier
pub type CheckpointId = String;

/// Where a checkpoint was produced during a run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointSource {
    /// Written after the run input was merged into the thread state
    Input,
    /// Written after a model turn inside the run loop
    Loop,
    /// Written by an explicit state update from outside a run
    Update,
}

/// Metadata stored next to each checkpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub source: CheckpointSource,

    /// -1 for input checkpoints, then 0.. for each loop step
    pub step: i32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,

    /// Free-form metadata, matched by `list` filters
    #[serde(default)]
    pub extra: HashMap<String, Value>,
}

impl Default for CheckpointMetadata {
    fn default() -> Self {
        Self {
            source: CheckpointSource::Input,
            step: -1,
            run_id: None,
            extra: HashMap::new(),
        }
    }
}

impl CheckpointMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: CheckpointSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_step(mut self, step: i32) -> Self {
        self.step = step;
        self
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Snapshot of a thread's state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Format version
    pub v: u32,

    pub id: CheckpointId,

    pub ts: DateTime<Utc>,

    /// Top-level state keys mapped to their values
    pub channel_values: HashMap<String, Value>,
}

impl Checkpoint {
    /// Create a checkpoint from raw channel values
    pub fn new(channel_values: HashMap<String, Value>) -> Self {
        Self {
            v: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            ts: Utc::now(),
            channel_values,
        }
    }

    pub fn empty() -> Self {
        Self::new(HashMap::new())
    }

    /// Snapshot a serializable state. The state must serialize to a JSON object.
    pub fn from_state<T: Serialize>(state: &T) -> Result<Self> {
        match serde_json::to_value(state)? {
            Value::Object(map) => Ok(Self::new(map.into_iter().collect())),
            other => Err(CheckpointError::Invalid(format!(
                "state must serialize to an object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Rebuild a typed state from the channel values
    pub fn to_state<T: DeserializeOwned>(&self) -> Result<T> {
        let map: Map<String, Value> = self
            .channel_values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(serde_json::from_value(Value::Object(map))?)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Identifies a thread, and optionally one checkpoint within it
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CheckpointConfig {
    pub thread_id: Option<String>,

    /// When unset, lookups resolve to the thread's latest checkpoint
    pub checkpoint_id: Option<CheckpointId>,
}

impl CheckpointConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Config addressing the latest checkpoint of `thread_id`
    pub fn for_thread(thread_id: impl Into<String>) -> Self {
        Self::new().with_thread_id(thread_id)
    }

    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn with_checkpoint_id(mut self, checkpoint_id: impl Into<CheckpointId>) -> Self {
        self.checkpoint_id = Some(checkpoint_id.into());
        self
    }

    /// Thread id, or an error when the config does not name a thread
    pub fn require_thread_id(&self) -> Result<&str> {
        self.thread_id
            .as_deref()
            .ok_or_else(|| CheckpointError::Invalid("thread_id is required".to_string()))
    }
}

/// A checkpoint together with its config, metadata and parent
#[derive(Debug, Clone)]
pub struct CheckpointTuple {
    pub config: CheckpointConfig,
    pub checkpoint: Checkpoint,
    pub metadata: CheckpointMetadata,
    pub parent_config: Option<CheckpointConfig>,
}
