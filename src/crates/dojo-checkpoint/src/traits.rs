//! Storage trait for checkpoint backends
//!
//! [`CheckpointSaver`] is the seam between an agent and wherever its thread
//! state lives. The agent only ever calls [`CheckpointSaver::get_tuple`] to
//! resume a thread and [`CheckpointSaver::put`] after each step; `list` and
//! `delete_thread` exist for inspection and cleanup.
//!
//! Implementations must be `Send + Sync` so a single saver can be shared by
//! every request the server handles, typically as `Arc<dyn CheckpointSaver>`.

use crate::checkpoint::{Checkpoint, CheckpointConfig, CheckpointMetadata, CheckpointTuple};
use crate::error::Result;
use async_trait::async_trait;
use futures::stream::Stream;
use serde_json::Value;
use std::collections::HashMap;
use std::pin::Pin;

/// Stream of checkpoint tuples returned by [`CheckpointSaver::list`]
pub type CheckpointStream = Pin<Box<dyn Stream<Item = Result<CheckpointTuple>> + Send>>;

#[async_trait]
pub trait CheckpointSaver: Send + Sync {
    /// Human-readable backend name, used in logs
    fn name(&self) -> &str;

    /// Fetch just the checkpoint addressed by `config`
    async fn get(&self, config: &CheckpointConfig) -> Result<Option<Checkpoint>> {
        Ok(self.get_tuple(config).await?.map(|tuple| tuple.checkpoint))
    }

    /// Fetch a checkpoint tuple.
    ///
    /// With `checkpoint_id` set, returns that checkpoint; otherwise the latest
    /// checkpoint of the thread. `Ok(None)` when the thread has no match.
    async fn get_tuple(&self, config: &CheckpointConfig) -> Result<Option<CheckpointTuple>>;

    /// List checkpoints newest first.
    ///
    /// * `config` - restrict to one thread when it carries a `thread_id`
    /// * `filter` - every key must equal the value in `metadata.extra`
    /// * `before` - only checkpoints written before this checkpoint id
    /// * `limit` - maximum number of results
    async fn list(
        &self,
        config: Option<&CheckpointConfig>,
        filter: Option<HashMap<String, Value>>,
        before: Option<&CheckpointConfig>,
        limit: Option<usize>,
    ) -> Result<CheckpointStream>;

    /// Store a checkpoint for the thread named in `config`.
    ///
    /// If `config` already addresses a checkpoint, it becomes the parent of the
    /// new one. Returns the config addressing the stored checkpoint.
    async fn put(
        &self,
        config: &CheckpointConfig,
        checkpoint: Checkpoint,
        metadata: CheckpointMetadata,
    ) -> Result<CheckpointConfig>;

    /// Drop every checkpoint of a thread
    async fn delete_thread(&self, thread_id: &str) -> Result<()>;
}
