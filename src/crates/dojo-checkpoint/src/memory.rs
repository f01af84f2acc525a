//! In-memory checkpoint storage
//!
//! [`InMemoryCheckpointSaver`] keeps every checkpoint of every thread in a
//! `HashMap<thread_id, Vec<entry>>` behind a tokio `RwLock`. Entries are kept in
//! insertion order, so the last entry of a thread is its latest checkpoint.
//!
//! State survives across runs on the same thread for the lifetime of the
//! process and is lost on restart. Cloning the saver shares the same storage.

use crate::{
    checkpoint::{Checkpoint, CheckpointConfig, CheckpointMetadata, CheckpointTuple},
    error::{CheckpointError, Result},
    traits::{CheckpointSaver, CheckpointStream},
};
use async_trait::async_trait;
use futures::stream;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct CheckpointEntry {
    checkpoint: Checkpoint,
    metadata: CheckpointMetadata,
    config: CheckpointConfig,
    parent_config: Option<CheckpointConfig>,
}

impl CheckpointEntry {
    fn to_tuple(&self) -> CheckpointTuple {
        CheckpointTuple {
            config: self.config.clone(),
            checkpoint: self.checkpoint.clone(),
            metadata: self.metadata.clone(),
            parent_config: self.parent_config.clone(),
        }
    }

    fn matches(&self, filter: &HashMap<String, Value>) -> bool {
        filter
            .iter()
            .all(|(key, value)| self.metadata.extra.get(key) == Some(value))
    }
}

type CheckpointStorage = Arc<RwLock<HashMap<String, Vec<CheckpointEntry>>>>;

/// Process-local checkpoint saver
///
/// # Example
///
/// ```rust
/// use dojo_checkpoint::{
///     Checkpoint, CheckpointConfig, CheckpointMetadata, CheckpointSaver, InMemoryCheckpointSaver,
/// };
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let saver = InMemoryCheckpointSaver::new();
///     let config = CheckpointConfig::for_thread("thread-1");
///
///     saver.put(&config, Checkpoint::empty(), CheckpointMetadata::new()).await?;
///     assert!(saver.get_tuple(&config).await?.is_some());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryCheckpointSaver {
    storage: CheckpointStorage,
}

impl InMemoryCheckpointSaver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of threads with at least one checkpoint
    pub async fn thread_count(&self) -> usize {
        self.storage.read().await.len()
    }

    /// Total number of checkpoints across all threads
    pub async fn checkpoint_count(&self) -> usize {
        self.storage
            .read()
            .await
            .values()
            .map(|entries| entries.len())
            .sum()
    }

    pub async fn clear(&self) {
        self.storage.write().await.clear();
    }
}

#[async_trait]
impl CheckpointSaver for InMemoryCheckpointSaver {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_tuple(&self, config: &CheckpointConfig) -> Result<Option<CheckpointTuple>> {
        let thread_id = config.require_thread_id()?;
        let storage = self.storage.read().await;

        let Some(entries) = storage.get(thread_id) else {
            return Ok(None);
        };

        let entry = match &config.checkpoint_id {
            Some(checkpoint_id) => entries.iter().find(|e| &e.checkpoint.id == checkpoint_id),
            None => entries.last(),
        };

        Ok(entry.map(CheckpointEntry::to_tuple))
    }

    async fn list(
        &self,
        config: Option<&CheckpointConfig>,
        filter: Option<HashMap<String, Value>>,
        before: Option<&CheckpointConfig>,
        limit: Option<usize>,
    ) -> Result<CheckpointStream> {
        let storage = self.storage.read().await;
        let limit = limit.unwrap_or(usize::MAX);
        let mut results = Vec::new();

        let thread_ids: Vec<&String> = match config.and_then(|c| c.thread_id.as_ref()) {
            Some(thread_id) => vec![thread_id],
            None => storage.keys().collect(),
        };

        'threads: for thread_id in thread_ids {
            let Some(entries) = storage.get(thread_id) else {
                continue;
            };

            // Entries are insertion ordered, so "before" is a position cut.
            let end = match before.and_then(|b| b.checkpoint_id.as_ref()) {
                Some(before_id) => entries
                    .iter()
                    .position(|e| &e.checkpoint.id == before_id)
                    .unwrap_or(entries.len()),
                None => entries.len(),
            };

            for entry in entries[..end].iter().rev() {
                if let Some(filter) = &filter {
                    if !entry.matches(filter) {
                        continue;
                    }
                }

                results.push(Ok(entry.to_tuple()));
                if results.len() >= limit {
                    break 'threads;
                }
            }
        }

        Ok(Box::pin(stream::iter(results)))
    }

    async fn put(
        &self,
        config: &CheckpointConfig,
        checkpoint: Checkpoint,
        metadata: CheckpointMetadata,
    ) -> Result<CheckpointConfig> {
        let thread_id = config.require_thread_id()?.to_string();

        let saved_config = CheckpointConfig {
            thread_id: Some(thread_id.clone()),
            checkpoint_id: Some(checkpoint.id.clone()),
        };

        let entry = CheckpointEntry {
            checkpoint,
            metadata,
            config: saved_config.clone(),
            parent_config: config.checkpoint_id.as_ref().map(|_| config.clone()),
        };

        let mut storage = self.storage.write().await;
        storage.entry(thread_id).or_default().push(entry);

        Ok(saved_config)
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        let mut storage = self.storage.write().await;
        match storage.remove(thread_id) {
            Some(entries) => {
                tracing::debug!(thread_id, removed = entries.len(), "deleted checkpoint thread");
                Ok(())
            }
            None => Err(CheckpointError::NotFound(format!("thread {}", thread_id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::CheckpointSource;
    use futures::StreamExt;
    use serde_json::json;

    async fn put_steps(saver: &InMemoryCheckpointSaver, thread: &str, steps: i32) -> Vec<CheckpointConfig> {
        let mut config = CheckpointConfig::for_thread(thread);
        let mut saved = Vec::new();
        for step in 0..steps {
            let metadata = CheckpointMetadata::new()
                .with_source(CheckpointSource::Loop)
                .with_step(step)
                .with_extra("step_parity", json!(step % 2));
            config = saver.put(&config, Checkpoint::empty(), metadata).await.unwrap();
            saved.push(config.clone());
        }
        saved
    }

    #[tokio::test]
    async fn test_save_and_load_latest() {
        let saver = InMemoryCheckpointSaver::new();
        let saved = put_steps(&saver, "thread-1", 3).await;

        let latest = saver
            .get_tuple(&CheckpointConfig::for_thread("thread-1"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(latest.config, saved[2]);
        assert_eq!(latest.metadata.step, 2);
        assert_eq!(latest.parent_config.as_ref(), Some(&saved[1]));
    }

    #[tokio::test]
    async fn test_load_by_checkpoint_id() {
        let saver = InMemoryCheckpointSaver::new();
        let saved = put_steps(&saver, "thread-1", 3).await;

        let first = saver.get_tuple(&saved[0]).await.unwrap().unwrap();
        assert_eq!(first.metadata.step, 0);
        assert!(first.parent_config.is_none());
    }

    #[tokio::test]
    async fn test_unknown_thread_is_none() {
        let saver = InMemoryCheckpointSaver::new();
        let missing = saver
            .get_tuple(&CheckpointConfig::for_thread("nope"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_put_requires_thread_id() {
        let saver = InMemoryCheckpointSaver::new();
        let err = saver
            .put(&CheckpointConfig::new(), Checkpoint::empty(), CheckpointMetadata::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckpointError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_list_newest_first_with_limit() {
        let saver = InMemoryCheckpointSaver::new();
        put_steps(&saver, "thread-1", 4).await;

        let config = CheckpointConfig::for_thread("thread-1");
        let steps: Vec<i32> = saver
            .list(Some(&config), None, None, Some(2))
            .await
            .unwrap()
            .map(|r| r.unwrap().metadata.step)
            .collect()
            .await;

        assert_eq!(steps, vec![3, 2]);
    }

    #[tokio::test]
    async fn test_list_with_filter_and_before() {
        let saver = InMemoryCheckpointSaver::new();
        let saved = put_steps(&saver, "thread-1", 5).await;

        let mut filter = HashMap::new();
        filter.insert("step_parity".to_string(), json!(0));

        let config = CheckpointConfig::for_thread("thread-1");
        let steps: Vec<i32> = saver
            .list(Some(&config), Some(filter), Some(&saved[4]), None)
            .await
            .unwrap()
            .map(|r| r.unwrap().metadata.step)
            .collect()
            .await;

        assert_eq!(steps, vec![2, 0]);
    }

    #[tokio::test]
    async fn test_threads_are_isolated() {
        let saver = InMemoryCheckpointSaver::new();
        put_steps(&saver, "thread-1", 2).await;
        put_steps(&saver, "thread-2", 1).await;

        assert_eq!(saver.thread_count().await, 2);
        assert_eq!(saver.checkpoint_count().await, 3);

        saver.delete_thread("thread-1").await.unwrap();
        assert_eq!(saver.thread_count().await, 1);
        assert!(saver.delete_thread("thread-1").await.is_err());

        saver.clear().await;
        assert_eq!(saver.checkpoint_count().await, 0);
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let saver = InMemoryCheckpointSaver::new();
        let shared = saver.clone();
        put_steps(&saver, "thread-1", 1).await;

        assert_eq!(shared.checkpoint_count().await, 1);
    }
}
