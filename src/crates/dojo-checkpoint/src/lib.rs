//! # dojo-checkpoint - Thread state persistence for dojo agents
//!
//! Checkpoints are snapshots of an agent thread's state, written after the run
//! input is merged and after every model turn. An agent configured with a
//! checkpoint saver resumes each thread from its latest checkpoint, which is
//! what gives a conversation memory across requests.
//!
//! ## Core Types
//!
//! - [`CheckpointSaver`] - storage backend trait
//! - [`InMemoryCheckpointSaver`] - process-local backend (the "memory saver")
//! - [`Checkpoint`], [`CheckpointConfig`], [`CheckpointMetadata`], [`CheckpointTuple`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dojo_checkpoint::{
//!     Checkpoint, CheckpointConfig, CheckpointMetadata, CheckpointSaver, InMemoryCheckpointSaver,
//! };
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let saver = InMemoryCheckpointSaver::new();
//!
//!     let state = json!({"messages": ["hello"]});
//!     let config = CheckpointConfig::for_thread("thread-123");
//!     let saved = saver
//!         .put(&config, Checkpoint::from_state(&state)?, CheckpointMetadata::new())
//!         .await?;
//!
//!     if let Some(tuple) = saver.get_tuple(&saved).await? {
//!         println!("restored {:?}", tuple.checkpoint.channel_values);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Nothing here outlives the process: "persistence" means retention across
//! turns of a thread while the server is running.

pub mod checkpoint;
pub mod error;
pub mod memory;
pub mod traits;

pub use checkpoint::{
    Checkpoint, CheckpointConfig, CheckpointId, CheckpointMetadata, CheckpointSource,
    CheckpointTuple, CHECKPOINT_VERSION,
};
pub use error::{CheckpointError, Result};
pub use memory::InMemoryCheckpointSaver;
pub use traits::{CheckpointSaver, CheckpointStream};
