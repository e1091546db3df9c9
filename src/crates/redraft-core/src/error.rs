//! Error types for engine operations
//!
//! # Error Taxonomy
//!
//! ```text
//! EngineError
//! ├── Validation          - bad input to a public call, nothing mutated
//! ├── UnknownThread       - thread id was never created
//! ├── InvalidField        - manual edit on a non-editable field
//! ├── CheckpointNotFound  - fork target not in the thread's log
//! ├── StageExecution      - a capability call failed; step abandoned, retryable
//! └── Checkpoint          - storage-level failure
//! ```
//!
//! Two things are deliberately *not* errors:
//!
//! - Reaching the `max_steps` safety bound in [`run`](crate::WorkflowEngine::run)
//!   ends the stream normally; the caller reads it as paused-not-finished.
//! - A search capability returning fewer results than requested. A *failed*
//!   search call, on the other hand, always surfaces as
//!   [`StageExecution`] and is never downgraded to "fewer results".
//!
//! [`StageExecution`]: EngineError::StageExecution

use crate::capabilities::CapabilityError;
use crate::state::Stage;
use redraft_checkpoint::{CheckpointId, ThreadId};
use thiserror::Error;

/// Convenience result type using [`EngineError`]
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by the workflow engine's public interface
#[derive(Error, Debug)]
pub enum EngineError {
    /// Bad input to a public call; rejected before any state mutation
    #[error("validation failed: {0}")]
    Validation(String),

    /// Thread id was never allocated by this engine
    #[error("unknown thread: {0}")]
    UnknownThread(ThreadId),

    /// Manual edits are restricted to the plan, draft, and critique fields
    #[error("field '{0}' cannot be edited manually (expected plan, draft, or critique)")]
    InvalidField(String),

    /// Fork target does not belong to the thread's checkpoint log
    #[error("checkpoint {checkpoint} not found in thread {thread}")]
    CheckpointNotFound {
        /// Thread whose log was searched
        thread: ThreadId,
        /// The missing checkpoint id
        checkpoint: CheckpointId,
    },

    /// A capability call failed mid-stage. Nothing was checkpointed and the
    /// live pointer is unchanged, so the same step can be retried.
    #[error("stage '{stage}' failed: {source}")]
    StageExecution {
        /// Stage that was executing when the capability failed
        stage: Stage,
        /// The underlying capability failure
        #[source]
        source: CapabilityError,
    },

    /// Checkpoint store failure
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] redraft_checkpoint::CheckpointError),
}

impl EngineError {
    /// Wrap a capability failure with the stage it interrupted.
    pub fn stage(stage: Stage, source: CapabilityError) -> Self {
        Self::StageExecution { stage, source }
    }
}
