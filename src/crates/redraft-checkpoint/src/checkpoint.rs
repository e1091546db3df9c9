//! Core checkpoint data structures
//!
//! This module defines the identifier types and the immutable [`Checkpoint`]
//! snapshot record. A checkpoint captures the complete workflow state after
//! one stage execution (or one manual edit) together with the metadata the
//! engine needs for resumption: which stage runs next, the predecessor link,
//! and the step number at creation time.
//!
//! The checkpoint is generic over the state payload `S` and the stage
//! vocabulary `N` so that storage stays decoupled from the engine's concrete
//! state shape.
//!
//! # Id Ordering
//!
//! [`CheckpointId`]s must be unique, opaque, and sortable by creation order.
//! Ids are rendered as a fixed-width hex sequence number (process-wide atomic
//! counter) followed by a uuid-v4 suffix:
//!
//! ```text
//! 0000000000000007-2f4c9a1e8bd346d1a0c2b7f5e6d84a90
//! └─ creation order ┘└─ opacity / uniqueness ────────┘
//! ```
//!
//! Lexicographic comparison of two ids therefore agrees with their creation
//! order, and nothing meaningful can be parsed back out of the suffix.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Process-wide checkpoint sequence counter. Monotonic across all threads
/// and all stores so that id order always equals creation order.
static CHECKPOINT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Unique checkpoint identifier, sortable by creation order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CheckpointId(String);

impl CheckpointId {
    /// Mint the next id in creation order.
    pub fn next() -> Self {
        let seq = CHECKPOINT_SEQ.fetch_add(1, Ordering::Relaxed);
        Self(format!("{seq:016x}-{}", Uuid::new_v4().simple()))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CheckpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an independent workflow run.
///
/// Thread ids are monotonically assigned by the engine's thread manager;
/// threads are process-scoped and never destroyed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ThreadId(u64);

impl ThreadId {
    /// The numeric value of the id.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for ThreadId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a checkpoint came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointSource {
    /// The thread's initial checkpoint, written at thread creation
    Genesis,
    /// Written by the scheduler after one stage execution
    Step,
    /// Written by a manual field edit
    Edit,
}

/// Immutable snapshot of workflow state plus resumption metadata.
///
/// Every checkpoint except a thread's genesis has exactly one predecessor
/// (`parent`) in creation order within that thread. Forking never copies or
/// rewrites checkpoints; it only changes which checkpoint a thread's live
/// pointer names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint<S, N> {
    /// Unique id, sortable by creation order
    pub id: CheckpointId,

    /// Thread this checkpoint belongs to
    pub thread_id: ThreadId,

    /// Immediate predecessor within the thread; `None` only for genesis
    pub parent: Option<CheckpointId>,

    /// Origin of the checkpoint
    pub source: CheckpointSource,

    /// The thread's step counter when this checkpoint was created
    pub created_at_step: u64,

    /// Creation timestamp
    pub ts: DateTime<Utc>,

    /// Full state snapshot
    pub state: S,

    /// Stage the scheduler will execute next; `None` means terminal
    pub next_stage: Option<N>,
}

impl<S, N> Checkpoint<S, N> {
    /// Build a thread's genesis checkpoint: no parent, step 0, and the
    /// pipeline's entry stage as `next_stage`.
    pub fn genesis(thread_id: ThreadId, state: S, entry_stage: N) -> Self {
        Self {
            id: CheckpointId::next(),
            thread_id,
            parent: None,
            source: CheckpointSource::Genesis,
            created_at_step: 0,
            ts: Utc::now(),
            state,
            next_stage: Some(entry_stage),
        }
    }
}
