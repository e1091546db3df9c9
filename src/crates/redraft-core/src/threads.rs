//! Thread manager: live pointers, forking, and manual edits
//!
//! The [`ThreadManager`] exclusively owns the mapping from [`ThreadId`] to
//! the thread's *live pointer*, the checkpoint that future steps build on.
//! Everything time-travel-shaped lives here:
//!
//! - **fork** repoints the live pointer at an older checkpoint. The
//!   checkpoints that used to follow it stay in the log for history browsing
//!   but drop off the live chain: dead branches, never deleted.
//! - **manual edits** overwrite exactly one of `plan` / `draft` / `critique`
//!   in a copy of the live state and append it as a new checkpoint whose
//!   `next_stage` is recomputed as if the attributed stage had just run, so
//!   execution proceeds coherently from the edited state. Edits are not
//!   workflow steps: the step counter does not move.
//!
//! Each thread also carries a step mutex. The scheduler (and `edit_field`)
//! hold it for the duration of one mutation, which makes the
//! single-writer-per-thread contract a guarantee instead of a caller
//! obligation. Different threads never contend.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use redraft_checkpoint::{
    Checkpoint, CheckpointId, CheckpointSource, CheckpointStore, ThreadId,
};

use crate::error::{EngineError, Result};
use crate::graph::{next_stage_for, ENTRY_STAGE};
use crate::state::{Stage, WorkflowState};

/// Checkpoint instantiated with the engine's state and stage types.
pub type WorkflowCheckpoint = Checkpoint<WorkflowState, Stage>;

/// Shared handle to the engine's checkpoint store.
pub type SharedStore = Arc<dyn CheckpointStore<WorkflowState, Stage>>;

/// Human-scannable checkpoint identifier tuple, newest-first in
/// [`listings`](crate::WorkflowEngine::list_checkpoints).
///
/// The [`Display`](fmt::Display) rendering
/// (`thread:step:last:next:revision:checkpoint-id`) exists purely for
/// presentation; lookups always go through the typed `checkpoint_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckpointSummary {
    pub thread_id: ThreadId,
    pub step_count: u64,
    pub last_stage: Option<Stage>,
    pub next_stage: Option<Stage>,
    pub revision_number: Option<u32>,
    pub checkpoint_id: CheckpointId,
}

impl CheckpointSummary {
    fn for_checkpoint(checkpoint: &WorkflowCheckpoint) -> Self {
        Self {
            thread_id: checkpoint.thread_id,
            step_count: checkpoint.state.step_count,
            last_stage: checkpoint.state.last_stage,
            next_stage: checkpoint.next_stage,
            revision_number: checkpoint.state.revision_number,
            checkpoint_id: checkpoint.id.clone(),
        }
    }
}

impl fmt::Display for CheckpointSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self.last_stage.map_or("-", Stage::as_str);
        let next = self.next_stage.map_or("-", Stage::as_str);
        write!(
            f,
            "{}:{}:{}:{}:{}:{}",
            self.thread_id,
            self.step_count,
            last,
            next,
            self.revision_number
                .map_or_else(|| "-".to_string(), |r| r.to_string()),
            self.checkpoint_id,
        )
    }
}

/// Fields a manual edit may overwrite.
enum EditableField {
    Plan,
    Draft,
    Critique,
}

impl EditableField {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "plan" => Some(Self::Plan),
            "draft" => Some(Self::Draft),
            "critique" => Some(Self::Critique),
            _ => None,
        }
    }

    fn write(&self, state: &mut WorkflowState, value: String) {
        match self {
            Self::Plan => state.plan = value,
            Self::Draft => state.draft = value,
            Self::Critique => state.critique = value,
        }
    }
}

struct ThreadEntry {
    live: CheckpointId,
    step_lock: Arc<Mutex<()>>,
}

/// Owner of thread ids, live pointers, and per-thread step locks.
pub(crate) struct ThreadManager {
    store: SharedStore,
    threads: RwLock<HashMap<ThreadId, ThreadEntry>>,
    next_thread: AtomicU64,
}

impl ThreadManager {
    pub(crate) fn new(store: SharedStore) -> Self {
        Self {
            store,
            threads: RwLock::new(HashMap::new()),
            next_thread: AtomicU64::new(0),
        }
    }

    /// Allocate a thread id and write its genesis checkpoint.
    pub(crate) async fn create(&self, state: WorkflowState) -> Result<WorkflowCheckpoint> {
        let thread = ThreadId::from(self.next_thread.fetch_add(1, Ordering::Relaxed));
        let genesis = Checkpoint::genesis(thread, state, ENTRY_STAGE);
        self.store.append(genesis.clone()).await?;
        self.threads.write().await.insert(
            thread,
            ThreadEntry {
                live: genesis.id.clone(),
                step_lock: Arc::new(Mutex::new(())),
            },
        );
        Ok(genesis)
    }

    /// The thread's step mutex. Held across one step, fork, or manual edit.
    pub(crate) async fn step_lock(&self, thread: ThreadId) -> Result<Arc<Mutex<()>>> {
        let threads = self.threads.read().await;
        let entry = threads
            .get(&thread)
            .ok_or(EngineError::UnknownThread(thread))?;
        Ok(Arc::clone(&entry.step_lock))
    }

    /// Fail early when `thread` was never created by this manager.
    async fn assert_thread(&self, thread: ThreadId) -> Result<()> {
        if self.threads.read().await.contains_key(&thread) {
            Ok(())
        } else {
            Err(EngineError::UnknownThread(thread))
        }
    }

    /// Resolve the thread's live checkpoint.
    pub(crate) async fn live(&self, thread: ThreadId) -> Result<WorkflowCheckpoint> {
        let live_id = {
            let threads = self.threads.read().await;
            threads
                .get(&thread)
                .ok_or(EngineError::UnknownThread(thread))?
                .live
                .clone()
        };
        let checkpoint = self.store.get(thread, &live_id).await?.ok_or_else(|| {
            redraft_checkpoint::CheckpointError::NotFound(live_id.to_string())
        })?;
        Ok(checkpoint)
    }

    /// Append a checkpoint and advance the live pointer to it.
    ///
    /// The pointer moves only after the append has completed, so a reader
    /// never observes a pointer naming an unwritten checkpoint.
    pub(crate) async fn advance(
        &self,
        thread: ThreadId,
        checkpoint: WorkflowCheckpoint,
    ) -> Result<()> {
        let live_id = checkpoint.id.clone();
        self.store.append(checkpoint).await?;
        let mut threads = self.threads.write().await;
        let entry = threads
            .get_mut(&thread)
            .ok_or(EngineError::UnknownThread(thread))?;
        entry.live = live_id;
        Ok(())
    }

    /// Repoint the live pointer at `target`, which must belong to the
    /// thread's log. On failure the pointer is untouched.
    pub(crate) async fn fork(
        &self,
        thread: ThreadId,
        target: &CheckpointId,
    ) -> Result<WorkflowCheckpoint> {
        let lock = self.step_lock(thread).await?;
        let _guard = lock.lock().await;

        // Validate membership before moving anything.
        let checkpoint = self.store.get(thread, target).await?.ok_or_else(|| {
            EngineError::CheckpointNotFound {
                thread,
                checkpoint: target.clone(),
            }
        })?;

        let mut threads = self.threads.write().await;
        let entry = threads
            .get_mut(&thread)
            .ok_or(EngineError::UnknownThread(thread))?;
        entry.live = checkpoint.id.clone();
        tracing::info!(thread = %thread, checkpoint = %checkpoint.id, "forked to checkpoint");
        Ok(checkpoint)
    }

    /// Overwrite one editable field of the live state as a new checkpoint.
    pub(crate) async fn edit_field(
        &self,
        thread: ThreadId,
        field: &str,
        value: String,
        attributed: Stage,
    ) -> Result<WorkflowCheckpoint> {
        let editable = EditableField::from_name(field)
            .ok_or_else(|| EngineError::InvalidField(field.to_string()))?;

        let lock = self.step_lock(thread).await?;
        let _guard = lock.lock().await;

        let live = self.live(thread).await?;
        let mut state = live.state.clone();
        editable.write(&mut state, value);
        state.last_stage = Some(attributed);

        let next_stage = next_stage_for(attributed, &state);
        let checkpoint = WorkflowCheckpoint {
            id: CheckpointId::next(),
            thread_id: thread,
            parent: Some(live.id.clone()),
            source: CheckpointSource::Edit,
            // Manual edits are not workflow steps; the counter stands still.
            created_at_step: state.step_count,
            ts: Utc::now(),
            state,
            next_stage,
        };
        self.advance(thread, checkpoint.clone()).await?;
        tracing::info!(thread = %thread, field = field, attributed = %attributed, "manual edit applied");
        Ok(checkpoint)
    }

    /// Checkpoint summaries, newest first.
    pub(crate) async fn list_checkpoints(
        &self,
        thread: ThreadId,
    ) -> Result<Vec<CheckpointSummary>> {
        // Unknown threads are a caller error, not an empty listing.
        self.assert_thread(thread).await?;
        use futures::StreamExt;
        let mut history = self.store.history(thread).await?;
        let mut summaries = Vec::new();
        while let Some(checkpoint) = history.next().await {
            summaries.push(CheckpointSummary::for_checkpoint(&checkpoint?));
        }
        Ok(summaries)
    }

    /// Every thread this manager has created, in allocation order.
    pub(crate) async fn list_threads(&self) -> Vec<ThreadId> {
        let mut ids: Vec<ThreadId> = self.threads.read().await.keys().copied().collect();
        ids.sort();
        ids
    }
}
