//! The workflow scheduler and public engine facade
//!
//! [`WorkflowEngine`] is the single handle a caller (a GUI, a CLI, a test)
//! holds. It drives the fixed pipeline step by step, writing exactly one
//! checkpoint per executed stage:
//!
//! ```text
//!        step(thread)
//!            │
//!            ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │ 1. take the thread's step lock                           │
//! │ 2. load the live checkpoint                              │
//! │ 3. execute its next_stage against the capabilities       │
//! │    └─ failure? nothing written, pointer unchanged, retry │
//! │ 4. merge the StageUpdate into a copy of the state        │
//! │ 5. advance step_count, recompute next_stage              │
//! │ 6. append the checkpoint, move the live pointer          │
//! │ 7. return the step report                                │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! [`run`](WorkflowEngine::run) wraps `step` into a lazy stream so a caller
//! can consume progress incrementally, stop after configured stages
//! ("interrupt points"), and rely on a hard step bound when the stop set is
//! misconfigured. Exhausting the bound ends the stream normally; the run is
//! paused, not failed.

use std::collections::HashSet;
use std::pin::Pin;
use std::sync::Arc;

use chrono::Utc;
use futures::Stream;
use serde::Serialize;

use redraft_checkpoint::{
    CheckpointId, CheckpointSource, InMemoryCheckpointLog, ThreadId,
};

use crate::capabilities::{Capabilities, CompletionModel, SearchProvider};
use crate::error::{EngineError, Result};
use crate::graph::next_stage_for;
use crate::stages;
use crate::state::{Stage, WorkflowState};
use crate::threads::{
    CheckpointSummary, SharedStore, ThreadManager, WorkflowCheckpoint,
};

/// Default hard bound on steps per [`WorkflowEngine::run`] call.
pub const DEFAULT_MAX_STEPS: usize = 10;

/// Outcome descriptor of one executed step (also returned by `fork`, where
/// it describes the checkpoint the thread was repointed to).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    /// Stage that produced the checkpoint (`None` only for genesis)
    pub last_stage: Option<Stage>,
    /// Stage the scheduler will execute next; `None` means terminal
    pub next_stage: Option<Stage>,
    /// Draft revision counter
    pub revision_number: Option<u32>,
    /// Thread-wide stage-execution counter
    pub step_count: u64,
}

impl StepReport {
    fn for_checkpoint(checkpoint: &WorkflowCheckpoint) -> Self {
        Self {
            last_stage: checkpoint.state.last_stage,
            next_stage: checkpoint.next_stage,
            revision_number: checkpoint.state.revision_number,
            step_count: checkpoint.state.step_count,
        }
    }
}

/// Options for [`WorkflowEngine::run`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Stages to pause after (interrupt points). Empty means run freely.
    pub stop_after: HashSet<Stage>,
    /// Hard bound on steps executed by this call.
    pub max_steps: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            stop_after: HashSet::new(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pause after any of the given stages.
    pub fn with_stop_after(mut self, stages: impl IntoIterator<Item = Stage>) -> Self {
        self.stop_after = stages.into_iter().collect();
        self
    }

    /// Override the step bound.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}

/// The resumable content-revision workflow engine.
///
/// Holds the thread manager, the checkpoint store, and the external
/// capability handles. All state is explicit: callers address everything by
/// [`ThreadId`].
pub struct WorkflowEngine {
    threads: ThreadManager,
    capabilities: Capabilities,
}

impl WorkflowEngine {
    /// Engine backed by a fresh in-memory checkpoint log.
    pub fn new(model: Arc<dyn CompletionModel>, search: Arc<dyn SearchProvider>) -> Self {
        Self::with_store(model, search, Arc::new(InMemoryCheckpointLog::new()))
    }

    /// Engine backed by a caller-supplied checkpoint store.
    pub fn with_store(
        model: Arc<dyn CompletionModel>,
        search: Arc<dyn SearchProvider>,
        store: SharedStore,
    ) -> Self {
        Self {
            threads: ThreadManager::new(store),
            capabilities: Capabilities::new(model, search),
        }
    }

    /// Create a new thread for `task` and return its id.
    ///
    /// Writes the genesis checkpoint (`next_stage = planner`, step 0,
    /// revision 0). `max_revisions` bounds how many times the draft is
    /// rewritten after critique.
    #[tracing::instrument(skip(self, task))]
    pub async fn start_thread(
        &self,
        task: impl Into<String>,
        max_revisions: u32,
    ) -> Result<ThreadId> {
        let task = task.into();
        if task.trim().is_empty() {
            return Err(EngineError::Validation(
                "task must not be empty".to_string(),
            ));
        }
        if max_revisions == 0 {
            return Err(EngineError::Validation(
                "max_revisions must be at least 1".to_string(),
            ));
        }

        let genesis = self
            .threads
            .create(WorkflowState::new(task, max_revisions))
            .await?;
        tracing::info!(thread = %genesis.thread_id, "thread started");
        Ok(genesis.thread_id)
    }

    /// Execute exactly one stage for the thread's live checkpoint.
    ///
    /// On capability failure nothing is checkpointed and the live pointer is
    /// unchanged, so the same step can simply be retried. Stepping a thread
    /// whose run already terminated is a validation error.
    #[tracing::instrument(skip(self))]
    pub async fn step(&self, thread: ThreadId) -> Result<StepReport> {
        let lock = self.threads.step_lock(thread).await?;
        let _guard = lock.lock().await;

        let live = self.threads.live(thread).await?;
        let Some(stage) = live.next_stage else {
            return Err(EngineError::Validation(format!(
                "thread {thread} has terminated; fork to an earlier checkpoint to continue"
            )));
        };

        let update = stages::execute(stage, &live.state, &self.capabilities).await?;

        let mut state = live.state.apply(update);
        state.step_count += 1;
        let next_stage = next_stage_for(stage, &state);

        let checkpoint = WorkflowCheckpoint {
            id: CheckpointId::next(),
            thread_id: thread,
            parent: Some(live.id.clone()),
            source: CheckpointSource::Step,
            created_at_step: state.step_count,
            ts: Utc::now(),
            state,
            next_stage,
        };
        self.threads.advance(thread, checkpoint.clone()).await?;

        let report = StepReport::for_checkpoint(&checkpoint);
        if report.next_stage.is_none() {
            tracing::info!(thread = %thread, steps = report.step_count, "run terminated");
        } else {
            tracing::debug!(
                thread = %thread,
                stage = %stage,
                next = ?report.next_stage,
                "step complete"
            );
        }
        Ok(report)
    }

    /// Step repeatedly, yielding one report per executed step.
    ///
    /// The sequence is lazy and finite. It ends after (a) a step whose stage
    /// is in `stop_after`, (b) the terminal stage, or (c) `max_steps` steps
    /// in this call, whichever comes first. A fresh call starts a fresh
    /// sequence from the current live pointer.
    pub fn run(
        &self,
        thread: ThreadId,
        options: RunOptions,
    ) -> Pin<Box<dyn Stream<Item = Result<StepReport>> + Send + '_>> {
        Box::pin(async_stream::try_stream! {
            for _ in 0..options.max_steps {
                let report = self.step(thread).await?;
                let just_ran = report.last_stage;
                let next = report.next_stage;
                yield report;
                if next.is_none() {
                    break;
                }
                if just_ran.is_some_and(|stage| options.stop_after.contains(&stage)) {
                    tracing::debug!(thread = %thread, "paused at interrupt point");
                    break;
                }
            }
        })
    }

    /// Repoint the thread's live pointer at a historical checkpoint.
    ///
    /// Subsequent steps append after that checkpoint; the bypassed ones stay
    /// in the log as a dead branch. Fails with
    /// [`EngineError::CheckpointNotFound`] (pointer untouched) when the id is
    /// not in this thread's log.
    #[tracing::instrument(skip(self))]
    pub async fn fork(&self, thread: ThreadId, checkpoint: &CheckpointId) -> Result<StepReport> {
        let target = self.threads.fork(thread, checkpoint).await?;
        Ok(StepReport::for_checkpoint(&target))
    }

    /// Overwrite one of `plan` / `draft` / `critique` in the live state.
    ///
    /// The edit lands as a new checkpoint attributed to `attributed_stage`,
    /// with `next_stage` recomputed as if that stage had just run; the
    /// workflow then proceeds from the edited state without re-executing the
    /// completion call. The step counter does not move.
    #[tracing::instrument(skip(self, value))]
    pub async fn edit_field(
        &self,
        thread: ThreadId,
        field: &str,
        value: impl Into<String>,
        attributed_stage: Stage,
    ) -> Result<()> {
        self.threads
            .edit_field(thread, field, value.into(), attributed_stage)
            .await?;
        Ok(())
    }

    /// Checkpoint summaries for the thread, newest first.
    pub async fn list_checkpoints(&self, thread: ThreadId) -> Result<Vec<CheckpointSummary>> {
        self.threads.list_checkpoints(thread).await
    }

    /// The live checkpoint's full state.
    pub async fn current_state(&self, thread: ThreadId) -> Result<WorkflowState> {
        Ok(self.threads.live(thread).await?.state)
    }

    /// The live checkpoint's accumulated research snippets.
    pub async fn current_content(&self, thread: ThreadId) -> Result<Vec<String>> {
        Ok(self.threads.live(thread).await?.state.content)
    }

    /// Ids of every thread this engine has created, in allocation order.
    pub async fn list_threads(&self) -> Vec<ThreadId> {
        self.threads.list_threads().await
    }
}
