//! # redraft-core - Resumable Content-Revision Workflow Engine
//!
//! A checkpointed state machine that turns a task description into revised
//! content through a fixed pipeline: outline the task, research the outline,
//! draft, critique the draft, research the critique, redraft, looping until
//! the thread's revision limit is reached.
//!
//! The engineering substance is not the pipeline itself but its
//! **resumability**: every stage execution lands as one immutable checkpoint
//! in an append-only per-thread log, execution can pause after any stage,
//! any historical checkpoint can become the new head (forking), and a user
//! can overwrite a stage's output by hand and have the workflow continue
//! coherently from the edited state.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  WorkflowEngine (the caller's only handle)                    │
//! │                                                               │
//! │  ┌─────────────┐    next_stage_for()   ┌──────────────────┐   │
//! │  │  Scheduler  │◄──────────────────────│  graph (topology │   │
//! │  │ step / run  │                       │  + continuation) │   │
//! │  └──────┬──────┘                       └──────────────────┘   │
//! │         │ executes                                            │
//! │  ┌──────▼──────────────────────────────────────────┐          │
//! │  │  stages: planner, research_plan, generate,      │          │
//! │  │          reflect, research_critique             │          │
//! │  └──────┬──────────────────────────────────────────┘          │
//! │         │ calls out through                                   │
//! │  ┌──────▼───────────────┐   ┌───────────────────────┐         │
//! │  │  CompletionModel     │   │  SearchProvider       │         │
//! │  │  (opaque capability) │   │  (opaque capability)  │         │
//! │  └──────────────────────┘   └───────────────────────┘         │
//! │                                                               │
//! │  ┌──────────────────────┐   ┌───────────────────────┐         │
//! │  │  ThreadManager       │──►│  CheckpointStore      │         │
//! │  │  live pointers,      │   │  (redraft-checkpoint) │         │
//! │  │  fork, manual edits  │   │  append-only log      │         │
//! │  └──────────────────────┘   └───────────────────────┘         │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! planner → research_plan → generate → ┬─ terminal (revision > limit)
//!               ▲                      └─ reflect → research_critique ─┐
//!               └──────────────────────────────────────────(generate)◄─┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use redraft_core::{RunOptions, Stage, WorkflowEngine};
//! use futures::StreamExt;
//!
//! let engine = WorkflowEngine::new(model, search);
//! let thread = engine.start_thread("The value of boring technology", 2).await?;
//!
//! // Run to the first draft, pausing there.
//! let options = RunOptions::new().with_stop_after([Stage::Generate]);
//! let mut progress = engine.run(thread, options);
//! while let Some(report) = progress.next().await {
//!     println!("{:?}", report?);
//! }
//! drop(progress);
//!
//! // Disagree with the critique? Overwrite it and keep going.
//! engine.edit_field(thread, "critique", "Tighten the intro.", Stage::Reflect).await?;
//! engine.step(thread).await?;
//!
//! // Or rewind: repoint the thread at any checkpoint in its history.
//! let history = engine.list_checkpoints(thread).await?;
//! engine.fork(thread, &history.last().unwrap().checkpoint_id).await?;
//! ```
//!
//! ## Concurrency Model
//!
//! Single writer per thread: `step`, `fork`, and `edit_field` serialize on a
//! per-thread lock, so no two mutations of one thread ever interleave.
//! Distinct threads are fully independent. Once `step` returns, every reader
//! observes the new live pointer and its checkpoint together.
//!
//! ## Error Model
//!
//! Validation failures reject a call before anything is mutated. Capability
//! failures abandon the attempted step: nothing checkpointed, pointer
//! unchanged, retry at will. Exhausting `run`'s step bound is a normal
//! pause, not an error. See [`error`] for the full taxonomy.

pub mod capabilities;
pub mod engine;
pub mod error;
pub mod graph;
pub mod prompts;
pub mod stages;
pub mod state;
mod threads;

pub use capabilities::{
    Capabilities, CapabilityError, CompletionModel, SearchProvider, SearchResult,
};
pub use engine::{RunOptions, StepReport, WorkflowEngine, DEFAULT_MAX_STEPS};
pub use error::{EngineError, Result};
pub use graph::{next_stage_for, ENTRY_STAGE};
pub use stages::{MAX_QUERIES, RESULTS_PER_QUERY};
pub use state::{Stage, StageUpdate, WorkflowState};
pub use threads::{CheckpointSummary, SharedStore, WorkflowCheckpoint};

// Storage layer, re-exported so most callers only need this crate.
pub use redraft_checkpoint::{
    Checkpoint, CheckpointId, CheckpointSource, CheckpointStore, InMemoryCheckpointLog,
    ThreadId,
};
