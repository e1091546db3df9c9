//! # redraft-checkpoint - Versioned State Persistence for Workflow Threads
//!
//! **Append-only checkpoint log** for the redraft workflow engine. Every stage
//! execution (and every manual edit) produces one immutable [`Checkpoint`];
//! this crate owns the storage of those checkpoints, grouped per thread and
//! ordered by creation, so the engine can pause, resume, browse history, and
//! branch from any historical state.
//!
//! ## Overview
//!
//! Checkpoints enable:
//!
//! - **Pause / Resume** - the live pointer can sit on any checkpoint between steps
//! - **Time-Travel** - inspect the full state at any past execution point
//! - **Branching** - fork a thread by repointing it at an older checkpoint;
//!   the bypassed checkpoints stay in the log as dead branches
//! - **Manual Edits** - a user-overridden field lands as a new checkpoint,
//!   never as an in-place mutation
//!
//! ## Core Concepts
//!
//! ### 1. Append-Only Chain
//!
//! Storage is a flat per-thread sequence in creation order. Branching is a
//! *pointer* operation performed by the engine's thread manager, not a storage
//! operation: the log never forks, rewrites, or deletes.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  InMemoryCheckpointLog                                   │
//! │                                                          │
//! │  thread 0:  [genesis]──[step]──[step]──[edit]──[step]    │
//! │  thread 1:  [genesis]──[step]──[step]                    │
//! │                                                          │
//! │  • one Vec<Checkpoint> per ThreadId                      │
//! │  • append is all-or-nothing under the write lock         │
//! │  • history() iterates newest-first                       │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ### 2. CheckpointStore Trait
//!
//! [`CheckpointStore`] is the async seam between the engine and storage:
//! `append`, point lookup by [`CheckpointId`], and a reverse-chronological
//! `history` stream. [`InMemoryCheckpointLog`] is the process-scoped
//! reference implementation; a durable backend would implement the same
//! trait.
//!
//! ### 3. Sortable, Opaque Ids
//!
//! [`CheckpointId`]s are opaque strings whose lexicographic order equals
//! creation order (a process-wide sequence prefix plus a uuid-v4 suffix), so
//! callers can sort summaries without parsing anything out of the id.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use redraft_checkpoint::{Checkpoint, CheckpointStore, InMemoryCheckpointLog, ThreadId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let log: InMemoryCheckpointLog<String, &'static str> = InMemoryCheckpointLog::new();
//!
//!     let thread = ThreadId::from(0);
//!     let genesis = Checkpoint::genesis(thread, "initial state".to_string(), "first-stage");
//!     let id = genesis.id.clone();
//!     log.append(genesis).await?;
//!
//!     let found = log.get(thread, &id).await?;
//!     assert!(found.is_some());
//!     Ok(())
//! }
//! ```
//!
//! ## See Also
//!
//! - `redraft-core` - the workflow engine that writes one checkpoint per stage
//!   and owns the per-thread live pointers

pub mod checkpoint;
pub mod error;
pub mod log;

pub use checkpoint::{Checkpoint, CheckpointId, CheckpointSource, ThreadId};
pub use error::{CheckpointError, Result};
pub use log::{CheckpointStore, CheckpointStream, InMemoryCheckpointLog};
