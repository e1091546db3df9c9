//! Checkpoint storage trait and the in-memory reference implementation
//!
//! [`CheckpointStore`] is the async persistence seam: the engine appends one
//! checkpoint per executed stage (or manual edit) and reads checkpoints back
//! for resumption, fork validation, and history browsing.
//!
//! [`InMemoryCheckpointLog`] keeps everything in a thread-safe
//! `HashMap<ThreadId, Vec<Checkpoint>>`. It is the intended store for the
//! engine's process-scoped persistence model: appends are all-or-nothing
//! under the write lock, entries are never mutated in place, and nothing is
//! ever deleted; dead branches from forks accumulate for the life of the
//! process, a known scaling limit if durable storage is ever layered in.
//!
//! # Consistency
//!
//! A partially written checkpoint is never visible: `append` takes the write
//! lock, pushes the complete entry, and releases. Readers (`get`, `history`)
//! take the read lock and observe either the state before the append or the
//! state after it, never anything in between.

use crate::{
    checkpoint::{Checkpoint, CheckpointId, ThreadId},
    error::Result,
};
use async_trait::async_trait;
use futures::stream::{self, Stream};
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Stream of checkpoints produced by [`CheckpointStore::history`],
/// newest-first.
pub type CheckpointStream<S, N> =
    Pin<Box<dyn Stream<Item = Result<Checkpoint<S, N>>> + Send>>;

/// Async storage seam for checkpoint persistence.
///
/// Implementations must treat the log as append-only: checkpoints are never
/// rewritten or removed once `append` returns.
#[async_trait]
pub trait CheckpointStore<S, N>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
    N: Clone + Send + Sync + 'static,
{
    /// Persist one checkpoint. All-or-nothing: on error nothing is stored.
    async fn append(&self, checkpoint: Checkpoint<S, N>) -> Result<()>;

    /// Point lookup by id within one thread's log.
    async fn get(
        &self,
        thread: ThreadId,
        checkpoint: &CheckpointId,
    ) -> Result<Option<Checkpoint<S, N>>>;

    /// The thread's full log in reverse-chronological order (newest first).
    async fn history(&self, thread: ThreadId) -> Result<CheckpointStream<S, N>>;
}

/// Thread-safe in-memory checkpoint log.
///
/// Clones share the same underlying storage.
///
/// # Example
///
/// ```rust
/// use redraft_checkpoint::{Checkpoint, CheckpointStore, InMemoryCheckpointLog, ThreadId};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let log: InMemoryCheckpointLog<u32, &'static str> = InMemoryCheckpointLog::new();
///     log.append(Checkpoint::genesis(ThreadId::from(0), 0, "entry")).await?;
///     assert_eq!(log.checkpoint_count().await, 1);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct InMemoryCheckpointLog<S, N> {
    entries: Arc<RwLock<HashMap<ThreadId, Vec<Checkpoint<S, N>>>>>,
}

impl<S, N> InMemoryCheckpointLog<S, N> {
    /// Create an empty log.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of threads with at least one checkpoint.
    pub async fn thread_count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Total number of checkpoints across all threads.
    pub async fn checkpoint_count(&self) -> usize {
        self.entries
            .read()
            .await
            .values()
            .map(|log| log.len())
            .sum()
    }

    /// Drop all checkpoints. Test-isolation helper.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

impl<S, N> Default for InMemoryCheckpointLog<S, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, N> Clone for InMemoryCheckpointLog<S, N> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

#[async_trait]
impl<S, N> CheckpointStore<S, N> for InMemoryCheckpointLog<S, N>
where
    S: Clone + Send + Sync + 'static,
    N: Clone + Send + Sync + 'static,
{
    async fn append(&self, checkpoint: Checkpoint<S, N>) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries
            .entry(checkpoint.thread_id)
            .or_default()
            .push(checkpoint);
        Ok(())
    }

    async fn get(
        &self,
        thread: ThreadId,
        checkpoint: &CheckpointId,
    ) -> Result<Option<Checkpoint<S, N>>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&thread)
            .and_then(|log| log.iter().find(|entry| &entry.id == checkpoint))
            .cloned())
    }

    async fn history(&self, thread: ThreadId) -> Result<CheckpointStream<S, N>> {
        let entries = self.entries.read().await;
        let snapshot: Vec<_> = entries
            .get(&thread)
            .map(|log| log.iter().rev().cloned().map(Ok).collect())
            .unwrap_or_default();
        Ok(Box::pin(stream::iter(snapshot)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn checkpoint_after(
        parent: &Checkpoint<u32, &'static str>,
        state: u32,
    ) -> Checkpoint<u32, &'static str> {
        Checkpoint {
            id: CheckpointId::next(),
            thread_id: parent.thread_id,
            parent: Some(parent.id.clone()),
            source: crate::CheckpointSource::Step,
            created_at_step: parent.created_at_step + 1,
            ts: chrono::Utc::now(),
            state,
            next_stage: Some("next"),
        }
    }

    #[tokio::test]
    async fn append_then_point_lookup() {
        let log = InMemoryCheckpointLog::new();
        let genesis = Checkpoint::genesis(ThreadId::from(0), 1u32, "entry");
        let id = genesis.id.clone();
        log.append(genesis).await.unwrap();

        let found = log.get(ThreadId::from(0), &id).await.unwrap().unwrap();
        assert_eq!(found.state, 1);

        // Same id under a different thread resolves to nothing.
        let missing = log.get(ThreadId::from(9), &id).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let log = InMemoryCheckpointLog::new();
        let genesis = Checkpoint::genesis(ThreadId::from(0), 0u32, "entry");
        let second = checkpoint_after(&genesis, 1);
        let third = checkpoint_after(&second, 2);
        for checkpoint in [genesis, second, third] {
            log.append(checkpoint).await.unwrap();
        }

        let states: Vec<u32> = log
            .history(ThreadId::from(0))
            .await
            .unwrap()
            .map(|entry| entry.unwrap().state)
            .collect()
            .await;
        assert_eq!(states, vec![2, 1, 0]);
    }

    #[tokio::test]
    async fn threads_are_isolated() {
        let log = InMemoryCheckpointLog::new();
        log.append(Checkpoint::genesis(ThreadId::from(0), 0u32, "entry"))
            .await
            .unwrap();
        log.append(Checkpoint::genesis(ThreadId::from(1), 0u32, "entry"))
            .await
            .unwrap();

        assert_eq!(log.thread_count().await, 2);
        assert_eq!(log.checkpoint_count().await, 2);

        let other: Vec<_> = log
            .history(ThreadId::from(1))
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(other.len(), 1);
    }

    #[tokio::test]
    async fn history_of_unknown_thread_is_empty() {
        let log: InMemoryCheckpointLog<u32, &'static str> = InMemoryCheckpointLog::new();
        let items: Vec<_> = log
            .history(ThreadId::from(7))
            .await
            .unwrap()
            .collect()
            .await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn clear_empties_the_log() {
        let log = InMemoryCheckpointLog::new();
        log.append(Checkpoint::genesis(ThreadId::from(0), 0u32, "entry"))
            .await
            .unwrap();
        assert_eq!(log.checkpoint_count().await, 1);

        log.clear().await;
        assert_eq!(log.checkpoint_count().await, 0);
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let log = InMemoryCheckpointLog::new();
        let alias = log.clone();
        alias
            .append(Checkpoint::genesis(ThreadId::from(0), 0u32, "entry"))
            .await
            .unwrap();
        assert_eq!(log.checkpoint_count().await, 1);
    }
}
