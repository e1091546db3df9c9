//! Scripted capability fakes shared by the integration suites.
#![allow(dead_code)] // each test binary uses its own subset

use async_trait::async_trait;
use redraft_core::{
    CapabilityError, CompletionModel, SearchProvider, SearchResult,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Deterministic completion model.
///
/// Free-form completions reply `completion-<n>` with a global call counter;
/// structured completions reply with a fixed query list. Every request is
/// recorded as `(instruction, input)` so tests can assert what a stage was
/// actually asked.
pub struct ScriptedModel {
    queries: Vec<String>,
    counter: AtomicUsize,
    requests: Mutex<Vec<(String, String)>>,
}

impl ScriptedModel {
    pub fn new() -> Arc<Self> {
        Self::with_queries(&["alpha", "beta"])
    }

    pub fn with_queries(queries: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            queries: queries.iter().map(|q| q.to_string()).collect(),
            counter: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Every `(instruction, input)` pair seen so far, in call order.
    pub async fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl CompletionModel for ScriptedModel {
    async fn complete(
        &self,
        instruction: &str,
        input: &str,
    ) -> Result<String, CapabilityError> {
        self.requests
            .lock()
            .await
            .push((instruction.to_string(), input.to_string()));
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        Ok(format!("completion-{n}"))
    }

    async fn complete_queries(
        &self,
        instruction: &str,
        input: &str,
    ) -> Result<Vec<String>, CapabilityError> {
        self.requests
            .lock()
            .await
            .push((instruction.to_string(), input.to_string()));
        Ok(self.queries.clone())
    }
}

/// Search fake answering `<query>/result-<n>` snippets, as many as asked for.
pub struct StaticSearch;

impl StaticSearch {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }
}

#[async_trait]
impl SearchProvider for StaticSearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, CapabilityError> {
        Ok((0..max_results)
            .map(|n| SearchResult::new(format!("{query}/result-{n}")))
            .collect())
    }
}

/// Search fake that fails a configured number of calls before recovering.
pub struct FlakySearch {
    failures_left: AtomicUsize,
}

impl FlakySearch {
    pub fn failing(times: usize) -> Arc<Self> {
        Arc::new(Self {
            failures_left: AtomicUsize::new(times),
        })
    }
}

#[async_trait]
impl SearchProvider for FlakySearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, CapabilityError> {
        let left = self.failures_left.load(Ordering::Relaxed);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::Relaxed);
            return Err(CapabilityError::Provider(
                "search backend unavailable".to_string(),
            ));
        }
        Ok((0..max_results)
            .map(|n| SearchResult::new(format!("{query}/result-{n}")))
            .collect())
    }
}
