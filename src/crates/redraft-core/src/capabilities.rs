//! External capability seams
//!
//! The engine treats language generation and web search as opaque
//! capabilities behind two object-safe async traits. Providers implement
//! [`CompletionModel`] and [`SearchProvider`]; the engine only ever holds
//! `Arc<dyn …>` handles bundled in [`Capabilities`].
//!
//! Timeouts and cancellation are the provider's responsibility: the engine
//! imposes no timeout of its own, and a provider-side timeout surfaces as a
//! [`CapabilityError`], which the scheduler reports as a retryable stage
//! failure.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// A failed or unusable capability call
#[derive(Error, Debug)]
pub enum CapabilityError {
    /// The provider call itself failed (transport, quota, timeout, …)
    #[error("provider failure: {0}")]
    Provider(String),

    /// The provider answered, but the result was unusable
    /// (e.g. a structured query list that could not be parsed)
    #[error("malformed result: {0}")]
    Malformed(String),
}

/// Opaque text-completion capability.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Free-form completion: a fixed instruction applied to caller input.
    async fn complete(&self, instruction: &str, input: &str)
        -> Result<String, CapabilityError>;

    /// Structured completion returning a list of search queries.
    ///
    /// The model is asked to stay within the engine's query cap, but callers
    /// must not rely on that: the engine truncates oversized lists instead of
    /// erroring.
    async fn complete_queries(
        &self,
        instruction: &str,
        input: &str,
    ) -> Result<Vec<String>, CapabilityError>;
}

/// One search hit. Only the snippet text is consumed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Snippet text appended to the research content
    pub text: String,
}

impl SearchResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Opaque web-search capability.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one query, returning at most `max_results` hits in rank order.
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, CapabilityError>;
}

/// The capability bundle handed to every stage execution.
#[derive(Clone)]
pub struct Capabilities {
    /// Text-completion capability
    pub model: Arc<dyn CompletionModel>,
    /// Web-search capability
    pub search: Arc<dyn SearchProvider>,
}

impl Capabilities {
    pub fn new(model: Arc<dyn CompletionModel>, search: Arc<dyn SearchProvider>) -> Self {
        Self { model, search }
    }
}
