//! End-to-end engine demo
//!
//! Drives the revision workflow with scripted stand-in capabilities: runs to
//! the first draft, overrides the critique by hand, finishes the run, then
//! rewinds the thread to its first draft and branches a second ending.

use async_trait::async_trait;
use futures::StreamExt;
use redraft_core::{
    CapabilityError, CompletionModel, RunOptions, SearchProvider, SearchResult, Stage,
    WorkflowEngine,
};
use std::sync::Arc;

/// Stand-in completion model: replies depend only on the instruction prefix.
struct CannedModel;

#[async_trait]
impl CompletionModel for CannedModel {
    async fn complete(&self, instruction: &str, _input: &str) -> Result<String, CapabilityError> {
        let reply = if instruction.contains("outline") {
            "I. Hook  II. Background  III. Argument  IV. Counterpoint  V. Close"
        } else if instruction.contains("grading") {
            "Solid structure; the argument section needs concrete numbers."
        } else {
            "A five-paragraph essay built from the outline and research notes."
        };
        Ok(reply.to_string())
    }

    async fn complete_queries(
        &self,
        _instruction: &str,
        input: &str,
    ) -> Result<Vec<String>, CapabilityError> {
        Ok(vec![format!("background on: {}", input.chars().take(32).collect::<String>())])
    }
}

/// Stand-in search provider.
struct CannedSearch;

#[async_trait]
impl SearchProvider for CannedSearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, CapabilityError> {
        Ok((1..=max_results)
            .map(|n| SearchResult::new(format!("snippet {n} for '{query}'")))
            .collect())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Essay Revision Demo ===\n");

    let engine = WorkflowEngine::new(Arc::new(CannedModel), Arc::new(CannedSearch));
    let thread = engine
        .start_thread("Why boring technology wins", 1)
        .await?;

    // Run up to the first draft and pause there.
    println!("-- running to the first draft --");
    let to_first_draft = RunOptions::new().with_stop_after([Stage::Generate]);
    let mut progress = engine.run(thread, to_first_draft);
    while let Some(report) = progress.next().await {
        let report = report?;
        println!(
            "step {:>2}  {:<17} -> {}",
            report.step_count,
            report.last_stage.map_or("-", Stage::as_str),
            report.next_stage.map_or("terminal", Stage::as_str),
        );
    }
    drop(progress);

    println!("\ndraft: {}\n", engine.current_state(thread).await?.draft);

    // Disagree with the upcoming critique cycle? Write your own.
    engine
        .edit_field(
            thread,
            "critique",
            "Cut paragraph two entirely; lead with the outage anecdote.",
            Stage::Reflect,
        )
        .await?;
    println!("-- critique overridden by hand, resuming --");

    let mut rest = engine.run(thread, RunOptions::default());
    while let Some(report) = rest.next().await {
        let report = report?;
        println!(
            "step {:>2}  {:<17} -> {}",
            report.step_count,
            report.last_stage.map_or("-", Stage::as_str),
            report.next_stage.map_or("terminal", Stage::as_str),
        );
    }
    drop(rest);

    // Browse history, newest first.
    println!("\n-- checkpoint history --");
    let history = engine.list_checkpoints(thread).await?;
    for summary in &history {
        println!("{summary}");
    }

    // Rewind to the first draft and branch a second ending.
    let first_draft = history
        .iter()
        .find(|s| s.last_stage == Some(Stage::Generate) && s.revision_number == Some(1))
        .expect("first draft checkpoint");
    engine.fork(thread, &first_draft.checkpoint_id).await?;
    println!("\n-- forked back to the first draft, revising again --");

    let mut branch = engine.run(thread, RunOptions::default());
    while let Some(report) = branch.next().await {
        let report = report?;
        println!(
            "step {:>2}  {:<17} -> {}",
            report.step_count,
            report.last_stage.map_or("-", Stage::as_str),
            report.next_stage.map_or("terminal", Stage::as_str),
        );
    }
    drop(branch);

    println!(
        "\nfinal draft after branching: {}",
        engine.current_state(thread).await?.draft
    );
    println!(
        "checkpoints accumulated (dead branch included): {}",
        engine.list_checkpoints(thread).await?.len()
    );

    Ok(())
}
