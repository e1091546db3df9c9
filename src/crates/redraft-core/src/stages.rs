//! The five stage functions
//!
//! Each stage is a pure async transformation
//! `(state, capabilities) -> StageUpdate`: it reads the current
//! [`WorkflowState`], calls out through the capability seams, and returns a
//! partial update. Stages retain nothing across calls and never write state
//! themselves; merging (and the step counter) belongs to the scheduler.
//!
//! A failed capability call aborts the stage with
//! [`EngineError::StageExecution`]; partial progress (for instance, search
//! hits gathered for an earlier query in the same stage) is discarded with it.

use crate::capabilities::Capabilities;
use crate::error::{EngineError, Result};
use crate::prompts;
use crate::state::{Stage, StageUpdate, WorkflowState};

/// Query-list cap applied after structured completion. The model is asked to
/// stay within it; oversized lists are truncated, never rejected.
pub const MAX_QUERIES: usize = 3;

/// Search hits requested per query.
pub const RESULTS_PER_QUERY: usize = 2;

/// Execute one stage against the current state.
pub(crate) async fn execute(
    stage: Stage,
    state: &WorkflowState,
    capabilities: &Capabilities,
) -> Result<StageUpdate> {
    tracing::debug!(stage = %stage, "executing stage");
    match stage {
        Stage::Planner => planner(state, capabilities).await,
        Stage::ResearchPlan => research_plan(state, capabilities).await,
        Stage::Generate => generate(state, capabilities).await,
        Stage::Reflect => reflect(state, capabilities).await,
        Stage::ResearchCritique => research_critique(state, capabilities).await,
    }
}

/// Outline the task into a plan.
async fn planner(state: &WorkflowState, capabilities: &Capabilities) -> Result<StageUpdate> {
    if state.task.trim().is_empty() {
        return Err(EngineError::Validation(
            "planner requires a non-empty task".to_string(),
        ));
    }

    let plan = capabilities
        .model
        .complete(prompts::PLAN_PROMPT, &state.task)
        .await
        .map_err(|e| EngineError::stage(Stage::Planner, e))?;

    Ok(StageUpdate {
        plan: Some(plan),
        ..StageUpdate::for_stage(Stage::Planner)
    })
}

/// Derive queries from the task and append the search hits to `content`.
async fn research_plan(
    state: &WorkflowState,
    capabilities: &Capabilities,
) -> Result<StageUpdate> {
    let mut queries = capabilities
        .model
        .complete_queries(prompts::RESEARCH_PLAN_PROMPT, &state.task)
        .await
        .map_err(|e| EngineError::stage(Stage::ResearchPlan, e))?;
    queries.truncate(MAX_QUERIES);

    let content = gather(Stage::ResearchPlan, &queries, state, capabilities).await?;

    Ok(StageUpdate {
        content: Some(content),
        queries: Some(queries),
        ..StageUpdate::for_stage(Stage::ResearchPlan)
    })
}

/// Write (or rewrite) the draft from task, plan, and accumulated research.
async fn generate(state: &WorkflowState, capabilities: &Capabilities) -> Result<StageUpdate> {
    let context = state.content.join("\n\n");
    let instruction = format!("{}\n\n--------\n\n{context}", prompts::WRITER_PROMPT);
    let request = format!("{}\n\nHere is my plan:\n\n{}", state.task, state.plan);

    let draft = capabilities
        .model
        .complete(&instruction, &request)
        .await
        .map_err(|e| EngineError::stage(Stage::Generate, e))?;

    // An absent revision number counts as 1, so the first draft of such a
    // thread lands as revision 2. Preserved upstream behavior; genesis
    // states write 0 and are unaffected.
    let revision = state.revision_number.unwrap_or(1) + 1;

    Ok(StageUpdate {
        draft: Some(draft),
        revision_number: Some(revision),
        ..StageUpdate::for_stage(Stage::Generate)
    })
}

/// Critique the current draft.
async fn reflect(state: &WorkflowState, capabilities: &Capabilities) -> Result<StageUpdate> {
    let critique = capabilities
        .model
        .complete(prompts::REFLECTION_PROMPT, &state.draft)
        .await
        .map_err(|e| EngineError::stage(Stage::Reflect, e))?;

    Ok(StageUpdate {
        critique: Some(critique),
        ..StageUpdate::for_stage(Stage::Reflect)
    })
}

/// Derive queries from the critique and append the hits to the same
/// `content` sequence the plan research feeds.
async fn research_critique(
    state: &WorkflowState,
    capabilities: &Capabilities,
) -> Result<StageUpdate> {
    let mut queries = capabilities
        .model
        .complete_queries(prompts::RESEARCH_CRITIQUE_PROMPT, &state.critique)
        .await
        .map_err(|e| EngineError::stage(Stage::ResearchCritique, e))?;
    queries.truncate(MAX_QUERIES);

    let content = gather(Stage::ResearchCritique, &queries, state, capabilities).await?;

    Ok(StageUpdate {
        content: Some(content),
        ..StageUpdate::for_stage(Stage::ResearchCritique)
    })
}

/// Run every query and append each hit's text to a copy of the current
/// content. A search failure aborts the whole stage; it is never downgraded
/// to fewer results.
async fn gather(
    stage: Stage,
    queries: &[String],
    state: &WorkflowState,
    capabilities: &Capabilities,
) -> Result<Vec<String>> {
    let mut content = state.content.clone();
    for query in queries {
        let results = capabilities
            .search
            .search(query, RESULTS_PER_QUERY)
            .await
            .map_err(|e| EngineError::stage(stage, e))?;
        tracing::debug!(stage = %stage, query = %query, hits = results.len(), "search complete");
        content.extend(results.into_iter().map(|hit| hit.text));
    }
    Ok(content)
}
