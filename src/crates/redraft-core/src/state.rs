//! Workflow state and the stage vocabulary
//!
//! [`WorkflowState`] is the single record threading through every stage of a
//! revision run. Stages never mutate it: each returns a [`StageUpdate`] delta
//! and the scheduler merges the delta into a copy of the prior state with
//! [`WorkflowState::apply`], so every checkpoint holds a complete,
//! self-contained snapshot.
//!
//! Field ownership is strict:
//!
//! | Field             | Written by                         |
//! |-------------------|------------------------------------|
//! | `task`            | thread creation only               |
//! | `plan`            | planner                            |
//! | `draft`           | generate                           |
//! | `critique`        | reflect                            |
//! | `content`         | both research stages (append-only) |
//! | `queries`         | research_plan                      |
//! | `revision_number` | generate                           |
//! | `max_revisions`   | thread creation only               |
//! | `last_stage`      | every stage (via merge)            |
//! | `step_count`      | the scheduler (never a stage)      |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

/// One named transformation step in the fixed revision pipeline.
///
/// The serialized / displayed names (`planner`, `research_plan`, `generate`,
/// `reflect`, `research_critique`) are the engine's wire vocabulary: they
/// appear in checkpoint summaries and are accepted in `run` stop sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Outline the task into a plan
    Planner,
    /// Search for material supporting the plan
    ResearchPlan,
    /// Write (or rewrite) the draft
    Generate,
    /// Critique the current draft
    Reflect,
    /// Search for material addressing the critique
    ResearchCritique,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: [Stage; 5] = [
        Stage::Planner,
        Stage::ResearchPlan,
        Stage::Generate,
        Stage::Reflect,
        Stage::ResearchCritique,
    ];

    /// The stage's wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Planner => "planner",
            Stage::ResearchPlan => "research_plan",
            Stage::Generate => "generate",
            Stage::Reflect => "reflect",
            Stage::ResearchCritique => "research_critique",
        }
    }

    /// Parse a wire name back into a stage.
    pub fn from_name(name: &str) -> Option<Self> {
        Stage::ALL.into_iter().find(|stage| stage.as_str() == name)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::from_name(s)
            .ok_or_else(|| EngineError::Validation(format!("unknown stage name '{s}'")))
    }
}

/// The complete workflow state carried by every checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    /// The user goal; immutable after thread creation
    pub task: String,

    /// Latest outline
    #[serde(default)]
    pub plan: String,

    /// Latest generated content
    #[serde(default)]
    pub draft: String,

    /// Latest critique of the draft
    #[serde(default)]
    pub critique: String,

    /// Accumulated research snippets; grows, never shrinks
    #[serde(default)]
    pub content: Vec<String>,

    /// Most recent search queries issued
    #[serde(default)]
    pub queries: Vec<String>,

    /// Draft counter, incremented by generate. When the field is absent,
    /// generate treats the prior value as 1 (preserved upstream behavior:
    /// the first draft then lands as revision 2).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_number: Option<u32>,

    /// Revision limit; immutable per thread
    pub max_revisions: u32,

    /// Stage that produced this state; `None` only at genesis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_stage: Option<Stage>,

    /// Total scheduler-driven stage executions across the whole thread,
    /// including along forked-away history; never reset
    #[serde(default)]
    pub step_count: u64,
}

impl WorkflowState {
    /// Genesis state for a new thread.
    pub fn new(task: impl Into<String>, max_revisions: u32) -> Self {
        Self {
            task: task.into(),
            plan: String::new(),
            draft: String::new(),
            critique: String::new(),
            content: Vec::new(),
            queries: Vec::new(),
            revision_number: Some(0),
            max_revisions,
            last_stage: None,
            step_count: 0,
        }
    }

    /// Merge a stage's delta into a copy of this state.
    ///
    /// `step_count` is not touched here: it is a cross-cutting counter the
    /// scheduler advances itself, so stages stay pure and manual edits can
    /// reuse checkpoint construction without counting as steps.
    pub fn apply(&self, update: StageUpdate) -> Self {
        let mut next = self.clone();
        if let Some(plan) = update.plan {
            next.plan = plan;
        }
        if let Some(draft) = update.draft {
            next.draft = draft;
        }
        if let Some(critique) = update.critique {
            next.critique = critique;
        }
        if let Some(content) = update.content {
            next.content = content;
        }
        if let Some(queries) = update.queries {
            next.queries = queries;
        }
        if let Some(revision) = update.revision_number {
            next.revision_number = Some(revision);
        }
        next.last_stage = Some(update.stage);
        next
    }
}

/// Partial state update returned by one stage execution.
///
/// Only the fields a stage actually produced are `Some`; everything else is
/// carried forward unchanged by [`WorkflowState::apply`].
#[derive(Debug, Clone)]
pub struct StageUpdate {
    pub plan: Option<String>,
    pub draft: Option<String>,
    pub critique: Option<String>,
    pub content: Option<Vec<String>>,
    pub queries: Option<Vec<String>>,
    pub revision_number: Option<u32>,
    /// The stage that produced this update; becomes `last_stage` on merge
    pub stage: Stage,
}

impl StageUpdate {
    /// An empty update attributed to `stage`.
    pub fn for_stage(stage: Stage) -> Self {
        Self {
            plan: None,
            draft: None,
            critique: None,
            content: None,
            queries: None,
            revision_number: None,
            stage,
        }
    }
}
