//! Pipeline topology and the continuation rule
//!
//! The stage ordering is static:
//!
//! ```text
//! planner ──► research_plan ──► generate ──►┬── terminal
//!                                  ▲        └── reflect ──► research_critique
//!                                  │                               │
//!                                  └───────────────────────────────┘
//! ```
//!
//! The only conditional edge follows `generate`: once the revision number
//! exceeds the thread's revision limit, the run terminates; otherwise it
//! loops through critique and research back into another generate. Everything
//! else is unconditional, so the whole topology reduces to one pure function
//! over (stage, state).

use crate::state::{Stage, WorkflowState};

/// The pipeline's entry stage, executed first on every new thread.
pub const ENTRY_STAGE: Stage = Stage::Planner;

/// Compute which stage follows `just_ran`, or `None` when the run is done.
///
/// This is the scheduler's single source of truth for ordering; it is also
/// used to recompute `next_stage` after a manual field edit so execution
/// proceeds coherently from the edited checkpoint.
pub fn next_stage_for(just_ran: Stage, state: &WorkflowState) -> Option<Stage> {
    match just_ran {
        Stage::Planner => Some(Stage::ResearchPlan),
        Stage::ResearchPlan => Some(Stage::Generate),
        Stage::Generate => {
            if state.revision_number.unwrap_or(0) > state.max_revisions {
                None
            } else {
                Some(Stage::Reflect)
            }
        }
        Stage::Reflect => Some(Stage::ResearchCritique),
        Stage::ResearchCritique => Some(Stage::Generate),
    }
}
