//! Property tests for the engine's counting and termination laws
//!
//! Each property spins up a real engine with scripted capabilities and
//! drives it step by step on a fresh tokio runtime per case.

mod common;

use common::{ScriptedModel, StaticSearch};
use redraft_core::{Stage, StepReport, WorkflowEngine};
use proptest::prelude::*;

/// Step the thread to termination, collecting every report.
async fn run_to_end(engine: &WorkflowEngine, task: &str, max_revisions: u32) -> Vec<StepReport> {
    let thread = engine.start_thread(task, max_revisions).await.unwrap();
    let mut reports = Vec::new();
    loop {
        let report = engine.step(thread).await.unwrap();
        let done = report.next_stage.is_none();
        reports.push(report);
        if done {
            break;
        }
    }
    reports
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    // A run with limit r executes generate exactly r + 1 times, never fewer,
    // never more, and only the last generate is terminal.
    #[test]
    fn termination_law(max_revisions in 1u32..=4) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let engine = WorkflowEngine::new(ScriptedModel::new(), StaticSearch::new());
            let reports = run_to_end(&engine, "any topic", max_revisions).await;

            let generates: Vec<&StepReport> = reports
                .iter()
                .filter(|r| r.last_stage == Some(Stage::Generate))
                .collect();
            assert_eq!(generates.len(), (max_revisions + 1) as usize);
            assert_eq!(reports.last().unwrap().last_stage, Some(Stage::Generate));
            assert_eq!(reports.last().unwrap().next_stage, None);
            // Every stage runs exactly once per loop: 3 steps to the first
            // draft, then 3 per revision cycle.
            assert_eq!(reports.len(), 3 * (max_revisions as usize + 1));
        });
    }

    // step_count advances by exactly 1 per scheduler-driven step and the
    // revision number never decreases.
    #[test]
    fn counters_are_monotone(max_revisions in 1u32..=4) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let engine = WorkflowEngine::new(ScriptedModel::new(), StaticSearch::new());
            let reports = run_to_end(&engine, "any topic", max_revisions).await;

            let mut expected_step = 1;
            let mut last_revision = 0;
            for report in &reports {
                assert_eq!(report.step_count, expected_step);
                expected_step += 1;

                let revision = report.revision_number.unwrap();
                assert!(revision >= last_revision, "revision number decreased");
                last_revision = revision;
            }
        });
    }

    // Research content only ever grows as a thread progresses.
    #[test]
    fn content_growth_is_monotone(max_revisions in 1u32..=3) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let engine = WorkflowEngine::new(ScriptedModel::new(), StaticSearch::new());
            let thread = engine.start_thread("any topic", max_revisions).await.unwrap();

            let mut previous = 0;
            loop {
                let report = engine.step(thread).await.unwrap();
                let content = engine.current_content(thread).await.unwrap();
                assert!(content.len() >= previous, "content shrank");
                previous = content.len();
                if report.next_stage.is_none() {
                    break;
                }
            }
            // One research_plan pass plus one research_critique pass per
            // revision cycle, each appending 2 queries x 2 hits.
            assert_eq!(previous, 4 * (max_revisions as usize + 1));
        });
    }
}
