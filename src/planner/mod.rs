//! Planner trait and implementations
//!
//! The planner is the decision oracle of the control loop: shown the goal,
//! the capability catalog, and a summary of accumulated state, it returns the
//! next tool calls - or none, signalling completion. A planner that cannot
//! answer is fatal to the run; everything a tool does wrong is not.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::models::{Decision, ToolSpec, TraceEntry};
use crate::Result;

pub mod gemini;
pub use gemini::GeminiPlanner;

/// Trait for next-step decisions.
#[async_trait]
pub trait Planner: Send + Sync {
    async fn decide(
        &self,
        goal: &str,
        catalog: &[ToolSpec],
        state_summary: &str,
        trace: &[TraceEntry],
    ) -> Result<Decision>;
}

/// Scripted planner for tests and offline runs: pops one prepared decision
/// per call and signals completion once the script is exhausted.
pub struct MockPlanner {
    script: Mutex<VecDeque<Decision>>,
}

impl MockPlanner {
    pub fn new(decisions: Vec<Decision>) -> Self {
        Self {
            script: Mutex::new(decisions.into()),
        }
    }

    /// A planner that immediately declares the goal satisfied.
    pub fn finished() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl Planner for MockPlanner {
    async fn decide(
        &self,
        _goal: &str,
        _catalog: &[ToolSpec],
        _state_summary: &str,
        _trace: &[TraceEntry],
    ) -> Result<Decision> {
        let mut script = self.script.lock().expect("planner script poisoned");
        Ok(script.pop_front().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ToolCall;

    #[tokio::test]
    async fn test_mock_planner_replays_script_then_finishes() {
        let planner = MockPlanner::new(vec![Decision {
            thought: Some("search first".to_string()),
            tool_calls: vec![ToolCall {
                tool_name: "discover_jobs".to_string(),
                arguments: serde_json::json!({ "companies": ["Acme"] }),
            }],
        }]);

        let first = planner.decide("goal", &[], "", &[]).await.unwrap();
        assert_eq!(first.tool_calls.len(), 1);

        let second = planner.decide("goal", &[], "", &[]).await.unwrap();
        assert!(second.tool_calls.is_empty());
    }
}
