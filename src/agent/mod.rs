//! The control loop
//!
//! A ReAct-style state machine: Deciding (ask the planner) -> Invoking (run
//! the requested tools) -> Merging (fold results into run state) -> back to
//! Deciding, until the planner returns no tool call (Done) or the step cap
//! fires. Only a dead planner fails the run; tool failures merge as "no
//! contribution", leaving the planner to adapt or give up.

use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::classifier::ResultClassifier;
use crate::config::AgentConfig;
use crate::execution::ToolExecutor;
use crate::models::{RunReport, RunStatus, TraceEntry};
use crate::planner::{GeminiPlanner, Planner};
use crate::state::RunState;
use crate::tools::{create_default_registry, ToolRegistry};
use crate::Result;

pub struct Agent {
    planner: Box<dyn Planner>,
    executor: ToolExecutor,
    max_steps: u32,
}

impl Agent {
    pub fn new(planner: Box<dyn Planner>, executor: ToolExecutor, max_steps: u32) -> Self {
        Self {
            planner,
            executor,
            max_steps,
        }
    }

    /// Wire the default stack: Gemini planner plus the four outreach tools.
    /// Returns the registry too so callers (the HTTP server) can expose the
    /// tools directly.
    pub fn from_config(config: &AgentConfig) -> Result<(Self, Arc<ToolRegistry>)> {
        let registry = Arc::new(create_default_registry(config));
        let planner = GeminiPlanner::new(config.gemini_api_key.clone().unwrap_or_default())?;
        let agent = Self::new(
            Box::new(planner),
            ToolExecutor::new(Arc::clone(&registry)),
            config.max_steps,
        );
        Ok((agent, registry))
    }

    /// Run the loop for one goal.
    pub async fn run(&self, goal: &str) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        info!(run_id = %run_id, goal, "agent run starting");

        let catalog = self.executor.catalog();
        let mut state = RunState::new();
        let mut trace: Vec<TraceEntry> = Vec::new();
        let mut steps: u32 = 0;

        loop {
            // === DECIDING ===
            if steps >= self.max_steps {
                warn!(run_id = %run_id, steps, "step limit reached, stopping run");
                trace.push(TraceEntry::observation(format!(
                    "step limit of {} reached",
                    self.max_steps
                )));
                return Ok(RunReport {
                    run_id,
                    goal: goal.to_string(),
                    status: RunStatus::StepLimitExceeded,
                    steps_taken: steps,
                    state,
                    trace,
                });
            }
            steps += 1;

            let summary = state.summary();
            debug!(run_id = %run_id, step = steps, %summary, "asking planner");

            // A planner error is the one fatal path; surfaced verbatim.
            let decision = self
                .planner
                .decide(goal, &catalog, &summary, &trace)
                .await?;

            if let Some(thought) = &decision.thought {
                trace.push(TraceEntry::thought(thought.clone()));
            }

            // === DONE ===
            if decision.tool_calls.is_empty() {
                info!(run_id = %run_id, steps, "planner signalled completion");
                return Ok(RunReport {
                    run_id,
                    goal: goal.to_string(),
                    status: RunStatus::Completed,
                    steps_taken: steps,
                    state,
                    trace,
                });
            }

            // === INVOKING / MERGING ===
            for call in &decision.tool_calls {
                trace.push(TraceEntry::action(format!(
                    "{} {}",
                    call.tool_name, call.arguments
                )));

                let invocation = self.executor.run_call(call).await;
                match invocation.outcome {
                    Ok(payload) => {
                        state.merge(ResultClassifier::classify(&payload));
                        trace.push(TraceEntry::observation(format!(
                            "{} succeeded in {} ms; state: {}",
                            invocation.tool_name,
                            invocation.elapsed_ms,
                            state.summary()
                        )));
                    }
                    Err(failure) => {
                        // No contribution; the planner sees unchanged state
                        // and adapts.
                        trace.push(TraceEntry::observation(format!(
                            "{} failed: {}",
                            invocation.tool_name, failure
                        )));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AgentError, ToolFailure, ToolResult};
    use crate::models::{Decision, ToolCall, ToolSpec, TraceKind};
    use crate::planner::MockPlanner;
    use crate::tools::Tool;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    struct StubJobsTool {
        seen_args: Mutex<Vec<Value>>,
    }

    impl StubJobsTool {
        fn new() -> Self {
            Self {
                seen_args: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Tool for StubJobsTool {
        fn name(&self) -> &'static str {
            "discover_jobs"
        }
        fn description(&self) -> &'static str {
            "stub job discovery"
        }
        fn schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
        async fn invoke(&self, args: &Value) -> ToolResult {
            self.seen_args.lock().unwrap().push(args.clone());
            Ok(json!([
                {"id": "j1", "company": "Acme", "role": "Engineer", "url": "https://acme.com/jobs/1"}
            ]))
        }
    }

    struct NoopTool;

    #[async_trait]
    impl Tool for NoopTool {
        fn name(&self) -> &'static str {
            "noop"
        }
        fn description(&self) -> &'static str {
            "does nothing"
        }
        fn schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
        async fn invoke(&self, _args: &Value) -> ToolResult {
            Ok(json!({"ok": true}))
        }
    }

    struct FlakyTool;

    #[async_trait]
    impl Tool for FlakyTool {
        fn name(&self) -> &'static str {
            "flaky"
        }
        fn description(&self) -> &'static str {
            "always fails"
        }
        fn schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
        async fn invoke(&self, _args: &Value) -> ToolResult {
            Err(ToolFailure::Transient("provider down".to_string()))
        }
    }

    /// A planner that never terminates: one no-op call, forever.
    struct LoopingPlanner;

    #[async_trait]
    impl Planner for LoopingPlanner {
        async fn decide(
            &self,
            _goal: &str,
            _catalog: &[ToolSpec],
            _state_summary: &str,
            _trace: &[TraceEntry],
        ) -> Result<Decision> {
            Ok(Decision {
                thought: None,
                tool_calls: vec![ToolCall {
                    tool_name: "noop".to_string(),
                    arguments: Value::Null,
                }],
            })
        }
    }

    struct DeadPlanner;

    #[async_trait]
    impl Planner for DeadPlanner {
        async fn decide(
            &self,
            _goal: &str,
            _catalog: &[ToolSpec],
            _state_summary: &str,
            _trace: &[TraceEntry],
        ) -> Result<Decision> {
            Err(AgentError::PlannerUnreachable("connection refused".to_string()))
        }
    }

    fn executor_with(tool: Arc<dyn Tool>) -> ToolExecutor {
        let mut registry = ToolRegistry::new();
        registry.register(tool);
        ToolExecutor::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_run_terminates_done_with_jobs_populated() {
        let stub = Arc::new(StubJobsTool::new());
        let planner = MockPlanner::new(vec![Decision {
            thought: Some("search Acme first".to_string()),
            tool_calls: vec![ToolCall {
                tool_name: "discover_jobs".to_string(),
                arguments: json!({ "companies": ["Acme"], "roles": [] }),
            }],
        }]);

        let agent = Agent::new(
            Box::new(planner),
            executor_with(stub.clone()),
            20,
        );
        let report = agent.run("find jobs at Acme").await.unwrap();

        assert_eq!(report.status, RunStatus::Completed);
        assert_eq!(report.state.jobs.len(), 1);
        assert_eq!(report.state.jobs[0].id, "j1");
        assert!(report.state.contacts.is_empty());
        assert!(report.state.drafts.is_empty());

        // The tool saw the planner's arguments verbatim.
        let seen = stub.seen_args.lock().unwrap();
        assert_eq!(seen[0]["companies"], json!(["Acme"]));

        // One decision with a call, one closing decision.
        assert_eq!(report.steps_taken, 2);
        assert!(report.trace.iter().any(|e| e.kind == TraceKind::Action));
        assert!(report.trace.iter().any(|e| e.kind == TraceKind::Observation));
    }

    #[tokio::test]
    async fn test_step_limit_stops_a_looping_planner() {
        let agent = Agent::new(Box::new(LoopingPlanner), executor_with(Arc::new(NoopTool)), 20);
        let report = agent.run("never ends").await.unwrap();

        assert_eq!(report.status, RunStatus::StepLimitExceeded);
        assert_eq!(report.steps_taken, 20);

        // Exactly one action per allowed step, none past the cap.
        let actions = report
            .trace
            .iter()
            .filter(|e| e.kind == TraceKind::Action)
            .count();
        assert_eq!(actions, 20);
    }

    #[tokio::test]
    async fn test_tool_failure_is_not_fatal() {
        let planner = MockPlanner::new(vec![Decision {
            thought: None,
            tool_calls: vec![ToolCall {
                tool_name: "flaky".to_string(),
                arguments: Value::Null,
            }],
        }]);

        let agent = Agent::new(Box::new(planner), executor_with(Arc::new(FlakyTool)), 20);
        let report = agent.run("try something flaky").await.unwrap();

        assert_eq!(report.status, RunStatus::Completed);
        assert!(report.state.is_empty());
        assert!(report
            .trace
            .iter()
            .any(|e| e.kind == TraceKind::Observation && e.content.contains("failed")));
    }

    #[tokio::test]
    async fn test_dead_planner_fails_the_run() {
        let agent = Agent::new(Box::new(DeadPlanner), executor_with(Arc::new(NoopTool)), 20);
        let result = agent.run("anything").await;
        assert!(matches!(result, Err(AgentError::PlannerUnreachable(_))));
    }

    #[tokio::test]
    async fn test_unknown_tool_request_is_absorbed() {
        let planner = MockPlanner::new(vec![Decision {
            thought: None,
            tool_calls: vec![ToolCall {
                tool_name: "imaginary".to_string(),
                arguments: Value::Null,
            }],
        }]);

        let agent = Agent::new(Box::new(planner), executor_with(Arc::new(NoopTool)), 20);
        let report = agent.run("use a tool that does not exist").await.unwrap();
        assert_eq!(report.status, RunStatus::Completed);
        assert!(report.state.is_empty());
    }
}
