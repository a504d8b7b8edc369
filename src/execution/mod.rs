//! Tool executor
//!
//! Runs the tool calls a planner decision asked for. Every expected failure
//! (missing credentials, provider faults, empty results, unknown tool names)
//! is absorbed into the invocation record; nothing a tool does can abort the
//! run. Records are fully materialized before the loop merges them.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::ToolFailure;
use crate::models::{ToolCall, ToolInvocation, ToolSpec};
use crate::tools::ToolRegistry;

pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn catalog(&self) -> Vec<ToolSpec> {
        self.registry.catalog()
    }

    /// Invoke one requested call and package the outcome, success or not.
    pub async fn run_call(&self, call: &ToolCall) -> ToolInvocation {
        let start = Instant::now();

        let outcome = match self.registry.get(&call.tool_name) {
            Some(tool) => tool.invoke(&call.arguments).await,
            None => Err(ToolFailure::Unavailable(format!(
                "tool '{}' is not registered",
                call.tool_name
            ))),
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &outcome {
            Ok(_) => debug!(tool = %call.tool_name, elapsed_ms, "tool call succeeded"),
            Err(failure) => {
                warn!(tool = %call.tool_name, elapsed_ms, error = %failure, "tool call failed")
            }
        }

        ToolInvocation {
            tool_name: call.tool_name.clone(),
            arguments: call.arguments.clone(),
            outcome,
            elapsed_ms,
        }
    }
}
