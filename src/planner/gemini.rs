//! Gemini-backed planner
//!
//! Renders the capability catalog and run-state summary into a prompt and
//! parses the model's JSON reply into a Decision. Any transport or parse
//! problem here means the loop has lost its oracle, so everything maps to
//! `PlannerUnreachable`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::AgentError;
use crate::gemini::{strip_code_fences, GeminiClient};
use crate::models::{Decision, ToolCall, ToolSpec, TraceEntry};
use crate::planner::Planner;
use crate::Result;

/// Trace entries shown to the model per decision; older ones are summarized
/// by the state counts anyway.
const TRACE_TAIL: usize = 8;

const PLANNER_SYSTEM_PROMPT: &str = "You are an outreach research agent. You help users find jobs, \
     locate hiring contacts, gather personalization context, and draft \
     outreach emails.\n\n\
     WORKFLOW:\n\
     1. discover_jobs first when the goal involves finding jobs\n\
     2. find_contacts to get people to reach out to\n\
     3. enrich_company for personalization material (optional)\n\
     4. draft_email once per contact, only when a job AND a contact exist\n\n\
     Extract company names and roles from the goal. Be efficient: never call \
     a tool whose result you already have. When the goal is satisfied (or \
     nothing more can be done), return an empty toolCalls list.";

pub struct GeminiPlanner {
    client: GeminiClient,
}

impl GeminiPlanner {
    pub fn new(api_key: String) -> Result<Self> {
        Ok(Self {
            client: GeminiClient::new(api_key)?,
        })
    }

    fn build_prompt(
        goal: &str,
        catalog: &[ToolSpec],
        state_summary: &str,
        trace: &[TraceEntry],
    ) -> String {
        let tools = catalog
            .iter()
            .map(|spec| {
                format!(
                    "- {}: {}\n  arguments schema: {}",
                    spec.name, spec.description, spec.schema
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let recent = trace
            .iter()
            .rev()
            .take(TRACE_TAIL)
            .rev()
            .map(|entry| format!("[{:?}] {}", entry.kind, entry.content))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "GOAL:\n{}\n\n\
             CURRENT STATE:\n{}\n\n\
             RECENT STEPS:\n{}\n\n\
             AVAILABLE TOOLS:\n{}\n\n\
             Decide the next action. Return ONLY valid JSON, no explanation:\n\
             {{\n  \"thought\": \"why this action\",\n  \"toolCalls\": [\n    {{ \"toolName\": \"...\", \"arguments\": {{ ... }} }}\n  ]\n}}\n\
             Return \"toolCalls\": [] when the goal is satisfied.",
            goal,
            state_summary,
            if recent.is_empty() { "(none yet)" } else { recent.as_str() },
            tools,
        )
    }
}

#[async_trait]
impl Planner for GeminiPlanner {
    async fn decide(
        &self,
        goal: &str,
        catalog: &[ToolSpec],
        state_summary: &str,
        trace: &[TraceEntry],
    ) -> Result<Decision> {
        let prompt = Self::build_prompt(goal, catalog, state_summary, trace);

        let response = self
            .client
            .generate(PLANNER_SYSTEM_PROMPT, &prompt)
            .await
            .map_err(|e| AgentError::PlannerUnreachable(e.to_string()))?;

        let decision = parse_decision(&response)?;
        debug!(
            tool_calls = decision.tool_calls.len(),
            "planner decision parsed"
        );
        Ok(decision)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDecision {
    #[serde(default)]
    thought: Option<String>,
    #[serde(default)]
    tool_calls: Vec<RawToolCall>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawToolCall {
    tool_name: String,
    #[serde(default)]
    arguments: Value,
}

/// Parse the planner reply. An unparseable oracle is an unreachable one.
fn parse_decision(response: &str) -> Result<Decision> {
    let cleaned = strip_code_fences(response);

    let raw: RawDecision = serde_json::from_str(cleaned).map_err(|e| {
        AgentError::PlannerUnreachable(format!(
            "planner reply was not valid JSON: {} | raw={}",
            e, response
        ))
    })?;

    Ok(Decision {
        thought: raw.thought.filter(|t| !t.trim().is_empty()),
        tool_calls: raw
            .tool_calls
            .into_iter()
            .map(|call| ToolCall {
                tool_name: call.tool_name,
                arguments: call.arguments,
            })
            .collect(),
    })
}
