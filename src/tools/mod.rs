//! Tool trait and registry
//!
//! Every external action the agent can take conforms to the same contract:
//! a name, a declared argument schema, side-effect metadata, and a fallible
//! async invocation. The loop only ever sees this contract, so new tools can
//! be registered without touching the core.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::AgentConfig;
use crate::error::ToolResult;
use crate::models::ToolSpec;

pub mod contacts;
pub mod draft;
pub mod enrich;
pub mod jobs;

pub use contacts::FindContactsTool;
pub use draft::DraftEmailTool;
pub use enrich::EnrichCompanyTool;
pub use jobs::DiscoverJobsTool;

/// Trait for a single capability.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON-schema-shaped declaration of the tool's arguments.
    fn schema(&self) -> Value;

    /// Whether an invocation spends provider credits. Declared metadata so
    /// the planner can weigh cost; budgeting itself lives elsewhere.
    fn consumes_credits(&self) -> bool {
        false
    }

    async fn invoke(&self, args: &Value) -> ToolResult;
}

/// Tool registry for looking up and invoking tools by name.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn list(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// The planner-facing catalog, sorted by name for stable prompts.
    pub fn catalog(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self
            .tools
            .values()
            .map(|tool| ToolSpec {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                schema: tool.schema(),
            })
            .collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create the default registry with the four outreach capabilities, wired
/// from one configuration struct.
pub fn create_default_registry(config: &AgentConfig) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(Arc::new(DiscoverJobsTool::from_config(config)));
    registry.register(Arc::new(FindContactsTool::from_config(config)));
    registry.register(Arc::new(EnrichCompanyTool::from_config(config)));
    registry.register(Arc::new(DraftEmailTool::from_config(config)));

    registry
}

//
// ================= Argument helpers =================
//

pub(crate) fn string_list(args: &Value, key: &str) -> Vec<String> {
    args.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn string_arg(args: &Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub(crate) fn usize_arg(args: &Value, key: &str, default: usize) -> usize {
    args.get(key)
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .unwrap_or(default)
}
