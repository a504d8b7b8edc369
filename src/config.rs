//! Agent configuration
//!
//! All credentials and tuning knobs live in one struct, built once at startup
//! and handed to every component at construction time. A missing credential
//! renders the owning capability `Unavailable`; it is never an error here.

use std::env;

/// Default safety bound on planner loop steps.
pub const DEFAULT_MAX_STEPS: u32 = 20;
/// Concurrent external sessions per batch.
pub const DEFAULT_BATCH_SIZE: usize = 3;
/// Fan-out caps applied before dispatch, bounding external cost.
pub const DEFAULT_MAX_COMPANIES: usize = 5;
pub const DEFAULT_MAX_ROLES: usize = 3;

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub gemini_api_key: Option<String>,
    pub hunter_api_key: Option<String>,
    pub browserbase_api_key: Option<String>,
    pub browserbase_project_id: Option<String>,

    pub max_steps: u32,
    pub batch_size: usize,
    pub max_companies: usize,
    pub max_roles: usize,
}

impl AgentConfig {
    /// Read configuration from the environment. Callers load `.env` first
    /// (the binaries do) so this stays a plain env lookup.
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: env_opt("GEMINI_API_KEY"),
            hunter_api_key: env_opt("HUNTER_API_KEY"),
            browserbase_api_key: env_opt("BROWSERBASE_API_KEY"),
            browserbase_project_id: env_opt("BROWSERBASE_PROJECT_ID"),
            max_steps: env_opt("AGENT_MAX_STEPS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_STEPS),
            batch_size: DEFAULT_BATCH_SIZE,
            max_companies: DEFAULT_MAX_COMPANIES,
            max_roles: DEFAULT_MAX_ROLES,
        }
    }
}

impl Default for AgentConfig {
    /// A credential-free configuration: every remote capability reports
    /// `Unavailable`. Useful for tests and offline runs.
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            hunter_api_key: None,
            browserbase_api_key: None,
            browserbase_project_id: None,
            max_steps: DEFAULT_MAX_STEPS,
            batch_size: DEFAULT_BATCH_SIZE,
            max_companies: DEFAULT_MAX_COMPANIES,
            max_roles: DEFAULT_MAX_ROLES,
        }
    }
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
