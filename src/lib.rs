//! Outreach Research Agent
//!
//! An autonomous agent that, given a goal like "find PM jobs at Google and
//! draft outreach emails":
//! - discovers job postings from company career pages
//! - locates hiring contacts with verified emails
//! - gathers personalization context (news, social profile)
//! - drafts outreach messages
//!
//! CONTROL LOOP (ReAct):
//! DECIDE (planner) -> INVOKE (tool) -> MERGE (state) -> DECIDE ... -> DONE
//!
//! Tool failures never abort a run; the loop always returns whatever it
//! found. Multi-target tools fan out through a bounded-concurrency batch
//! orchestrator.

pub mod agent;
pub mod api;
pub mod batch;
pub mod browser;
pub mod classifier;
pub mod config;
pub mod error;
pub mod execution;
pub mod gemini;
pub mod models;
pub mod planner;
pub mod state;
pub mod tools;

pub use error::{AgentError, Result, ToolFailure};

// Re-export common types
pub use classifier::{ResultClassifier, ToolPayload};
pub use config::AgentConfig;
pub use models::*;
pub use state::RunState;
