//! Core data models for the outreach agent

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

use crate::error::ToolResult;

//
// ================= Enums =================
//

/// Seniority buckets for discovered contacts.
///
/// Provider APIs use a wider vocabulary (`director`, `vp`, `c_suite`, ...);
/// [`Seniority::parse`] folds those into the manager bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Seniority {
    Executive,
    Manager,
    Senior,
    Junior,
    Entry,
    Unclassified,
}

impl Seniority {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("executive") => Seniority::Executive,
            Some("manager") | Some("director") | Some("vp") | Some("c_suite") | Some("owner")
            | Some("partner") => Seniority::Manager,
            Some("senior") => Seniority::Senior,
            Some("junior") => Seniority::Junior,
            Some("entry") => Seniority::Entry,
            _ => Seniority::Unclassified,
        }
    }

    /// Manager-class contact (decision maker).
    pub fn is_manager(&self) -> bool {
        matches!(self, Seniority::Executive | Seniority::Manager)
    }

    /// Individual contributor.
    pub fn is_ic(&self) -> bool {
        matches!(self, Seniority::Senior | Seniority::Junior | Seniority::Entry)
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Seniority::Executive => "executive",
            Seniority::Manager => "manager",
            Seniority::Senior => "senior",
            Seniority::Junior => "junior",
            Seniority::Entry => "entry",
            Seniority::Unclassified => "unclassified",
        };
        write!(f, "{}", s)
    }
}

//
// ================= Job =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub company: String,
    pub role: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub employment_type: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub posted_date: String,
    #[serde(default)]
    pub url: String,
}

/// Derive a stable job id from the posting URL (falling back to the title),
/// so that rediscovering the same posting yields the same id and dedup by id
/// is meaningful.
pub fn stable_job_id(url: &str, title: &str) -> String {
    let seed = if url.trim().is_empty() { title } else { url };
    let digest = Sha256::digest(seed.as_bytes());
    hex::encode(&digest[..6])
}

//
// ================= Contact =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_seniority")]
    pub seniority: Seniority,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    /// Provider confidence score, 0-100 when present.
    #[serde(default)]
    pub confidence: Option<u8>,
    pub company: String,
}

fn default_seniority() -> Seniority {
    Seniority::Unclassified
}

//
// ================= Enrichment =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SocialProfile {
    pub handle: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub recent_posts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentRecord {
    pub company_name: String,
    #[serde(default, alias = "news")]
    pub news_items: Vec<NewsItem>,
    #[serde(default)]
    pub social_profile: Option<SocialProfile>,
}

//
// ================= Draft =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub recipient_email: String,
    #[serde(default)]
    pub recipient_name: String,
    #[serde(default)]
    pub tactics_used: Vec<String>,
}

//
// ================= Planner I/O =================
//

/// One tool call requested by the planner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    pub tool_name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// A single planner turn: an optional thought plus zero or more tool calls.
/// An empty `tool_calls` list signals the goal is satisfied.
#[derive(Debug, Clone, Default)]
pub struct Decision {
    pub thought: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

/// Planner-facing description of one registered capability.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub schema: Value,
}

//
// ================= Execution =================
//

/// Record of one tool call, alive for a single loop step before it is folded
/// into run state.
#[derive(Debug)]
pub struct ToolInvocation {
    pub tool_name: String,
    pub arguments: Value,
    pub outcome: ToolResult,
    pub elapsed_ms: u64,
}

//
// ================= Reasoning Trace =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Thought,
    Action,
    Observation,
}

/// Append-only log entry; never mutated after its step completes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceEntry {
    pub kind: TraceKind,
    pub content: String,
}

impl TraceEntry {
    pub fn thought(content: impl Into<String>) -> Self {
        Self {
            kind: TraceKind::Thought,
            content: content.into(),
        }
    }

    pub fn action(content: impl Into<String>) -> Self {
        Self {
            kind: TraceKind::Action,
            content: content.into(),
        }
    }

    pub fn observation(content: impl Into<String>) -> Self {
        Self {
            kind: TraceKind::Observation,
            content: content.into(),
        }
    }
}

//
// ================= Final Result =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The planner signalled completion.
    Completed,
    /// The step cap fired before the planner finished.
    StepLimitExceeded,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub run_id: Uuid,
    pub goal: String,
    pub status: RunStatus,
    pub steps_taken: u32,
    pub state: crate::state::RunState,
    pub trace: Vec<TraceEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seniority_parse_folds_provider_values() {
        assert_eq!(Seniority::parse(Some("executive")), Seniority::Executive);
        assert_eq!(Seniority::parse(Some("VP")), Seniority::Manager);
        assert_eq!(Seniority::parse(Some("c_suite")), Seniority::Manager);
        assert_eq!(Seniority::parse(Some("senior")), Seniority::Senior);
        assert_eq!(Seniority::parse(Some("intern")), Seniority::Unclassified);
        assert_eq!(Seniority::parse(None), Seniority::Unclassified);
    }

    #[test]
    fn test_stable_job_id_prefers_url() {
        let a = stable_job_id("https://jobs.lever.co/acme/123", "Engineer");
        let b = stable_job_id("https://jobs.lever.co/acme/123", "Senior Engineer");
        let c = stable_job_id("", "Engineer");
        assert_eq!(a, b);
        assert_ne!(a, c);
        // Same inputs, same id, on every call.
        assert_eq!(c, stable_job_id("", "Engineer"));
    }

    #[test]
    fn test_job_serde_uses_camel_case() {
        let job = Job {
            id: "abc".into(),
            company: "Acme".into(),
            role: "Engineer".into(),
            location: "Remote".into(),
            employment_type: "Full-time".into(),
            summary: "Position at Acme".into(),
            posted_date: "Recently".into(),
            url: "https://acme.com/jobs/1".into(),
        };
        let value = serde_json::to_value(&job).unwrap();
        assert!(value.get("employmentType").is_some());
        assert!(value.get("postedDate").is_some());
    }
}
