//! Outreach draft tool
//!
//! Generates one personalized outreach email per invocation via the LLM.
//! Drafting is the last step of a run: it needs a contact and benefits from
//! enrichment context gathered earlier.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::AgentConfig;
use crate::error::{ToolFailure, ToolResult};
use crate::gemini::{strip_code_fences, GeminiClient};
use crate::models::Draft;
use crate::tools::{string_arg, Tool};

const DRAFT_SYSTEM_PROMPT: &str = "You draft short, genuine outreach emails for job seekers. \
     Reply with JSON only: {\"subject\": ..., \"body\": ..., \"tactics\": [...]}, where \
     tactics names the personalization tactics used (e.g. \"mentioned_role\", \
     \"referenced_news\").";

pub struct DraftEmailTool {
    llm: Option<GeminiClient>,
}

impl DraftEmailTool {
    pub fn from_config(config: &AgentConfig) -> Self {
        let llm = config
            .gemini_api_key
            .clone()
            .and_then(|key| GeminiClient::new(key).ok());
        Self { llm }
    }
}

#[async_trait::async_trait]
impl Tool for DraftEmailTool {
    fn name(&self) -> &'static str {
        "draft_email"
    }

    fn description(&self) -> &'static str {
        "Draft a personalized outreach email to one contact about one job. \
         Use this once per contact, after contacts (and ideally enrichment) \
         are available."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "contactName":  { "type": "string" },
                "contactEmail": { "type": "string" },
                "contactTitle": { "type": "string" },
                "company":      { "type": "string" },
                "jobRole":      { "type": "string" },
                "context": {
                    "type": "string",
                    "description": "Personalization material: recent news, posts",
                    "default": ""
                }
            },
            "required": ["contactName", "contactEmail", "company", "jobRole"]
        })
    }

    fn consumes_credits(&self) -> bool {
        true
    }

    async fn invoke(&self, args: &Value) -> ToolResult {
        let llm = self.llm.as_ref().ok_or_else(|| {
            ToolFailure::Unavailable("GEMINI_API_KEY not configured".to_string())
        })?;

        let contact_name = require(args, "contactName")?;
        let contact_email = require(args, "contactEmail")?;
        let company = require(args, "company")?;
        let job_role = require(args, "jobRole")?;
        let contact_title = string_arg(args, "contactTitle").unwrap_or_default();
        let context = string_arg(args, "context").unwrap_or_default();

        let prompt = build_prompt(
            &contact_name,
            &contact_title,
            &company,
            &job_role,
            &context,
        );

        let response = llm
            .generate(DRAFT_SYSTEM_PROMPT, &prompt)
            .await
            .map_err(|e| ToolFailure::Transient(e.to_string()))?;

        let (subject, body, tactics_used) = parse_draft_response(&response)?;

        debug!(recipient = %contact_email, "draft generated");

        let draft = Draft {
            subject,
            body,
            recipient_email: contact_email,
            recipient_name: contact_name,
            tactics_used,
        };
        serde_json::to_value(draft).map_err(|e| ToolFailure::Transient(e.to_string()))
    }
}

fn require(args: &Value, key: &str) -> Result<String, ToolFailure> {
    string_arg(args, key)
        .ok_or_else(|| ToolFailure::Transient(format!("missing required argument '{}'", key)))
}

fn build_prompt(
    contact_name: &str,
    contact_title: &str,
    company: &str,
    job_role: &str,
    context: &str,
) -> String {
    let context = if context.is_empty() {
        "No specific context available - keep it genuine and brief."
    } else {
        context
    };

    format!(
        "Draft a short, personalized outreach email.\n\n\
         RECIPIENT:\n- Name: {}\n- Title: {}\n- Company: {}\n\n\
         JOB I'M INTERESTED IN: {}\n\n\
         PERSONALIZATION CONTEXT:\n{}\n\n\
         RULES:\n\
         1. Keep it under 100 words\n\
         2. Be genuine, not salesy\n\
         3. Ask a specific question to encourage a reply\n\
         4. Reference something specific when context is available",
        contact_name, contact_title, company, job_role, context
    )
}

#[derive(Debug, Deserialize)]
struct RawDraft {
    subject: String,
    body: String,
    #[serde(default)]
    tactics: Vec<String>,
}

fn parse_draft_response(response: &str) -> Result<(String, String, Vec<String>), ToolFailure> {
    let cleaned = strip_code_fences(response);
    let raw: RawDraft = serde_json::from_str(cleaned)
        .map_err(|e| ToolFailure::Transient(format!("draft response was not JSON: {}", e)))?;
    Ok((raw.subject, raw.body, raw.tactics))
}
