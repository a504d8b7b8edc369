//! Cloud browser automation client
//!
//! Thin pass-through to a hosted browser session service used by the job
//! discovery and enrichment tools. Page understanding happens server-side
//! behind `extract`; this module only moves JSON.
//!
//! Sessions are a billed, leak-prone resource: all callers go through
//! [`BrowserClient::with_session`], which ends the session on every exit
//! path, success or failure.

use reqwest::Client;
use serde_json::{json, Value};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::AgentConfig;
use crate::error::ToolFailure;

const DEFAULT_BASE_URL: &str = "https://api.browserbase.com/v1";
/// Per-request ceiling; a hung page never blocks its batch siblings longer.
const SESSION_REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Clone)]
pub struct BrowserClient {
    client: Client,
    base_url: String,
    api_key: String,
    project_id: String,
}

impl BrowserClient {
    /// Build from configuration; `None` when credentials are absent, which
    /// the owning tool reports as `Unavailable`.
    pub fn from_config(config: &AgentConfig) -> Option<Self> {
        let api_key = config.browserbase_api_key.clone()?;
        let project_id = config.browserbase_project_id.clone()?;

        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(SESSION_REQUEST_TIMEOUT)
            .build()
            .ok()?;

        Some(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            project_id,
        })
    }

    async fn start_session(&self) -> Result<BrowserSession, ToolFailure> {
        let body = json!({ "projectId": self.project_id });
        let response = self
            .client
            .post(format!("{}/sessions", self.base_url))
            .header("X-API-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ToolFailure::Transient(format!("session start failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ToolFailure::Transient(format!(
                "session start returned {}",
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ToolFailure::Transient(format!("session start response: {}", e)))?;

        let session_id = payload
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolFailure::Transient("session start returned no id".to_string()))?
            .to_string();

        debug!(session_id = %session_id, "browser session started");

        Ok(BrowserSession {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            session_id,
        })
    }

    /// Run `work` inside a fresh session, tearing the session down on every
    /// exit path.
    pub async fn with_session<T, F, Fut>(&self, work: F) -> Result<T, ToolFailure>
    where
        F: FnOnce(BrowserSession) -> Fut,
        Fut: Future<Output = Result<T, ToolFailure>>,
    {
        let session = self.start_session().await?;
        let result = work(session.clone()).await;
        session.end().await;
        result
    }
}

/// Handle to one live remote browser session.
#[derive(Clone)]
pub struct BrowserSession {
    client: Client,
    base_url: String,
    api_key: String,
    session_id: String,
}

impl BrowserSession {
    async fn post(&self, path: &str, body: &Value) -> Result<Value, ToolFailure> {
        let url = format!("{}/sessions/{}/{}", self.base_url, self.session_id, path);
        let response = self
            .client
            .post(url)
            .header("X-API-Key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ToolFailure::Transient(format!("{} failed: {}", path, e)))?;

        if !response.status().is_success() {
            return Err(ToolFailure::Transient(format!(
                "{} returned {}",
                path,
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ToolFailure::Transient(format!("{} response: {}", path, e)))
    }

    /// Point the session's browser at `url`.
    pub async fn navigate(&self, url: &str) -> Result<(), ToolFailure> {
        self.post("navigate", &json!({ "url": url })).await.map(|_| ())
    }

    /// Ask the service to read the current page into `schema`-shaped JSON.
    pub async fn extract(&self, instruction: &str, schema: &Value) -> Result<Value, ToolFailure> {
        let payload = self
            .post(
                "extract",
                &json!({ "instruction": instruction, "schema": schema }),
            )
            .await?;
        Ok(payload.get("result").cloned().unwrap_or(payload))
    }

    /// Best-effort teardown; a failed release is logged, never surfaced.
    pub async fn end(self) {
        let url = format!("{}/sessions/{}", self.base_url, self.session_id);
        let result = self
            .client
            .delete(url)
            .header("X-API-Key", &self.api_key)
            .send()
            .await;
        if let Err(e) = result {
            warn!(session_id = %self.session_id, error = %e, "failed to end browser session");
        }
    }
}
