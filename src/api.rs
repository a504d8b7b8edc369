//! REST API server for the outreach agent
//!
//! Exposes the agent loop via HTTP, plus direct per-capability endpoints for
//! debugging and frontend use.

use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::agent::Agent;
use crate::error::{AgentError, ToolFailure};
use crate::tools::ToolRegistry;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub goal: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverRequest {
    pub companies: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_max_results() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub struct ContactsRequest {
    pub companies: Vec<String>,
    #[serde(default)]
    pub departments: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct EnrichRequest {
    pub companies: Vec<String>,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<Agent>,
    pub tools: Arc<ToolRegistry>,
}

/// =============================
/// Handlers
/// =============================

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Run the full agent loop against a goal.
async fn run_agent(
    State(state): State<ApiState>,
    Json(req): Json<RunRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    info!("received run request: {}", req.goal);

    match state.agent.run(&req.goal).await {
        Ok(report) => (StatusCode::OK, Json(ApiResponse::success(report))),
        Err(e @ AgentError::PlannerUnreachable(_)) => (
            StatusCode::BAD_GATEWAY,
            Json(ApiResponse::error(e.to_string())),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(format!("run failed: {}", e))),
        ),
    }
}

/// Invoke one registered tool directly, mapping expected failures to HTTP
/// statuses instead of letting them read as server faults.
async fn invoke_tool(
    state: &ApiState,
    tool_name: &str,
    args: Value,
) -> (StatusCode, Json<ApiResponse>) {
    let Some(tool) = state.tools.get(tool_name) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("unknown tool '{}'", tool_name))),
        );
    };

    match tool.invoke(&args).await {
        Ok(payload) => (StatusCode::OK, Json(ApiResponse::success(payload))),
        Err(ToolFailure::NoResult) => (StatusCode::OK, Json(ApiResponse::success(Value::Null))),
        Err(failure @ ToolFailure::Unavailable(_)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::error(failure.to_string())),
        ),
        Err(failure @ ToolFailure::Transient(_)) => (
            StatusCode::BAD_GATEWAY,
            Json(ApiResponse::error(failure.to_string())),
        ),
    }
}

async fn discover_jobs(
    State(state): State<ApiState>,
    Json(req): Json<DiscoverRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let args = json!({
        "companies": req.companies,
        "roles": req.roles,
        "maxResults": req.max_results,
    });
    invoke_tool(&state, "discover_jobs", args).await
}

async fn find_contacts(
    State(state): State<ApiState>,
    Json(req): Json<ContactsRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let args = json!({
        "companies": req.companies,
        "departments": req.departments,
    });
    invoke_tool(&state, "find_contacts", args).await
}

async fn enrich_company(
    State(state): State<ApiState>,
    Json(req): Json<EnrichRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let args = json!({ "companies": req.companies });
    invoke_tool(&state, "enrich_company", args).await
}

/// =============================
/// Router
/// =============================

pub fn create_router(agent: Arc<Agent>, tools: Arc<ToolRegistry>) -> Router {
    let state = ApiState { agent, tools };

    Router::new()
        .route("/health", get(health))
        .route("/api/run", post(run_agent))
        .route("/api/discover", post(discover_jobs))
        .route("/api/contacts", post(find_contacts))
        .route("/api/enrich", post(enrich_company))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    agent: Arc<Agent>,
    tools: Arc<ToolRegistry>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(agent, tools);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
