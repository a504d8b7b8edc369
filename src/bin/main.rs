use outreach_agent::{
    agent::Agent,
    config::AgentConfig,
    execution::ToolExecutor,
    models::{Decision, ToolCall},
    planner::{GeminiPlanner, MockPlanner, Planner},
    tools::create_default_registry,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // Load environment variables
    dotenv::dotenv().ok();
    let config = AgentConfig::from_env();

    let goal = {
        let args: Vec<String> = std::env::args().skip(1).collect();
        if args.is_empty() {
            "Find software engineer jobs at Anthropic and draft outreach emails".to_string()
        } else {
            args.join(" ")
        }
    };

    info!("Outreach Research Agent");

    // Without an LLM key, fall back to a scripted planner so the loop still
    // demonstrates a full pass (tools without credentials simply report
    // themselves unavailable).
    let planner: Box<dyn Planner> = match config.gemini_api_key.clone() {
        Some(key) => Box::new(GeminiPlanner::new(key)?),
        None => {
            eprintln!("GEMINI_API_KEY not set; running with the scripted demo planner");
            Box::new(MockPlanner::new(vec![Decision {
                thought: Some("Start by discovering jobs".to_string()),
                tool_calls: vec![ToolCall {
                    tool_name: "discover_jobs".to_string(),
                    arguments: serde_json::json!({
                        "companies": ["Anthropic"],
                        "roles": ["Software Engineer"]
                    }),
                }],
            }]))
        }
    };

    let registry = Arc::new(create_default_registry(&config));
    let agent = Agent::new(planner, ToolExecutor::new(registry), config.max_steps);

    info!(goal = %goal, "running agent");

    match agent.run(&goal).await {
        Ok(report) => {
            println!("\n=== RUN RESULT ===");
            println!("Run ID: {}", report.run_id);
            println!("Status: {:?} after {} steps", report.status, report.steps_taken);

            println!("\nJobs found: {}", report.state.jobs.len());
            for job in &report.state.jobs {
                println!("  {} at {} - {}", job.role, job.company, job.url);
            }

            println!("\nContacts:");
            for (company, contacts) in &report.state.contacts {
                for contact in contacts {
                    println!("  {} <{}> ({})", contact.name, contact.email, company);
                }
            }

            println!("\nDrafts: {}", report.state.drafts.len());
            for draft in &report.state.drafts {
                println!("  To {}: {}", draft.recipient_email, draft.subject);
            }

            println!("\nReasoning Trace:");
            for (i, entry) in report.trace.iter().enumerate() {
                println!("  {}: [{:?}] {}", i + 1, entry.kind, entry.content);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Agent run failed: {}", e);
            Err(Box::new(e) as Box<dyn std::error::Error>)
        }
    }
}
