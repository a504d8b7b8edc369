//! Contact search tool
//!
//! Finds hiring-relevant contacts per company through a Hunter-style domain
//! search API, then applies one canonical selection policy: up to two
//! manager-class contacts plus one individual contributor, backfilled to two,
//! capped at three.

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::batch::{dedup_by_key, log_failures, run_batched};
use crate::config::AgentConfig;
use crate::error::{ToolFailure, ToolResult};
use crate::models::{Contact, Seniority};
use crate::tools::{string_list, Tool};

const HUNTER_BASE_URL: &str = "https://api.hunter.io/v2";
/// Companies per call; bounds external quota spend.
const MAX_COMPANIES: usize = 3;
/// Departments queried per company.
const MAX_DEPARTMENTS: usize = 2;
/// Results requested per (department, seniority) query.
const RESULTS_PER_QUERY: usize = 5;

pub struct FindContactsTool {
    hunter: Option<HunterClient>,
    batch_size: usize,
}

impl FindContactsTool {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            hunter: HunterClient::from_config(config),
            batch_size: config.batch_size,
        }
    }
}

#[async_trait::async_trait]
impl Tool for FindContactsTool {
    fn name(&self) -> &'static str {
        "find_contacts"
    }

    fn description(&self) -> &'static str {
        "Find hiring managers and individual contributors at companies, with \
         verified email addresses. Use this after discovering jobs."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "companies": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Company names to search for contacts"
                },
                "departments": {
                    "type": "array",
                    "items": { "type": "string" },
                    "default": ["it", "management"],
                    "description": "Departments to filter by"
                }
            },
            "required": ["companies"]
        })
    }

    fn consumes_credits(&self) -> bool {
        true
    }

    async fn invoke(&self, args: &Value) -> ToolResult {
        let hunter = self.hunter.as_ref().ok_or_else(|| {
            ToolFailure::Unavailable("HUNTER_API_KEY not configured".to_string())
        })?;

        let mut companies = string_list(args, "companies");
        if companies.is_empty() {
            return Err(ToolFailure::NoResult);
        }
        companies.truncate(MAX_COMPANIES);

        let mut departments = string_list(args, "departments");
        if departments.is_empty() {
            departments = vec!["it".to_string(), "management".to_string()];
        }
        departments.truncate(MAX_DEPARTMENTS);
        let departments = &departments;

        info!(companies = companies.len(), "searching contacts");

        let report = run_batched(companies, self.batch_size, |company| {
            company_contacts(hunter, company, departments)
        })
        .await;
        log_failures(self.name(), &report);

        let results: BTreeMap<String, Vec<Contact>> = report.items.into_iter().collect();
        if results.is_empty() {
            return Err(ToolFailure::NoResult);
        }

        serde_json::to_value(results).map_err(|e| ToolFailure::Transient(e.to_string()))
    }
}

/// Full workflow for one company: query (seniority x department), dedup by
/// email, select the canonical 2-3.
async fn company_contacts(
    hunter: &HunterClient,
    company: String,
    departments: &[String],
) -> Result<Vec<(String, Vec<Contact>)>, ToolFailure> {
    let domain = company_to_domain(&company);
    let mut found = Vec::new();

    for seniority in ["executive", "senior"] {
        for dept in departments {
            match hunter
                .domain_search(&domain, &company, dept, seniority, RESULTS_PER_QUERY)
                .await
            {
                Ok(mut contacts) => found.append(&mut contacts),
                Err(e) => warn!(domain = %domain, dept = %dept, seniority, error = %e, "domain search failed"),
            }
        }
    }

    // Widen to juniors only when the first two passes came back thin.
    if found.len() < RESULTS_PER_QUERY {
        for dept in departments {
            if let Ok(mut contacts) = hunter
                .domain_search(&domain, &company, dept, "junior", RESULTS_PER_QUERY)
                .await
            {
                found.append(&mut contacts);
            }
        }
    }

    let unique = dedup_by_key(found, |c: &Contact| c.email.to_lowercase());
    let selected = select_contacts(unique);
    if selected.is_empty() {
        return Err(ToolFailure::NoResult);
    }

    debug!(company = %company, count = selected.len(), "contacts selected");
    Ok(vec![(company, selected)])
}

/// The canonical contact-selection policy: up to 2 manager-class contacts,
/// then 1 individual contributor, backfilled to a minimum of 2 from whatever
/// remains, capped at 3. Membership is tracked by email, never by identity.
pub(crate) fn select_contacts(people: Vec<Contact>) -> Vec<Contact> {
    let mut selected: Vec<Contact> = Vec::new();
    let mut picked: HashSet<String> = HashSet::new();

    for contact in people.iter().filter(|c| c.seniority.is_manager()).take(2) {
        picked.insert(contact.email.to_lowercase());
        selected.push(contact.clone());
    }

    if let Some(ic) = people
        .iter()
        .find(|c| c.seniority.is_ic() && !picked.contains(&c.email.to_lowercase()))
    {
        picked.insert(ic.email.to_lowercase());
        selected.push(ic.clone());
    }

    if selected.len() < 2 {
        for contact in &people {
            if selected.len() >= 2 {
                break;
            }
            if picked.insert(contact.email.to_lowercase()) {
                selected.push(contact.clone());
            }
        }
    }

    selected.truncate(3);
    selected
}

/// Company name -> email domain heuristic: known mappings first, then
/// suffix-stripped lowercase + ".com".
pub(crate) fn company_to_domain(company: &str) -> String {
    const KNOWN_DOMAINS: &[(&str, &str)] = &[
        ("google", "google.com"),
        ("meta", "meta.com"),
        ("facebook", "meta.com"),
        ("openai", "openai.com"),
        ("anthropic", "anthropic.com"),
        ("microsoft", "microsoft.com"),
        ("apple", "apple.com"),
        ("amazon", "amazon.com"),
        ("netflix", "netflix.com"),
        ("stripe", "stripe.com"),
        ("airbnb", "airbnb.com"),
        ("uber", "uber.com"),
        ("salesforce", "salesforce.com"),
        ("shopify", "shopify.com"),
    ];

    let mut name = company.to_lowercase().trim().to_string();

    if let Some((_, domain)) = KNOWN_DOMAINS.iter().find(|(k, _)| *k == name) {
        return domain.to_string();
    }

    for suffix in [" inc", " corp", " llc", " ltd", ", inc", ", corp"] {
        if let Some(stripped) = name.strip_suffix(suffix) {
            name = stripped.to_string();
            break;
        }
    }

    let slug: String = name
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != '.')
        .collect();
    format!("{}.com", slug)
}

//
// ================= Hunter client =================
//

struct HunterClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct DomainSearchResponse {
    #[serde(default)]
    data: DomainSearchData,
}

#[derive(Debug, Default, Deserialize)]
struct DomainSearchData {
    #[serde(default)]
    emails: Vec<EmailRecord>,
}

#[derive(Debug, Deserialize)]
struct EmailRecord {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    seniority: Option<String>,
    #[serde(default)]
    department: Option<String>,
    #[serde(default)]
    linkedin: Option<String>,
    #[serde(default)]
    confidence: Option<u8>,
}

impl HunterClient {
    fn from_config(config: &AgentConfig) -> Option<Self> {
        let api_key = config.hunter_api_key.clone()?;
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(30))
            .build()
            .ok()?;

        Some(Self {
            client,
            api_key,
            base_url: HUNTER_BASE_URL.to_string(),
        })
    }

    /// Domain search filtered to personal, US-located addresses.
    async fn domain_search(
        &self,
        domain: &str,
        company: &str,
        department: &str,
        seniority: &str,
        limit: usize,
    ) -> Result<Vec<Contact>, ToolFailure> {
        let response = self
            .client
            .get(format!("{}/domain-search", self.base_url))
            .query(&[
                ("domain", domain),
                ("api_key", self.api_key.as_str()),
                ("type", "personal"),
                ("limit", &limit.to_string()),
                ("department", department),
                ("seniority", seniority),
                ("country", "US"),
            ])
            .send()
            .await
            .map_err(|e| ToolFailure::Transient(format!("domain search failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ToolFailure::Transient(format!(
                "domain search returned {}",
                response.status()
            )));
        }

        let payload: DomainSearchResponse = response
            .json()
            .await
            .map_err(|e| ToolFailure::Transient(format!("domain search response: {}", e)))?;

        Ok(payload
            .data
            .emails
            .into_iter()
            .filter_map(|record| {
                let email = record.value.filter(|v| !v.is_empty())?;
                let name = format!(
                    "{} {}",
                    record.first_name.unwrap_or_default(),
                    record.last_name.unwrap_or_default()
                )
                .trim()
                .to_string();
                Some(Contact {
                    name,
                    email,
                    title: record.position,
                    seniority: Seniority::parse(record.seniority.as_deref()),
                    department: record.department,
                    linkedin_url: record.linkedin,
                    confidence: record.confidence,
                    company: company.to_string(),
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(email: &str, seniority: Seniority) -> Contact {
        Contact {
            name: "Test Person".to_string(),
            email: email.to_string(),
            title: None,
            seniority,
            department: None,
            linkedin_url: None,
            confidence: None,
            company: "Acme".to_string(),
        }
    }

    #[test]
    fn test_company_to_domain_known_mapping() {
        assert_eq!(company_to_domain("Google"), "google.com");
        assert_eq!(company_to_domain("Facebook"), "meta.com");
    }

    #[test]
    fn test_company_to_domain_strips_suffixes() {
        assert_eq!(company_to_domain("Acme Inc"), "acme.com");
        assert_eq!(company_to_domain("Initech Corp"), "initech.com");
        assert_eq!(company_to_domain("Wayne Enterprises"), "wayneenterprises.com");
    }

    #[test]
    fn test_selection_prefers_managers_plus_one_ic() {
        let people = vec![
            contact("exec1@acme.com", Seniority::Executive),
            contact("exec2@acme.com", Seniority::Manager),
            contact("exec3@acme.com", Seniority::Executive),
            contact("ic1@acme.com", Seniority::Senior),
            contact("ic2@acme.com", Seniority::Junior),
        ];
        let selected = select_contacts(people);
        let emails: Vec<&str> = selected.iter().map(|c| c.email.as_str()).collect();
        assert_eq!(emails, vec!["exec1@acme.com", "exec2@acme.com", "ic1@acme.com"]);
    }

    #[test]
    fn test_selection_backfills_without_managers() {
        let people = vec![
            contact("a@acme.com", Seniority::Unclassified),
            contact("b@acme.com", Seniority::Unclassified),
            contact("c@acme.com", Seniority::Unclassified),
        ];
        let selected = select_contacts(people);
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_selection_caps_at_three() {
        let people = vec![
            contact("m1@acme.com", Seniority::Manager),
            contact("m2@acme.com", Seniority::Manager),
            contact("s1@acme.com", Seniority::Senior),
            contact("s2@acme.com", Seniority::Senior),
        ];
        assert_eq!(select_contacts(people).len(), 3);
    }

    #[test]
    fn test_selection_of_empty_input() {
        assert!(select_contacts(Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_tool_is_unavailable() {
        let tool = FindContactsTool::from_config(&AgentConfig::default());
        let result = tool
            .invoke(&serde_json::json!({ "companies": ["Acme"] }))
            .await;
        assert!(matches!(result, Err(ToolFailure::Unavailable(_))));
    }
}
