//! Job discovery tool
//!
//! Scrapes job listings from company career pages through the cloud browser
//! service. Fans out over company x role pairs with the batch orchestrator
//! and dedups the merged listings by stable id.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::batch::{dedup_by_key, log_failures, run_batched};
use crate::browser::BrowserClient;
use crate::config::AgentConfig;
use crate::error::{ToolFailure, ToolResult};
use crate::models::{stable_job_id, Job};
use crate::tools::{string_list, usize_arg, Tool};

const DEFAULT_MAX_RESULTS: usize = 10;

pub struct DiscoverJobsTool {
    browser: Option<BrowserClient>,
    max_companies: usize,
    max_roles: usize,
    batch_size: usize,
}

impl DiscoverJobsTool {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            browser: BrowserClient::from_config(config),
            max_companies: config.max_companies,
            max_roles: config.max_roles,
            batch_size: config.batch_size,
        }
    }
}

#[async_trait::async_trait]
impl Tool for DiscoverJobsTool {
    fn name(&self) -> &'static str {
        "discover_jobs"
    }

    fn description(&self) -> &'static str {
        "Search company career pages for job postings matching the given roles. \
         Use this first when the goal involves finding jobs."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "companies": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Company names to search"
                },
                "roles": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Job titles to match; empty means any role"
                },
                "maxResults": {
                    "type": "integer",
                    "default": DEFAULT_MAX_RESULTS
                }
            },
            "required": ["companies"]
        })
    }

    fn consumes_credits(&self) -> bool {
        true
    }

    async fn invoke(&self, args: &Value) -> ToolResult {
        let browser = self.browser.as_ref().ok_or_else(|| {
            ToolFailure::Unavailable(
                "BROWSERBASE_API_KEY / BROWSERBASE_PROJECT_ID not configured".to_string(),
            )
        })?;

        let mut companies = string_list(args, "companies");
        if companies.is_empty() {
            return Err(ToolFailure::NoResult);
        }
        let mut roles = string_list(args, "roles");
        let max_results = usize_arg(args, "maxResults", DEFAULT_MAX_RESULTS);

        // Hard fan-out caps, applied before dispatch.
        companies.truncate(self.max_companies);
        roles.truncate(self.max_roles);
        if roles.is_empty() {
            roles.push(String::new());
        }

        let per_target = (max_results / companies.len()).max(1);
        let pairs: Vec<(String, String)> = companies
            .iter()
            .flat_map(|c| roles.iter().map(move |r| (c.clone(), r.clone())))
            .collect();

        info!(targets = pairs.len(), "discovering jobs");

        let report = run_batched(pairs, self.batch_size, |(company, role)| {
            scrape_company_jobs(browser, company, role, per_target)
        })
        .await;
        log_failures(self.name(), &report);

        let mut jobs = dedup_by_key(report.items, |job: &Job| job.id.clone());
        jobs.truncate(max_results);

        if jobs.is_empty() {
            return Err(ToolFailure::NoResult);
        }

        debug!(count = jobs.len(), "job discovery complete");
        serde_json::to_value(jobs).map_err(|e| ToolFailure::Transient(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawListing {
    title: String,
    #[serde(default)]
    apply_url: Option<String>,
}

/// One scrape: find the company's careers page, extract listings, keep the
/// ones matching the role.
async fn scrape_company_jobs(
    browser: &BrowserClient,
    company: String,
    role: String,
    limit: usize,
) -> Result<Vec<Job>, ToolFailure> {
    browser
        .with_session(move |session| async move {
            let slug = company_slug(&company);

            // Job boards first; they are the most reliably structured.
            let mut careers_url = None;
            for url in careers_url_candidates(&slug) {
                if session.navigate(&url).await.is_ok() {
                    debug!(company = %company, url = %url, "careers page found");
                    careers_url = Some(url);
                    break;
                }
            }
            let careers_url = match careers_url {
                Some(url) => url,
                None => {
                    debug!(company = %company, "no careers page reachable");
                    return Ok(Vec::new());
                }
            };

            let extracted = session
                .extract(
                    "Extract the list of open jobs on this page. For each job return \
                     its title and the URL of the listing. Limit to 10 jobs.",
                    &json!({
                        "type": "object",
                        "properties": {
                            "jobs": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "title": { "type": "string" },
                                        "applyUrl": { "type": "string" }
                                    },
                                    "required": ["title"]
                                }
                            }
                        },
                        "required": ["jobs"]
                    }),
                )
                .await?;

            let listings: Vec<RawListing> = extracted
                .get("jobs")
                .cloned()
                .map(|v| serde_json::from_value(v).unwrap_or_default())
                .unwrap_or_default();

            let matching = filter_by_role(listings, &role);

            Ok(matching
                .into_iter()
                .take(limit)
                .map(|listing| {
                    let url = listing.apply_url.unwrap_or_else(|| careers_url.clone());
                    Job {
                        id: stable_job_id(&url, &listing.title),
                        company: company.clone(),
                        role: listing.title,
                        location: "Not specified".to_string(),
                        employment_type: "Full-time".to_string(),
                        summary: format!("Position at {}", company),
                        posted_date: "Recently".to_string(),
                        url,
                    }
                })
                .collect())
        })
        .await
}

fn company_slug(company: &str) -> String {
    company
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

fn careers_url_candidates(slug: &str) -> Vec<String> {
    vec![
        format!("https://boards.greenhouse.io/{}", slug),
        format!("https://jobs.lever.co/{}", slug),
        format!("https://jobs.ashbyhq.com/{}", slug),
        format!("https://www.{}.com/careers", slug),
        format!("https://{}.com/careers", slug),
        format!("https://www.{}.com/jobs", slug),
    ]
}

/// Keep listings whose title mentions the role (or any word of it). When
/// nothing matches, return everything so the caller can still browse.
fn filter_by_role(listings: Vec<RawListing>, role: &str) -> Vec<RawListing> {
    let role = role.trim().to_lowercase();
    if role.is_empty() {
        return listings;
    }
    let words: Vec<&str> = role.split_whitespace().collect();

    let (matching, rest): (Vec<RawListing>, Vec<RawListing>) =
        listings.into_iter().partition(|listing| {
            let title = listing.title.to_lowercase();
            title.contains(&role) || words.iter().any(|w| title.contains(w))
        });

    if matching.is_empty() {
        rest
    } else {
        matching
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;

    fn listing(title: &str) -> RawListing {
        RawListing {
            title: title.to_string(),
            apply_url: None,
        }
    }

    #[test]
    fn test_company_slug_strips_punctuation() {
        assert_eq!(company_slug("Acme, Inc."), "acmeinc");
        assert_eq!(company_slug("Open AI"), "openai");
    }

    #[test]
    fn test_careers_candidates_prefer_job_boards() {
        let candidates = careers_url_candidates("acme");
        assert_eq!(candidates[0], "https://boards.greenhouse.io/acme");
        assert!(candidates.iter().any(|u| u.contains("lever.co")));
    }

    #[test]
    fn test_filter_by_role_matches_words() {
        let listings = vec![
            listing("Senior Product Manager"),
            listing("Staff Engineer"),
            listing("Product Designer"),
        ];
        let matched = filter_by_role(listings, "Product Manager");
        let titles: Vec<&str> = matched.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Senior Product Manager", "Product Designer"]);
    }

    #[test]
    fn test_filter_by_role_falls_back_to_all() {
        let listings = vec![listing("Recruiter"), listing("Accountant")];
        let matched = filter_by_role(listings, "Engineer");
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn test_empty_role_matches_everything() {
        let listings = vec![listing("Recruiter"), listing("Engineer")];
        assert_eq!(filter_by_role(listings, "").len(), 2);
    }

    #[tokio::test]
    async fn test_unconfigured_tool_is_unavailable() {
        let tool = DiscoverJobsTool::from_config(&AgentConfig::default());
        let result = tool
            .invoke(&serde_json::json!({ "companies": ["Acme"] }))
            .await;
        assert!(matches!(result, Err(ToolFailure::Unavailable(_))));
    }
}
