//! Company enrichment tool
//!
//! Gathers personalization material per company: recent news headlines and
//! the company's social profile with its latest posts. News and profile
//! lookups for one company run concurrently; either side may fail without
//! losing the other.

use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::batch::{log_failures, run_batched};
use crate::browser::BrowserClient;
use crate::config::AgentConfig;
use crate::error::{ToolFailure, ToolResult};
use crate::models::{EnrichmentRecord, NewsItem, SocialProfile};
use crate::tools::{string_list, Tool};

/// Companies per call.
const MAX_COMPANIES: usize = 3;
/// Headlines kept per company.
const MAX_NEWS_ITEMS: usize = 5;
/// Posts kept per profile.
const MAX_RECENT_POSTS: usize = 5;
/// Headlines older than this are dropped.
const NEWS_MAX_AGE_DAYS: i64 = 30;

pub struct EnrichCompanyTool {
    browser: Option<BrowserClient>,
    batch_size: usize,
}

impl EnrichCompanyTool {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            browser: BrowserClient::from_config(config),
            batch_size: config.batch_size,
        }
    }
}

#[async_trait::async_trait]
impl Tool for EnrichCompanyTool {
    fn name(&self) -> &'static str {
        "enrich_company"
    }

    fn description(&self) -> &'static str {
        "Collect recent news and the social profile for companies, as \
         personalization material for outreach drafts."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "companies": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Company names to research"
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
        companies.truncate(MAX_COMPANIES);

        info!(companies = companies.len(), "enriching companies");

        let report = run_batched(companies, self.batch_size, |company| {
            enrich_one(browser, company)
        })
        .await;
        log_failures(self.name(), &report);

        let results: BTreeMap<String, EnrichmentRecord> = report.items.into_iter().collect();
        if results.is_empty() {
            return Err(ToolFailure::NoResult);
        }

        serde_json::to_value(results).map_err(|e| ToolFailure::Transient(e.to_string()))
    }
}

/// News and profile for one company, fetched concurrently. A partial record
/// is still a success; only a fully empty one counts as no result.
async fn enrich_one(
    browser: &BrowserClient,
    company: String,
) -> Result<Vec<(String, EnrichmentRecord)>, ToolFailure> {
    let (news, profile) = tokio::join!(
        fetch_company_news(browser, company.clone()),
        fetch_social_profile(browser, company.clone()),
    );

    let news_items = match news {
        Ok(items) => items,
        Err(e) => {
            warn!(company = %company, error = %e, "news lookup failed");
            Vec::new()
        }
    };
    let social_profile = match profile {
        Ok(profile) => profile,
        Err(e) => {
            warn!(company = %company, error = %e, "profile lookup failed");
            None
        }
    };

    if news_items.is_empty() && social_profile.is_none() {
        return Err(ToolFailure::NoResult);
    }

    debug!(company = %company, news = news_items.len(), "company enriched");
    let record = EnrichmentRecord {
        company_name: company.clone(),
        news_items,
        social_profile,
    };
    Ok(vec![(company, record)])
}

async fn fetch_company_news(
    browser: &BrowserClient,
    company: String,
) -> Result<Vec<NewsItem>, ToolFailure> {
    browser
        .with_session(move |session| async move {
            let search_url = format!(
                "https://news.google.com/search?q={}&hl=en-US&gl=US&ceid=US:en",
                company
            );
            session.navigate(&search_url).await?;

            let extracted = session
                .extract(
                    "Extract up to 5 news articles visible on this page. For each \
                     article return the headline as title, the outlet as source, the \
                     publication date (absolute or relative), and the article URL. \
                     Skip ads and navigation.",
                    &json!({
                        "type": "object",
                        "properties": {
                            "articles": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "title": { "type": "string" },
                                        "source": { "type": "string" },
                                        "date": { "type": "string" },
                                        "url": { "type": "string" }
                                    },
                                    "required": ["title", "source"]
                                }
                            }
                        },
                        "required": ["articles"]
                    }),
                )
                .await?;

            let articles: Vec<NewsItem> = extracted
                .get("articles")
                .cloned()
                .map(|v| serde_json::from_value(v).unwrap_or_default())
                .unwrap_or_default();

            let mut recent = filter_recent(articles, NEWS_MAX_AGE_DAYS);
            recent.truncate(MAX_NEWS_ITEMS);
            Ok(recent)
        })
        .await
}

#[derive(Debug, Deserialize)]
struct RawHandle {
    #[serde(default)]
    handle: String,
    #[serde(default, rename = "displayName")]
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct RawPost {
    #[serde(default)]
    text: String,
}

async fn fetch_social_profile(
    browser: &BrowserClient,
    company: String,
) -> Result<Option<SocialProfile>, ToolFailure> {
    browser
        .with_session(move |session| async move {
            // Step 1: find the official handle via web search.
            let search_url = format!(
                "https://www.google.com/search?q={}+official+twitter+OR+x.com",
                company
            );
            session.navigate(&search_url).await?;

            let handle_value = session
                .extract(
                    &format!(
                        "Find the official X (Twitter) handle for {}. Return the \
                         handle without the @ sign as 'handle' and the account's \
                         display name as 'displayName'. Pick the official company \
                         account, not fan or employee accounts.",
                        company
                    ),
                    &json!({
                        "type": "object",
                        "properties": {
                            "handle": { "type": "string" },
                            "displayName": { "type": "string" }
                        }
                    }),
                )
                .await?;

            let raw: RawHandle = serde_json::from_value(handle_value).unwrap_or(RawHandle {
                handle: String::new(),
                display_name: String::new(),
            });
            let handle = raw.handle.trim().trim_start_matches('@').to_string();
            if handle.is_empty() {
                return Ok(None);
            }

            // Step 2: read bio and latest posts from a public mirror.
            session
                .navigate(&format!("https://nitter.net/{}", handle))
                .await?;

            let profile_value = session
                .extract(
                    "Extract the profile bio as 'bio' and the most recent original \
                     posts as 'posts', each with its text. Skip reposts and replies.",
                    &json!({
                        "type": "object",
                        "properties": {
                            "bio": { "type": "string" },
                            "posts": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "text": { "type": "string" }
                                    }
                                }
                            }
                        }
                    }),
                )
                .await?;

            let bio = profile_value
                .get("bio")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let posts: Vec<RawPost> = profile_value
                .get("posts")
                .cloned()
                .map(|v| serde_json::from_value(v).unwrap_or_default())
                .unwrap_or_default();

            let display_name = if raw.display_name.is_empty() {
                company.clone()
            } else {
                raw.display_name
            };

            Ok(Some(SocialProfile {
                handle: format!("@{}", handle),
                display_name,
                bio,
                recent_posts: posts
                    .into_iter()
                    .map(|p| p.text)
                    .filter(|t| !t.is_empty())
                    .take(MAX_RECENT_POSTS)
                    .collect(),
            }))
        })
        .await
}

/// Keep articles no older than `max_age_days`. Relative dates ("2 hours ago",
/// "3 weeks ago") are parsed heuristically; anything unparseable is kept,
/// since a stale talking point beats a missing one.
fn filter_recent(items: Vec<NewsItem>, max_age_days: i64) -> Vec<NewsItem> {
    items
        .into_iter()
        .filter(|item| {
            let date = item.date.to_lowercase();
            if date.contains("hour") || date.contains("minute") || date.contains("just now") {
                true
            } else if date.contains("day") {
                leading_number(&date, "day").map(|d| d <= max_age_days).unwrap_or(true)
            } else if date.contains("week") {
                leading_number(&date, "week")
                    .map(|w| w * 7 <= max_age_days)
                    .unwrap_or(true)
            } else if date.contains("month") || date.contains("year") {
                false
            } else {
                true
            }
        })
        .collect()
}

fn leading_number(date: &str, unit: &str) -> Option<i64> {
    let prefix = date.split(unit).next()?;
    let digits: String = prefix.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(date: &str) -> NewsItem {
        NewsItem {
            title: "Headline".to_string(),
            source: "Wire".to_string(),
            date: date.to_string(),
            url: String::new(),
        }
    }

    #[test]
    fn test_filter_recent_keeps_fresh_relative_dates() {
        let items = vec![article("2 hours ago"), article("3 days ago"), article("1 week ago")];
        assert_eq!(filter_recent(items, 30).len(), 3);
    }

    #[test]
    fn test_filter_recent_drops_old_relative_dates() {
        let items = vec![article("45 days ago"), article("6 weeks ago"), article("2 months ago")];
        assert!(filter_recent(items, 30).is_empty());
    }

    #[test]
    fn test_filter_recent_keeps_unparseable_dates() {
        let items = vec![article("Jan 15"), article("")];
        assert_eq!(filter_recent(items, 30).len(), 2);
    }

    #[tokio::test]
    async fn test_unconfigured_tool_is_unavailable() {
        let tool = EnrichCompanyTool::from_config(&AgentConfig::default());
        let result = tool
            .invoke(&serde_json::json!({ "companies": ["Acme"] }))
            .await;
        assert!(matches!(result, Err(ToolFailure::Unavailable(_))));
    }
}
