//! Run state and the state merger
//!
//! One `RunState` per run, exclusively owned by the control loop. Collections
//! only grow during a run; the merger is the single mutation path.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::classifier::ToolPayload;
use crate::models::{Contact, Draft, EnrichmentRecord, Job};

/// Hard cap on contacts kept per company.
pub const MAX_CONTACTS_PER_COMPANY: usize = 3;

/// The accumulating result object for one orchestration run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub jobs: Vec<Job>,
    pub contacts: BTreeMap<String, Vec<Contact>>,
    pub enrichment: BTreeMap<String, EnrichmentRecord>,
    pub drafts: Vec<Draft>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a classified tool payload into the matching slot.
    ///
    /// Unrecognized payloads are dropped here (logged, never fatal) so the
    /// loop stays open to tools it was not compiled against.
    pub fn merge(&mut self, payload: ToolPayload) {
        match payload {
            ToolPayload::Jobs(jobs) => self.merge_jobs(jobs),
            ToolPayload::Contacts(contacts) => self.merge_contacts(contacts),
            ToolPayload::Draft(draft) => self.drafts.push(*draft),
            ToolPayload::Enrichment(records) => self.merge_enrichment(records),
            ToolPayload::Unrecognized => {
                debug!("unrecognized payload shape ignored by merger");
            }
        }
    }

    /// Append, then dedup the whole sequence by id, first occurrence wins.
    fn merge_jobs(&mut self, jobs: Vec<Job>) {
        self.jobs.extend(jobs);
        let mut seen = HashSet::new();
        self.jobs.retain(|job| seen.insert(job.id.clone()));
    }

    /// Per-company merge, dedup by email (first wins), capped per company.
    fn merge_contacts(&mut self, contacts: BTreeMap<String, Vec<Contact>>) {
        for (company, incoming) in contacts {
            let slot = self.contacts.entry(company).or_default();
            let mut seen: HashSet<String> =
                slot.iter().map(|c| c.email.to_lowercase()).collect();
            for contact in incoming {
                if slot.len() >= MAX_CONTACTS_PER_COMPANY {
                    break;
                }
                if contact.email.is_empty() {
                    continue;
                }
                if seen.insert(contact.email.to_lowercase()) {
                    slot.push(contact);
                }
            }
        }
    }

    /// Merge by company key with field-level last-write-wins: a field absent
    /// or empty in the newer record keeps the older value.
    fn merge_enrichment(&mut self, records: BTreeMap<String, EnrichmentRecord>) {
        for (company, incoming) in records {
            match self.enrichment.get_mut(&company) {
                Some(existing) => {
                    if !incoming.news_items.is_empty() {
                        existing.news_items = incoming.news_items;
                    }
                    if incoming.social_profile.is_some() {
                        existing.social_profile = incoming.social_profile;
                    }
                }
                None => {
                    self.enrichment.insert(company, incoming);
                }
            }
        }
    }

    /// One-line summary of counts per slot, fed back to the planner as
    /// context for the next decision.
    pub fn summary(&self) -> String {
        let contact_count: usize = self.contacts.values().map(|v| v.len()).sum();
        format!(
            "jobs: {}, contacts: {}, companies enriched: {}, drafts: {}",
            self.jobs.len(),
            contact_count,
            self.enrichment.len(),
            self.drafts.len(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
            && self.contacts.is_empty()
            && self.enrichment.is_empty()
            && self.drafts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewsItem, Seniority, SocialProfile};

    fn job(id: &str, company: &str) -> Job {
        Job {
            id: id.to_string(),
            company: company.to_string(),
            role: "Engineer".to_string(),
            location: String::new(),
            employment_type: String::new(),
            summary: String::new(),
            posted_date: String::new(),
            url: String::new(),
        }
    }

    fn contact(email: &str, company: &str) -> Contact {
        Contact {
            name: "Jane Smith".to_string(),
            email: email.to_string(),
            title: None,
            seniority: Seniority::Manager,
            department: None,
            linkedin_url: None,
            confidence: Some(90),
            company: company.to_string(),
        }
    }

    #[test]
    fn test_jobs_dedup_by_id_first_wins() {
        let mut state = RunState::new();
        state.merge(ToolPayload::Jobs(vec![job("j1", "Acme"), job("j2", "Acme")]));
        state.merge(ToolPayload::Jobs(vec![job("j2", "Other"), job("j3", "Acme")]));

        let ids: Vec<&str> = state.jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["j1", "j2", "j3"]);
        // First occurrence of j2 kept its company.
        assert_eq!(state.jobs[1].company, "Acme");
    }

    #[test]
    fn test_contacts_dedup_by_email_and_cap() {
        let mut state = RunState::new();
        let batch: BTreeMap<String, Vec<Contact>> = [(
            "Acme".to_string(),
            vec![
                contact("a@acme.com", "Acme"),
                contact("A@acme.com", "Acme"),
                contact("b@acme.com", "Acme"),
                contact("c@acme.com", "Acme"),
                contact("d@acme.com", "Acme"),
            ],
        )]
        .into();
        state.merge(ToolPayload::Contacts(batch));

        let acme = &state.contacts["Acme"];
        assert_eq!(acme.len(), MAX_CONTACTS_PER_COMPANY);
        let emails: HashSet<String> = acme.iter().map(|c| c.email.to_lowercase()).collect();
        assert_eq!(emails.len(), acme.len());
    }

    #[test]
    fn test_drafts_are_never_deduplicated() {
        let draft = Draft {
            subject: "Hello".to_string(),
            body: "Quick question".to_string(),
            recipient_email: "a@acme.com".to_string(),
            recipient_name: "Jane".to_string(),
            tactics_used: vec!["mentioned_role".to_string()],
        };
        let mut state = RunState::new();
        state.merge(ToolPayload::Draft(Box::new(draft.clone())));
        state.merge(ToolPayload::Draft(Box::new(draft)));
        assert_eq!(state.drafts.len(), 2);
    }

    #[test]
    fn test_enrichment_field_level_overwrite() {
        let mut state = RunState::new();
        let first: BTreeMap<String, EnrichmentRecord> = [(
            "Acme".to_string(),
            EnrichmentRecord {
                company_name: "Acme".to_string(),
                news_items: vec![NewsItem {
                    title: "Old headline".to_string(),
                    source: "Wire".to_string(),
                    date: "2 days ago".to_string(),
                    url: String::new(),
                }],
                social_profile: Some(SocialProfile {
                    handle: "@acme".to_string(),
                    display_name: "Acme".to_string(),
                    bio: String::new(),
                    recent_posts: vec![],
                }),
            },
        )]
        .into();
        state.merge(ToolPayload::Enrichment(first));

        // Newer record carries news only; profile must survive.
        let second: BTreeMap<String, EnrichmentRecord> = [(
            "Acme".to_string(),
            EnrichmentRecord {
                company_name: "Acme".to_string(),
                news_items: vec![NewsItem {
                    title: "New headline".to_string(),
                    source: "Wire".to_string(),
                    date: "1 hour ago".to_string(),
                    url: String::new(),
                }],
                social_profile: None,
            },
        )]
        .into();
        state.merge(ToolPayload::Enrichment(second));

        let record = &state.enrichment["Acme"];
        assert_eq!(record.news_items[0].title, "New headline");
        assert!(record.social_profile.is_some());
    }

    #[test]
    fn test_summary_counts_per_slot() {
        let mut state = RunState::new();
        state.merge(ToolPayload::Jobs(vec![job("j1", "Acme")]));
        assert_eq!(state.summary(), "jobs: 1, contacts: 0, companies enriched: 0, drafts: 0");
    }
}
