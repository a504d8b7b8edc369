//! Result Classifier
//!
//! Decides which run-state slot a tool's success payload belongs to, without
//! knowing which tool produced it. Classification inspects the payload shape
//! (ordered rules, first match wins) and yields an explicit tagged payload
//! that the merger dispatches on.
//!
//! Shape sniffing is a deliberate trade-off: the loop must stay open to tools
//! registered after this module was written, so dispatch cannot key on tool
//! names. The tag boundary keeps the heuristics in one place.

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::{Contact, Draft, EnrichmentRecord, Job};

/// A tool payload after classification.
#[derive(Debug)]
pub enum ToolPayload {
    Jobs(Vec<Job>),
    Contacts(BTreeMap<String, Vec<Contact>>),
    Draft(Box<Draft>),
    Enrichment(BTreeMap<String, EnrichmentRecord>),
    Unrecognized,
}

pub struct ResultClassifier;

impl ResultClassifier {
    /// Ordered rules:
    /// 1. sequence whose first element has a `role` field -> jobs
    /// 2. mapping with an email-bearing sequence value -> contacts
    /// 3. mapping with `subject` and `body` -> a single draft
    /// 4. mapping with news / social-profile markers -> enrichment
    /// 5. anything else -> unrecognized (ignored by the merger)
    pub fn classify(payload: &Value) -> ToolPayload {
        if Self::looks_like_jobs(payload) {
            match serde_json::from_value::<Vec<Job>>(payload.clone()) {
                Ok(jobs) => return ToolPayload::Jobs(jobs),
                Err(e) => {
                    debug!(error = %e, "job-shaped payload failed to decode");
                    return ToolPayload::Unrecognized;
                }
            }
        }

        if Self::looks_like_contacts(payload) {
            match serde_json::from_value::<BTreeMap<String, Vec<Contact>>>(payload.clone()) {
                Ok(contacts) => return ToolPayload::Contacts(contacts),
                Err(e) => {
                    debug!(error = %e, "contact-shaped payload failed to decode");
                    return ToolPayload::Unrecognized;
                }
            }
        }

        if Self::looks_like_draft(payload) {
            match serde_json::from_value::<Draft>(payload.clone()) {
                Ok(draft) => return ToolPayload::Draft(Box::new(draft)),
                Err(e) => {
                    debug!(error = %e, "draft-shaped payload failed to decode");
                    return ToolPayload::Unrecognized;
                }
            }
        }

        if Self::looks_like_enrichment(payload) {
            match serde_json::from_value::<BTreeMap<String, EnrichmentRecord>>(payload.clone()) {
                Ok(records) => return ToolPayload::Enrichment(records),
                Err(e) => {
                    debug!(error = %e, "enrichment-shaped payload failed to decode");
                    return ToolPayload::Unrecognized;
                }
            }
        }

        ToolPayload::Unrecognized
    }

    fn looks_like_jobs(payload: &Value) -> bool {
        payload
            .as_array()
            .and_then(|items| items.first())
            .map(|first| first.get("role").is_some())
            .unwrap_or(false)
    }

    fn looks_like_contacts(payload: &Value) -> bool {
        let Some(map) = payload.as_object() else {
            return false;
        };
        map.values().any(|value| {
            value
                .as_array()
                .map(|items| items.iter().any(|item| item.get("email").is_some()))
                .unwrap_or(false)
        })
    }

    fn looks_like_draft(payload: &Value) -> bool {
        payload
            .as_object()
            .map(|map| map.contains_key("subject") && map.contains_key("body"))
            .unwrap_or(false)
    }

    fn looks_like_enrichment(payload: &Value) -> bool {
        let Some(map) = payload.as_object() else {
            return false;
        };
        map.values().any(|value| {
            value
                .as_object()
                .map(|record| {
                    record.contains_key("newsItems")
                        || record.contains_key("news")
                        || record.contains_key("socialProfile")
                })
                .unwrap_or(false)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classifies_jobs_sequence() {
        let payload = json!([
            {"id": "j1", "company": "Acme", "role": "Engineer"},
            {"id": "j2", "company": "Acme", "role": "Product Manager"}
        ]);
        match ResultClassifier::classify(&payload) {
            ToolPayload::Jobs(jobs) => {
                assert_eq!(jobs.len(), 2);
                assert_eq!(jobs[0].id, "j1");
            }
            other => panic!("expected jobs, got {:?}", other),
        }
    }

    #[test]
    fn test_classifies_contacts_mapping() {
        let payload = json!({
            "Acme": [
                {"name": "Jane Smith", "email": "jane@acme.com", "company": "Acme"}
            ],
            "Globex": []
        });
        match ResultClassifier::classify(&payload) {
            ToolPayload::Contacts(map) => {
                assert_eq!(map["Acme"].len(), 1);
                assert_eq!(map["Acme"][0].email, "jane@acme.com");
            }
            other => panic!("expected contacts, got {:?}", other),
        }
    }

    #[test]
    fn test_classifies_draft_mapping() {
        let payload = json!({
            "subject": "Quick question",
            "body": "Saw the opening...",
            "recipientEmail": "jane@acme.com"
        });
        assert!(matches!(
            ResultClassifier::classify(&payload),
            ToolPayload::Draft(_)
        ));
    }

    #[test]
    fn test_classifies_enrichment_mapping() {
        let payload = json!({
            "Acme": {
                "companyName": "Acme",
                "newsItems": [{"title": "Acme raises Series C", "source": "Wire"}],
                "socialProfile": null
            }
        });
        assert!(matches!(
            ResultClassifier::classify(&payload),
            ToolPayload::Enrichment(_)
        ));
    }

    #[test]
    fn test_rule_order_jobs_before_contacts() {
        // A sequence whose elements carry both role and email is still jobs:
        // rule 1 fires before rule 2 ever gets a look.
        let payload = json!([
            {"id": "j1", "company": "Acme", "role": "Engineer", "email": "x@acme.com"}
        ]);
        assert!(matches!(
            ResultClassifier::classify(&payload),
            ToolPayload::Jobs(_)
        ));
    }

    #[test]
    fn test_unrecognized_payload_is_ignored() {
        assert!(matches!(
            ResultClassifier::classify(&json!({"answer": 42})),
            ToolPayload::Unrecognized
        ));
        assert!(matches!(
            ResultClassifier::classify(&json!("plain text")),
            ToolPayload::Unrecognized
        ));
        assert!(matches!(
            ResultClassifier::classify(&json!([])),
            ToolPayload::Unrecognized
        ));
    }
}
