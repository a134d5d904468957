//! Selection and dedup of classified events for income import.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::{CalendarEventRef, ClassificationResult};

/// Downstream import keeps events at or above this confidence: both match
/// tiers qualify, the unclassified default does not.
pub const WORK_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// A classified event that qualifies for import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportCandidate {
    pub event_id: String,
    pub title: String,
    pub calendar_source_id: String,
    pub confidence: f64,
    pub matched_rule_id: Option<String>,
}

/// Keep work-labelled results at or above `threshold`, paired with their
/// event refs. Results without a matching event are dropped.
pub fn select_candidates(
    events: &[CalendarEventRef],
    results: &[ClassificationResult],
    threshold: f64,
) -> Vec<ImportCandidate> {
    results
        .iter()
        .filter(|result| result.is_work && result.confidence >= threshold)
        .filter_map(|result| {
            let event = events.iter().find(|e| e.id == result.event_id)?;
            Some(ImportCandidate {
                event_id: event.id.clone(),
                title: event.title.clone(),
                calendar_source_id: event.calendar_source_id.clone(),
                confidence: result.confidence,
                matched_rule_id: result.matched_rule_id.clone(),
            })
        })
        .collect()
}

/// A draft income entry. The `(account, event_id)` pair is the dedup key and
/// the only persisted trace of the event's calendar origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeDraft {
    pub account: String,
    pub event_id: String,
    pub title: String,
    pub occurred_at: Option<DateTime<Utc>>,
    pub imported_at: DateTime<Utc>,
}

/// Storage key for a draft.
pub fn draft_key(account: &str, event_id: &str) -> String {
    format!("{}/{}", account, event_id)
}

/// Insert-if-absent filter: drop drafts whose key is already stored.
pub fn dedup_new(existing: &HashSet<String>, drafts: Vec<IncomeDraft>) -> Vec<IncomeDraft> {
    drafts
        .into_iter()
        .filter(|draft| !existing.contains(&draft_key(&draft.account, &draft.event_id)))
        .collect()
}
