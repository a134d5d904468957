//! Keyword-based work/personal classification of calendar events.

use serde::{Deserialize, Serialize};

use crate::rules::{ClassificationRule, MatchScope, RuleKind};
use crate::synonyms::SynonymTable;

/// Confidence for title-keyword matches.
pub const TITLE_MATCH_CONFIDENCE: f64 = 0.85;
/// Confidence for calendar-source matches, which are more specific.
pub const SOURCE_MATCH_CONFIDENCE: f64 = 0.90;
/// Confidence when no rule matches. Unclassified events default to work so
/// they surface for human review instead of being silently dropped.
pub const UNCLASSIFIED_CONFIDENCE: f64 = 0.5;

/// A calendar event as seen by the classifier. Externally sourced, immutable
/// input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEventRef {
    pub id: String,
    pub title: String,
    pub calendar_source_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub event_id: String,
    pub is_work: bool,
    pub confidence: f64,
    pub matched_rule_id: Option<String>,
    /// The variation that hit, which may be a synonym of the configured
    /// keyword rather than the keyword itself.
    pub matched_keyword: Option<String>,
}

pub struct EventClassifier {
    synonyms: SynonymTable,
}

impl EventClassifier {
    pub fn new(synonyms: SynonymTable) -> Self {
        EventClassifier { synonyms }
    }

    /// Classify every event against the rules, in rule-list order.
    ///
    /// Pure and total: each event yields exactly one result, independent of
    /// the others, and zero rules simply means every event gets the
    /// unclassified default.
    pub fn classify(
        &self,
        events: &[CalendarEventRef],
        rules: &[ClassificationRule],
    ) -> Vec<ClassificationResult> {
        events
            .iter()
            .map(|event| self.classify_event(event, rules))
            .collect()
    }

    fn classify_event(
        &self,
        event: &CalendarEventRef,
        rules: &[ClassificationRule],
    ) -> ClassificationResult {
        let title = event.title.to_lowercase();
        let source = event.calendar_source_id.to_lowercase();

        for rule in rules.iter().filter(|r| r.enabled) {
            let (haystack, confidence) = match rule.scope {
                MatchScope::Title => (&title, TITLE_MATCH_CONFIDENCE),
                MatchScope::CalendarSource => (&source, SOURCE_MATCH_CONFIDENCE),
            };

            for keyword in &rule.keywords {
                let hit = self
                    .synonyms
                    .expand(keyword)
                    .into_iter()
                    .find(|variation| haystack.contains(variation.as_str()));

                if let Some(variation) = hit {
                    return ClassificationResult {
                        event_id: event.id.clone(),
                        is_work: rule.kind == RuleKind::Work,
                        confidence,
                        matched_rule_id: Some(rule.id.clone()),
                        matched_keyword: Some(variation),
                    };
                }
            }
        }

        ClassificationResult {
            event_id: event.id.clone(),
            is_work: true,
            confidence: UNCLASSIFIED_CONFIDENCE,
            matched_rule_id: None,
            matched_keyword: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::default_rules;

    fn event(id: &str, title: &str) -> CalendarEventRef {
        CalendarEventRef {
            id: id.to_string(),
            title: title.to_string(),
            calendar_source_id: "primary".to_string(),
        }
    }

    fn title_rule(id: &str, kind: RuleKind, keywords: &[&str]) -> ClassificationRule {
        ClassificationRule {
            id: id.to_string(),
            kind,
            scope: MatchScope::Title,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            enabled: true,
        }
    }

    #[test]
    fn test_zero_rules_gives_unclassified_default() {
        let classifier = EventClassifier::new(SynonymTable::empty());
        let events = vec![event("1", "Band practice"), event("2", "Lunch")];

        let results = classifier.classify(&events, &[]);

        assert_eq!(results.len(), 2);
        for result in &results {
            assert!(result.is_work);
            assert_eq!(result.confidence, UNCLASSIFIED_CONFIDENCE);
            assert_eq!(result.matched_rule_id, None);
            assert_eq!(result.matched_keyword, None);
        }
    }

    #[test]
    fn test_classify_is_pure() {
        let classifier = EventClassifier::new(SynonymTable::builtin());
        let events = vec![event("1", "Rehearsal at the studio"), event("2", "Lunch")];
        let rules = default_rules();

        let first = classifier.classify(&events, &rules);
        let second = classifier.classify(&events, &rules);

        assert_eq!(first, second);
    }

    #[test]
    fn test_title_match_is_case_insensitive() {
        let classifier = EventClassifier::new(SynonymTable::empty());
        let rules = vec![title_rule("work", RuleKind::Work, &["rehearsal"])];

        let results = classifier.classify(&[event("1", "REHEARSAL with the band")], &rules);

        assert!(results[0].is_work);
        assert_eq!(results[0].confidence, TITLE_MATCH_CONFIDENCE);
        assert_eq!(results[0].matched_keyword.as_deref(), Some("rehearsal"));
    }

    #[test]
    fn test_rule_order_is_precedence() {
        let classifier = EventClassifier::new(SynonymTable::empty());
        let rules = vec![
            title_rule("first", RuleKind::Personal, &["band"]),
            title_rule("second", RuleKind::Work, &["band"]),
        ];

        let results = classifier.classify(&[event("1", "Band practice")], &rules);

        assert_eq!(results[0].matched_rule_id.as_deref(), Some("first"));
        assert!(!results[0].is_work);
    }

    #[test]
    fn test_disabled_rules_are_skipped() {
        let classifier = EventClassifier::new(SynonymTable::empty());
        let mut disabled = title_rule("disabled", RuleKind::Personal, &["band"]);
        disabled.enabled = false;
        let rules = vec![disabled, title_rule("active", RuleKind::Work, &["band"])];

        let results = classifier.classify(&[event("1", "Band practice")], &rules);

        assert_eq!(results[0].matched_rule_id.as_deref(), Some("active"));
        assert!(results[0].is_work);
    }

    #[test]
    fn test_calendar_source_match_has_higher_confidence() {
        let classifier = EventClassifier::new(SynonymTable::empty());
        let rules = vec![ClassificationRule {
            id: "work-calendar".to_string(),
            kind: RuleKind::Work,
            scope: MatchScope::CalendarSource,
            keywords: vec!["gigs@group.calendar.google.com".to_string()],
            enabled: true,
        }];
        let events = vec![CalendarEventRef {
            id: "1".to_string(),
            title: "Untitled".to_string(),
            calendar_source_id: "GIGS@group.calendar.google.com".to_string(),
        }];

        let results = classifier.classify(&events, &rules);

        assert!(results[0].is_work);
        assert_eq!(results[0].confidence, SOURCE_MATCH_CONFIDENCE);
    }

    #[test]
    fn test_synonym_matches_only_from_keyword_to_variation() {
        let classifier = EventClassifier::new(SynonymTable::builtin());
        // Hebrew keyword matches an English title through the table
        let hebrew_rule = vec![title_rule("personal", RuleKind::Personal, &["שיניים"])];
        let results = classifier.classify(&[event("1", "Dentist appointment")], &hebrew_rule);
        assert!(!results[0].is_work);
        assert_eq!(results[0].matched_keyword.as_deref(), Some("dentist"));

        // The reverse direction is not expanded: "dentist" as a configured
        // keyword does not match a Hebrew title
        let english_rule = vec![title_rule("personal", RuleKind::Personal, &["dentist"])];
        let results = classifier.classify(&[event("2", "תור לשיניים")], &english_rule);
        assert_eq!(results[0].matched_rule_id, None);
        assert_eq!(results[0].confidence, UNCLASSIFIED_CONFIDENCE);
    }

    #[test]
    fn test_default_rules_classify_mixed_language_events() {
        let classifier = EventClassifier::new(SynonymTable::builtin());
        let events = vec![
            event("1", "חזרה עם הלהקה"),
            event("2", "Dentist appointment"),
        ];

        let results = classifier.classify(&events, &default_rules());

        assert!(results[0].is_work);
        assert_eq!(results[0].confidence, TITLE_MATCH_CONFIDENCE);
        assert_eq!(results[0].matched_rule_id.as_deref(), Some("default-work"));
        assert_eq!(results[0].matched_keyword.as_deref(), Some("חזרה"));

        assert!(!results[1].is_work);
        assert_eq!(results[1].confidence, TITLE_MATCH_CONFIDENCE);
        assert_eq!(
            results[1].matched_rule_id.as_deref(),
            Some("default-personal")
        );
        assert_eq!(results[1].matched_keyword.as_deref(), Some("dentist"));
    }

    #[test]
    fn test_unmatched_event_defaults_to_work_for_review() {
        let classifier = EventClassifier::new(SynonymTable::builtin());
        let results = classifier.classify(&[event("1", "Mystery block")], &default_rules());

        assert!(results[0].is_work);
        assert_eq!(results[0].confidence, UNCLASSIFIED_CONFIDENCE);
        assert_eq!(results[0].matched_rule_id, None);
    }
}
