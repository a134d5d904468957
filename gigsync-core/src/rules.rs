//! User-editable classification rules.

use serde::{Deserialize, Serialize};

/// Whether a matching event counts as paid work or personal time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Work,
    Personal,
}

/// Which event field a rule's keywords are matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchScope {
    Title,
    CalendarSource,
}

/// One keyword rule. List order is precedence: the first enabled rule whose
/// keyword set matches wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub id: String,
    pub kind: RuleKind,
    pub scope: MatchScope,
    /// Matched case-insensitively as substrings, after synonym expansion.
    pub keywords: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

fn keywords(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Built-in rules, used when the user has none configured.
///
/// Keywords are Hebrew; the built-in synonym table lets them match English
/// event titles too.
pub fn default_rules() -> Vec<ClassificationRule> {
    vec![
        ClassificationRule {
            id: "default-work".to_string(),
            kind: RuleKind::Work,
            scope: MatchScope::Title,
            keywords: keywords(&[
                "חזרה",   // rehearsal
                "הופעה",  // gig
                "הקלטה",  // recording
                "אולפן",  // studio
                "שיעור",  // lesson
                "קונצרט", // concert
                "צילום",  // shoot
                "עריכה",  // editing
            ]),
            enabled: true,
        },
        ClassificationRule {
            id: "default-personal".to_string(),
            kind: RuleKind::Personal,
            scope: MatchScope::Title,
            keywords: keywords(&[
                "רופא",      // doctor
                "שיניים",    // dentist
                "חופשה",     // vacation
                "יום הולדת", // birthday
                "משפחה",     // family
                "חתונה",     // wedding
                "כושר",      // gym
                "טיול",      // trip
                "תספורת",    // haircut
            ]),
            enabled: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_work_then_personal() {
        let rules = default_rules();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].kind, RuleKind::Work);
        assert_eq!(rules[0].keywords.len(), 8);
        assert_eq!(rules[1].kind, RuleKind::Personal);
        assert_eq!(rules[1].keywords.len(), 9);
        assert!(rules.iter().all(|r| r.enabled));
    }

    #[test]
    fn test_enabled_defaults_to_true_when_omitted() {
        let toml = r#"
            id = "my-rule"
            kind = "work"
            scope = "calendar_source"
            keywords = ["band"]
        "#;
        let rule: ClassificationRule = toml::from_str(toml).unwrap();
        assert!(rule.enabled);
        assert_eq!(rule.scope, MatchScope::CalendarSource);
    }
}
