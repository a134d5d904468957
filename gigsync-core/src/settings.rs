//! Versioned sync configuration.
//!
//! Named, optional, validated fields instead of a free-form settings blob:
//! unknown shapes are rejected at the boundary, not discovered mid-sync.

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::import::WORK_CONFIDENCE_THRESHOLD;
use crate::rules::{ClassificationRule, default_rules};

pub const SETTINGS_VERSION: u32 = 1;

const DEFAULT_SYNC_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Empty means "use the built-in default rules".
    #[serde(default)]
    pub rules: Vec<ClassificationRule>,

    /// Minimum classification confidence for an event to become an income
    /// draft.
    #[serde(default = "default_threshold")]
    pub confidence_threshold: f64,

    /// Days to look around today when fetching events.
    #[serde(default = "default_sync_window_days")]
    pub sync_window_days: i64,

    /// Calendars to fetch from.
    #[serde(default = "default_calendar_ids")]
    pub calendar_ids: Vec<String>,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

fn default_threshold() -> f64 {
    WORK_CONFIDENCE_THRESHOLD
}

fn default_sync_window_days() -> i64 {
    DEFAULT_SYNC_WINDOW_DAYS
}

fn default_calendar_ids() -> Vec<String> {
    vec!["primary".to_string()]
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            version: default_version(),
            rules: Vec::new(),
            confidence_threshold: default_threshold(),
            sync_window_days: default_sync_window_days(),
            calendar_ids: default_calendar_ids(),
        }
    }
}

impl SyncSettings {
    /// The rules classification will run with: the user's, or the built-in
    /// defaults when none are configured.
    pub fn effective_rules(&self) -> Vec<ClassificationRule> {
        if self.rules.is_empty() {
            default_rules()
        } else {
            self.rules.clone()
        }
    }

    /// Boundary validation, to be called right after deserializing.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.version != SETTINGS_VERSION {
            return Err(SettingsError::UnsupportedVersion {
                found: self.version,
                expected: SETTINGS_VERSION,
            });
        }

        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(SettingsError::InvalidThreshold(self.confidence_threshold));
        }

        if self.sync_window_days <= 0 {
            return Err(SettingsError::InvalidSyncWindow(self.sync_window_days));
        }

        let mut seen = std::collections::HashSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(SettingsError::DuplicateRuleId(rule.id.clone()));
            }
            if rule.enabled && rule.keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(SettingsError::EmptyKeywords(rule.id.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{MatchScope, RuleKind};

    fn rule(id: &str, keywords: &[&str]) -> ClassificationRule {
        ClassificationRule {
            id: id.to_string(),
            kind: RuleKind::Work,
            scope: MatchScope::Title,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            enabled: true,
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let settings = SyncSettings::default();
        settings.validate().unwrap();
        assert_eq!(settings.version, SETTINGS_VERSION);
        assert_eq!(settings.calendar_ids, vec!["primary"]);
    }

    #[test]
    fn test_empty_file_deserializes_to_defaults() {
        let settings: SyncSettings = toml::from_str("").unwrap();
        assert_eq!(settings, SyncSettings::default());
    }

    #[test]
    fn test_effective_rules_fall_back_to_defaults() {
        let settings = SyncSettings::default();
        assert_eq!(settings.effective_rules(), default_rules());

        let configured = SyncSettings {
            rules: vec![rule("mine", &["band"])],
            ..SyncSettings::default()
        };
        assert_eq!(configured.effective_rules().len(), 1);
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let settings = SyncSettings {
            version: 99,
            ..SyncSettings::default()
        };
        assert!(matches!(
            settings.validate().unwrap_err(),
            SettingsError::UnsupportedVersion { found: 99, .. }
        ));
    }

    #[test]
    fn test_threshold_out_of_range_is_rejected() {
        let settings = SyncSettings {
            confidence_threshold: 1.5,
            ..SyncSettings::default()
        };
        assert!(matches!(
            settings.validate().unwrap_err(),
            SettingsError::InvalidThreshold(_)
        ));
    }

    #[test]
    fn test_enabled_rule_without_keywords_is_rejected() {
        let settings = SyncSettings {
            rules: vec![rule("empty", &[])],
            ..SyncSettings::default()
        };
        assert!(matches!(
            settings.validate().unwrap_err(),
            SettingsError::EmptyKeywords(_)
        ));
    }

    #[test]
    fn test_disabled_rule_without_keywords_is_allowed() {
        let mut empty = rule("empty", &[]);
        empty.enabled = false;
        let settings = SyncSettings {
            rules: vec![empty],
            ..SyncSettings::default()
        };
        settings.validate().unwrap();
    }

    #[test]
    fn test_duplicate_rule_ids_are_rejected() {
        let settings = SyncSettings {
            rules: vec![rule("dup", &["a"]), rule("dup", &["b"])],
            ..SyncSettings::default()
        };
        assert!(matches!(
            settings.validate().unwrap_err(),
            SettingsError::DuplicateRuleId(_)
        ));
    }
}
