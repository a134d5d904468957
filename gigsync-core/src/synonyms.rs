//! Keyword synonym expansion.
//!
//! A rule keyword in the user's language should also match event titles
//! written in another. The table maps a canonical keyword to its known
//! variations and is injected into the classifier as read-only configuration.
//! Expansion is one-directional: keyword to variations, never the reverse.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynonymTable {
    variations: HashMap<String, Vec<String>>,
}

impl SynonymTable {
    /// Build a table from canonical keyword to variations. Keys and values
    /// are lower-cased so matching stays case-insensitive.
    pub fn new(variations: HashMap<String, Vec<String>>) -> Self {
        let variations = variations
            .into_iter()
            .map(|(keyword, words)| {
                (
                    keyword.to_lowercase(),
                    words.into_iter().map(|w| w.to_lowercase()).collect(),
                )
            })
            .collect();
        SynonymTable { variations }
    }

    pub fn empty() -> Self {
        SynonymTable::default()
    }

    /// The keyword itself plus its registered variations, lower-cased.
    pub fn expand(&self, keyword: &str) -> Vec<String> {
        let keyword = keyword.to_lowercase();
        let mut expanded = vec![keyword.clone()];
        if let Some(words) = self.variations.get(&keyword) {
            expanded.extend(words.iter().cloned());
        }
        expanded
    }

    /// The built-in Hebrew-to-English table backing the default rules.
    pub fn builtin() -> Self {
        let pairs: &[(&str, &[&str])] = &[
            // Work
            ("חזרה", &["rehearsal"]),
            ("הופעה", &["gig", "show"]),
            ("הקלטה", &["recording"]),
            ("אולפן", &["studio"]),
            ("שיעור", &["lesson", "class"]),
            ("קונצרט", &["concert"]),
            ("צילום", &["shoot", "photoshoot", "filming"]),
            ("עריכה", &["editing"]),
            // Personal
            ("רופא", &["doctor", "clinic"]),
            ("שיניים", &["dentist", "dental"]),
            ("חופשה", &["vacation", "holiday"]),
            ("יום הולדת", &["birthday"]),
            ("משפחה", &["family"]),
            ("חתונה", &["wedding"]),
            ("כושר", &["gym", "workout"]),
            ("טיול", &["trip", "hike"]),
            ("תספורת", &["haircut", "barber"]),
        ];

        let variations = pairs
            .iter()
            .map(|(keyword, words)| {
                (
                    keyword.to_string(),
                    words.iter().map(|w| w.to_string()).collect(),
                )
            })
            .collect();

        SynonymTable::new(variations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_includes_keyword_itself() {
        let table = SynonymTable::empty();
        assert_eq!(table.expand("rehearsal"), vec!["rehearsal"]);
    }

    #[test]
    fn test_expand_lowercases_keyword() {
        let table = SynonymTable::builtin();
        let expanded = table.expand("שיניים");
        assert!(expanded.contains(&"dentist".to_string()));
        assert!(expanded.contains(&"שיניים".to_string()));
    }

    #[test]
    fn test_expansion_is_one_directional() {
        let table = SynonymTable::builtin();
        // "dentist" is a variation, not a canonical keyword
        assert_eq!(table.expand("dentist"), vec!["dentist"]);
    }

    #[test]
    fn test_custom_table_normalizes_case() {
        let mut variations = HashMap::new();
        variations.insert("Meeting".to_string(), vec!["Standup".to_string()]);
        let table = SynonymTable::new(variations);
        assert_eq!(table.expand("MEETING"), vec!["meeting", "standup"]);
    }
}
