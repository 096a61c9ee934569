use serde::{Deserialize, Serialize};

use super::character::Level;
use super::id::CharacterId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryLength {
    Short,
    #[default]
    Medium,
    Long,
}

/// Knobs chosen by the author before generating.
///
/// Only `include_choices` changes the graph's shape. `character_focus`
/// pins the listed characters into every beat's cast; the remaining
/// options are carried through for callers and logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationOptions {
    pub complexity: Level,
    pub include_choices: bool,
    pub tonal_consistency: Level,
    pub character_focus: Vec<CharacterId>,
    pub length: StoryLength,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            complexity: Level::Medium,
            include_choices: true,
            tonal_consistency: Level::High,
            character_focus: Vec::new(),
            length: StoryLength::Medium,
        }
    }
}

impl GenerationOptions {
    /// Parse options from RON. Keys left out keep their defaults.
    pub fn parse_ron(input: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(input)
    }

    pub fn with_choices(mut self, include_choices: bool) -> Self {
        self.include_choices = include_choices;
        self
    }

    /// Add a character to the focus list, ignoring duplicates.
    pub fn focus_on(mut self, id: CharacterId) -> Self {
        if !self.character_focus.contains(&id) {
            self.character_focus.push(id);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_authoring_ui() {
        let o = GenerationOptions::default();
        assert_eq!(o.complexity, Level::Medium);
        assert!(o.include_choices);
        assert_eq!(o.tonal_consistency, Level::High);
        assert!(o.character_focus.is_empty());
        assert_eq!(o.length, StoryLength::Medium);
    }

    #[test]
    fn partial_ron_keeps_defaults() {
        let o = GenerationOptions::parse_ron("(includeChoices: false, length: long)").unwrap();
        assert!(!o.include_choices);
        assert_eq!(o.length, StoryLength::Long);
        assert_eq!(o.tonal_consistency, Level::High);
    }

    #[test]
    fn json_keys_are_camel_case() {
        let json = serde_json::to_value(GenerationOptions::default()).unwrap();
        assert_eq!(json["includeChoices"], true);
        assert_eq!(json["tonalConsistency"], "high");
        assert!(json["characterFocus"].as_array().unwrap().is_empty());
    }

    #[test]
    fn focus_on_dedupes() {
        let id = CharacterId::new_v4();
        let o = GenerationOptions::default().focus_on(id).focus_on(id);
        assert_eq!(o.character_focus, vec![id]);
    }
}
