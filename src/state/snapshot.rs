//! Export and import of a whole `StoryState`.
//!
//! Import is a patch, not a replacement: every recognized top-level key
//! overwrites its field, unknown keys are skipped, and fields the input
//! does not mention keep their current value. A malformed recognized
//! field fails the import before anything is written.

use ron::ser::PrettyConfig;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::{debug, info};

use super::{CurrentStep, StoryState};
use crate::schema::character::Character;
use crate::schema::event::StoryEvent;
use crate::schema::genre::{Genre, StoryTheme};
use crate::schema::plot::Plot;
use crate::schema::setting::Setting;
use crate::schema::story::{StoryBranch, StoryNode};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("story JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("story RON is malformed: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("could not write story RON: {0}")]
    RonWrite(#[from] ron::Error),
    #[error("expected a story object at the top level")]
    NotAnObject,
}

/// Top-level keys of an exported state.
pub const STATE_KEYS: &[&str] = &[
    "characters",
    "plots",
    "settings",
    "themes",
    "nodes",
    "branches",
    "events",
    "activeGenre",
    "generatedStory",
    "currentStep",
];

/// What an import did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Recognized keys that replaced a field, in `STATE_KEYS` order.
    pub applied: Vec<&'static str>,
    /// Keys that were skipped. Only itemized for JSON input.
    pub ignored: Vec<String>,
}

// A present key deserializes to `Some`, even when its value is null.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatePatch {
    #[serde(default, deserialize_with = "present")]
    characters: Option<Vec<Character>>,
    #[serde(default, deserialize_with = "present")]
    plots: Option<Vec<Plot>>,
    #[serde(default, deserialize_with = "present")]
    settings: Option<Vec<Setting>>,
    #[serde(default, deserialize_with = "present")]
    themes: Option<Vec<StoryTheme>>,
    #[serde(default, deserialize_with = "present")]
    nodes: Option<Vec<StoryNode>>,
    #[serde(default, deserialize_with = "present")]
    branches: Option<Vec<StoryBranch>>,
    #[serde(default, deserialize_with = "present")]
    events: Option<Vec<StoryEvent>>,
    #[serde(default, deserialize_with = "present")]
    active_genre: Option<Option<Genre>>,
    #[serde(default, deserialize_with = "present")]
    generated_story: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    current_step: Option<CurrentStep>,
}

fn replace<T>(
    target: &mut T,
    value: Option<T>,
    key: &'static str,
    applied: &mut Vec<&'static str>,
) {
    if let Some(value) = value {
        *target = value;
        applied.push(key);
    }
}

impl StatePatch {
    fn apply(self, state: &mut StoryState) -> Vec<&'static str> {
        let mut applied = Vec::new();
        replace(&mut state.characters, self.characters, "characters", &mut applied);
        replace(&mut state.plots, self.plots, "plots", &mut applied);
        replace(&mut state.settings, self.settings, "settings", &mut applied);
        replace(&mut state.themes, self.themes, "themes", &mut applied);
        replace(&mut state.nodes, self.nodes, "nodes", &mut applied);
        replace(&mut state.branches, self.branches, "branches", &mut applied);
        replace(&mut state.events, self.events, "events", &mut applied);
        replace(&mut state.active_genre, self.active_genre, "activeGenre", &mut applied);
        replace(
            &mut state.generated_story,
            self.generated_story,
            "generatedStory",
            &mut applied,
        );
        replace(&mut state.current_step, self.current_step, "currentStep", &mut applied);
        applied
    }
}

pub fn export_json(state: &StoryState) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string_pretty(state)?)
}

pub fn import_json(state: &mut StoryState, input: &str) -> Result<ImportReport, SnapshotError> {
    let value: serde_json::Value = serde_json::from_str(input)?;
    let serde_json::Value::Object(map) = value else {
        return Err(SnapshotError::NotAnObject);
    };

    let ignored: Vec<String> = map
        .keys()
        .filter(|key| !STATE_KEYS.contains(&key.as_str()))
        .cloned()
        .collect();
    for key in &ignored {
        debug!(key = %key, "ignoring unknown key on import");
    }

    let patch: StatePatch = serde_json::from_value(serde_json::Value::Object(map))?;
    let applied = patch.apply(state);
    info!(applied = applied.len(), ignored = ignored.len(), "imported story JSON");
    Ok(ImportReport { applied, ignored })
}

pub fn export_ron(state: &StoryState) -> Result<String, SnapshotError> {
    Ok(ron::ser::to_string_pretty(state, PrettyConfig::default())?)
}

/// Import a RON snapshot. Unknown fields are skipped without being listed.
pub fn import_ron(state: &mut StoryState, input: &str) -> Result<ImportReport, SnapshotError> {
    let patch: StatePatch = ron::from_str(input)?;
    let applied = patch.apply(state);
    info!(applied = applied.len(), "imported story RON");
    Ok(ImportReport {
        applied,
        ignored: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::character::Role;
    use crate::schema::plot::{BeatType, PlotArc};

    fn sample_state() -> StoryState {
        let mut state = StoryState::new();
        state.add_character(Character::new("Mira", Role::Protagonist));
        state.add_setting(Setting::new("Ironhaven", "Forges"));
        state.add_plot(
            Plot::new("The Siege", PlotArc::Tragedy).with_beat(BeatType::Climax, "The gate falls"),
        );
        state.set_genre(Genre::Mystery);
        state
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let json = export_json(&sample_state()).unwrap();
        assert!(json.contains("\"activeGenre\": \"mystery\""));
        assert!(json.contains("\"generatedStory\": null"));
        assert!(json.contains("\"currentStep\": \"characters\""));
        assert!(json.contains("\"type\": \"climax\""));
    }

    #[test]
    fn json_round_trip() {
        let state = sample_state();
        let json = export_json(&state).unwrap();
        let mut restored = StoryState::new();
        let report = import_json(&mut restored, &json).unwrap();
        assert_eq!(restored, state);
        assert_eq!(report.applied, STATE_KEYS.to_vec());
        assert!(report.ignored.is_empty());
    }

    #[test]
    fn missing_keys_keep_values_and_unknown_are_reported() {
        let mut state = sample_state();
        let report = import_json(&mut state, r#"{"activeGenre": "horror", "layout": {}}"#).unwrap();
        assert_eq!(state.active_genre, Some(Genre::Horror));
        assert_eq!(state.characters.len(), 1);
        assert_eq!(report.applied, vec!["activeGenre"]);
        assert_eq!(report.ignored, vec!["layout".to_string()]);
    }

    #[test]
    fn null_clears_optional_fields() {
        let mut state = sample_state();
        import_json(&mut state, r#"{"activeGenre": null}"#).unwrap();
        assert_eq!(state.active_genre, None);
    }

    #[test]
    fn malformed_field_leaves_state_untouched() {
        let mut state = sample_state();
        let before = state.clone();
        let err = import_json(
            &mut state,
            r#"{"activeGenre": "horror", "characters": [{"name": 3}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SnapshotError::Json(_)));
        assert_eq!(state, before);
    }

    #[test]
    fn non_object_is_rejected() {
        let mut state = sample_state();
        let err = import_json(&mut state, "[1, 2, 3]").unwrap_err();
        assert!(matches!(err, SnapshotError::NotAnObject));
        assert!(import_json(&mut state, "not json").is_err());
    }

    #[test]
    fn ron_round_trip() {
        let state = sample_state();
        let ron_text = export_ron(&state).unwrap();
        let mut restored = StoryState::new();
        let report = import_ron(&mut restored, &ron_text).unwrap();
        assert_eq!(restored, state);
        assert_eq!(report.applied.len(), STATE_KEYS.len());
    }

    #[test]
    fn ron_partial_import() {
        let mut state = sample_state();
        let report = import_ron(
            &mut state,
            r##"(currentStep: plot, generatedStory: Some("# Draft"))"##,
        )
        .unwrap();
        assert_eq!(state.current_step, CurrentStep::Plot);
        assert_eq!(state.generated_story.as_deref(), Some("# Draft"));
        assert_eq!(report.applied, vec!["generatedStory", "currentStep"]);
        assert_eq!(state.characters.len(), 1);
    }
}
