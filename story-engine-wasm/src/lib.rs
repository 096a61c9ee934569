//! WASM bindings for story-engine: JSON in, JSON out, for a browser UI.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use story_engine::core::pipeline::{GenerationError, StoryEngine, StoryInput};
use story_engine::core::validation::validate;
use story_engine::schema::character::ARCHETYPES;
use story_engine::schema::genre::Genre;
use story_engine::schema::options::GenerationOptions;
use story_engine::schema::plot::{BeatType, PlotArc};
use story_engine::state::snapshot::{export_json, import_json};
use story_engine::state::StoryState;

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(Serialize)]
struct ImportInfo<'a> {
    applied: &'a [&'static str],
    ignored: &'a [String],
}

#[derive(Serialize)]
struct Labelled {
    id: &'static str,
    name: String,
    description: &'static str,
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&format!("Serialization error: {e}")))
}

// ---------------------------------------------------------------------------
// StoryWorkbench: one authoring session
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct StoryWorkbench {
    engine: StoryEngine,
    state: StoryState,
    seed: u64,
}

#[wasm_bindgen]
impl StoryWorkbench {
    /// Start an empty session whose generations are seeded from `seed`.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Result<StoryWorkbench, JsError> {
        let engine = StoryEngine::builder()
            .seed(seed)
            .build()
            .map_err(|e| JsError::new(&format!("Engine build error: {e}")))?;
        Ok(StoryWorkbench {
            engine,
            state: StoryState::new(),
            seed,
        })
    }

    /// Merge an exported state into the session. Returns
    /// `{"applied": [...], "ignored": [...]}`. On error the session is
    /// unchanged.
    pub fn import_state(&mut self, json: &str) -> Result<String, JsError> {
        let report = import_json(&mut self.state, json)
            .map_err(|e| JsError::new(&format!("Failed to import story: {e}")))?;
        to_json(&ImportInfo {
            applied: &report.applied,
            ignored: &report.ignored,
        })
    }

    pub fn export_state(&self) -> Result<String, JsError> {
        export_json(&self.state).map_err(|e| JsError::new(&format!("Export error: {e}")))
    }

    /// Replace the generation options with a JSON options object. Keys
    /// left out take their defaults. The seeded sequence carries on.
    pub fn set_options(&mut self, options_json: &str) -> Result<(), JsError> {
        let options: GenerationOptions = serde_json::from_str(options_json)
            .map_err(|e| JsError::new(&format!("Invalid options JSON: {e}")))?;
        self.engine.set_options(options);
        Ok(())
    }

    /// JSON array of blocking issue messages; empty when ready.
    pub fn validate(&self) -> Result<String, JsError> {
        let messages: Vec<&str> = validate(&StoryInput::from(&self.state))
            .iter()
            .map(|issue| issue.message())
            .collect();
        to_json(&messages)
    }

    /// Generate, store the result in the session and return it as JSON
    /// (`title`, `genre`, `nodes`, `branches`, `text`).
    pub fn generate(&mut self) -> Result<String, JsError> {
        let story = match self.engine.generate(&self.state) {
            Ok(story) => story,
            Err(GenerationError::Invalid(issues)) => {
                let messages: Vec<&str> = issues.iter().map(|i| i.message()).collect();
                return Err(JsError::new(&messages.join("\n")));
            }
        };
        self.state.apply_generated(&story);
        to_json(&story)
    }

    pub fn nodes(&self) -> Result<String, JsError> {
        to_json(&self.state.nodes)
    }

    pub fn branches(&self) -> Result<String, JsError> {
        to_json(&self.state.branches)
    }

    /// The canonical reading order as a JSON array of node ids.
    pub fn linear_path(&self) -> Result<String, JsError> {
        let graph = self.state.graph();
        let ids: Vec<String> = graph.linear_path().iter().map(|n| n.id.to_string()).collect();
        to_json(&ids)
    }

    pub fn story_text(&self) -> Option<String> {
        self.state.generated_story.clone()
    }

    pub fn summary(&self) -> Result<String, JsError> {
        to_json(&self.state.summary())
    }

    /// Discard everything and start over with the same seed.
    pub fn reset(&mut self) -> Result<(), JsError> {
        *self = StoryWorkbench::new(self.seed)?;
        Ok(())
    }

    /// Return JSON array of genre identifiers.
    pub fn genres() -> String {
        let names: Vec<&str> = Genre::ALL.iter().map(|g| g.as_str()).collect();
        serde_json::to_string(&names).unwrap_or_else(|_| "[]".to_string())
    }

    /// Return JSON array of `{id, name, description}` plot arcs.
    pub fn plot_arcs() -> String {
        let arcs: Vec<Labelled> = PlotArc::ALL
            .iter()
            .map(|arc| Labelled {
                id: arc.as_str(),
                name: arc.name().to_string(),
                description: arc.description(),
            })
            .collect();
        serde_json::to_string(&arcs).unwrap_or_else(|_| "[]".to_string())
    }

    /// Return JSON array of `{id, name, description}` beat types.
    pub fn beat_types() -> String {
        let beats: Vec<Labelled> = BeatType::ALL
            .iter()
            .map(|beat| Labelled {
                id: beat.as_str(),
                name: beat.label(),
                description: beat.description(),
            })
            .collect();
        serde_json::to_string(&beats).unwrap_or_else(|_| "[]".to_string())
    }

    /// Return JSON array of suggested archetype labels.
    pub fn archetypes() -> String {
        serde_json::to_string(ARCHETYPES).unwrap_or_else(|_| "[]".to_string())
    }
}
