//! The authoring session's state, owned by the caller.
//!
//! A `StoryState` is built at session start, edited through the methods
//! below, handed to the engine by reference and replaced wholesale on
//! reset. Nothing in the crate keeps a global copy.

pub mod snapshot;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::pipeline::GeneratedStory;
use crate::schema::character::{find_character, find_protagonist, Character, Role};
use crate::schema::event::StoryEvent;
use crate::schema::genre::{Genre, StoryTheme};
use crate::schema::id::{CharacterId, PlotId, ThemeId};
use crate::schema::plot::Plot;
use crate::schema::setting::Setting;
use crate::schema::story::{StoryBranch, StoryGraph, StoryNode};

/// The authoring workflow step the UI is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrentStep {
    #[default]
    Characters,
    World,
    Plot,
    Generate,
    View,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryState {
    pub characters: Vec<Character>,
    pub plots: Vec<Plot>,
    pub settings: Vec<Setting>,
    pub themes: Vec<StoryTheme>,
    pub nodes: Vec<StoryNode>,
    pub branches: Vec<StoryBranch>,
    pub events: Vec<StoryEvent>,
    pub active_genre: Option<Genre>,
    pub generated_story: Option<String>,
    pub current_step: CurrentStep,
}

impl StoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_character(&mut self, character: Character) {
        self.characters.push(character);
    }

    /// Edit a character in place. Returns `false` if no character has `id`.
    pub fn update_character(&mut self, id: CharacterId, edit: impl FnOnce(&mut Character)) -> bool {
        match self.characters.iter_mut().find(|c| c.id == id) {
            Some(character) => {
                edit(character);
                true
            }
            None => false,
        }
    }

    /// Remove a character. Relationships, focus lists and node casts that
    /// name it are left alone; lookups on them simply miss from now on.
    pub fn remove_character(&mut self, id: CharacterId) -> Option<Character> {
        let index = self.characters.iter().position(|c| c.id == id)?;
        Some(self.characters.remove(index))
    }

    pub fn add_plot(&mut self, plot: Plot) {
        self.plots.push(plot);
    }

    pub fn update_plot(&mut self, id: PlotId, edit: impl FnOnce(&mut Plot)) -> bool {
        match self.plots.iter_mut().find(|p| p.id == id) {
            Some(plot) => {
                edit(plot);
                true
            }
            None => false,
        }
    }

    pub fn remove_plot(&mut self, id: PlotId) -> Option<Plot> {
        let index = self.plots.iter().position(|p| p.id == id)?;
        Some(self.plots.remove(index))
    }

    /// Append a setting. Only the first one is used by the engine.
    pub fn add_setting(&mut self, setting: Setting) {
        self.settings.push(setting);
    }

    pub fn add_theme(&mut self, theme: StoryTheme) {
        self.themes.push(theme);
    }

    pub fn remove_theme(&mut self, id: ThemeId) -> Option<StoryTheme> {
        let index = self.themes.iter().position(|t| t.id == id)?;
        Some(self.themes.remove(index))
    }

    pub fn add_event(&mut self, event: StoryEvent) {
        self.events.push(event);
    }

    pub fn set_genre(&mut self, genre: Genre) {
        self.active_genre = Some(genre);
    }

    pub fn set_step(&mut self, step: CurrentStep) {
        self.current_step = step;
    }

    pub fn add_node(&mut self, node: StoryNode) {
        self.nodes.push(node);
    }

    pub fn add_branch(&mut self, branch: StoryBranch) {
        self.branches.push(branch);
    }

    pub fn set_generated_story(&mut self, text: impl Into<String>) {
        self.generated_story = Some(text.into());
    }

    /// Store a finished generation: its graph replaces the current one and
    /// the workflow moves on to viewing.
    pub fn apply_generated(&mut self, story: &GeneratedStory) {
        self.nodes = story.graph.nodes.clone();
        self.branches = story.graph.branches.clone();
        self.generated_story = Some(story.text.clone());
        self.current_step = CurrentStep::View;
    }

    /// Back to an empty session.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        find_character(&self.characters, id)
    }

    pub fn protagonist(&self) -> Option<&Character> {
        find_protagonist(&self.characters)
    }

    pub fn antagonist(&self) -> Option<&Character> {
        self.characters.iter().find(|c| c.role == Role::Antagonist)
    }

    pub fn active_setting(&self) -> Option<&Setting> {
        self.settings.first()
    }

    /// The stored graph, copied out of the node and branch lists.
    pub fn graph(&self) -> StoryGraph {
        StoryGraph {
            nodes: self.nodes.clone(),
            branches: self.branches.clone(),
        }
    }

    pub fn summary(&self) -> StorySummary {
        StorySummary {
            genre: self.active_genre,
            setting: self.active_setting().map(|s| s.name.clone()),
            main_plot: self.plots.first().map(|p| p.title.clone()),
            protagonist: self.protagonist().map(|c| c.name.clone()),
            antagonist: self.antagonist().map(|c| c.name.clone()),
            character_count: self.characters.len(),
            plot_points: self.plots.iter().map(|p| p.beats.len()).sum(),
        }
    }
}

/// An at-a-glance view of what has been authored so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorySummary {
    pub genre: Option<Genre>,
    pub setting: Option<String>,
    pub main_plot: Option<String>,
    pub protagonist: Option<String>,
    pub antagonist: Option<String>,
    pub character_count: usize,
    pub plot_points: usize,
}

impl fmt::Display for StorySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let or_none = |v: &Option<String>| v.clone().unwrap_or_else(|| "None".to_string());
        match self.genre {
            Some(genre) => writeln!(f, "Genre: {genre}")?,
            None => writeln!(f, "Genre: Not selected")?,
        }
        writeln!(f, "Setting: {}", or_none(&self.setting))?;
        writeln!(f, "Main Plot: {}", or_none(&self.main_plot))?;
        writeln!(f, "Protagonist: {}", or_none(&self.protagonist))?;
        writeln!(f, "Antagonist: {}", or_none(&self.antagonist))?;
        writeln!(f, "Characters: {}", self.character_count)?;
        write!(f, "Plot Points: {}", self.plot_points)
    }
}
