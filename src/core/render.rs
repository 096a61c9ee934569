//! Narrative renderer: lays the linear path out as a markdown document.
//!
//! Rendering is pure. The same input and graph always give the same text,
//! and a reference that resolves to nothing (an unknown character id or
//! branch id) drops that line instead of failing.

use tracing::debug;

use crate::core::pipeline::StoryInput;
use crate::core::template::{Bindings, TemplateSet};
use crate::schema::character::Character;
use crate::schema::story::{StoryGraph, StoryNode};

pub struct Renderer<'a> {
    templates: &'a TemplateSet,
}

impl<'a> Renderer<'a> {
    pub fn new(templates: &'a TemplateSet) -> Self {
        Self { templates }
    }

    /// The document title: the first plot's title, or a default.
    pub fn title(&self, input: &StoryInput<'_>) -> String {
        let bindings = Bindings::new().with("plot", input.plot().map(|p| p.title.as_str()));
        self.templates.title.expand(&bindings)
    }

    pub fn render(&self, input: &StoryInput<'_>, graph: &StoryGraph) -> String {
        let setting = input.setting();
        let protagonist = input.protagonist();
        let bindings = Bindings::new()
            .with("setting", setting.map(|s| s.name.as_str()))
            .with("description", setting.map(|s| s.description.as_str()))
            .with("protagonist", protagonist.map(|c| c.name.as_str()))
            .with("genre", input.genre.map(|g| g.as_str()))
            .with("plot", input.plot().map(|p| p.title.as_str()));

        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.templates.title.expand(&bindings)));
        out.push_str(&format!("*{}*\n\n", self.templates.subtitle.expand(&bindings)));

        out.push_str("## Introduction\n\n");
        if setting.is_some() {
            out.push_str(&self.templates.setting_intro.expand(&bindings));
            out.push_str("\n\n");
        }

        out.push_str("## Characters\n\n");
        for character in input.characters {
            render_character(&mut out, character);
        }

        out.push_str("## The Story\n\n");
        for node in graph.linear_path() {
            render_node(&mut out, node, input, graph);
        }

        out.push_str("## Conclusion\n\n");
        out.push_str(&self.templates.conclusion.expand(&bindings));
        out.push_str("\n\n");

        out
    }
}

fn render_character(out: &mut String, character: &Character) {
    out.push_str(&format!("**{}** - {}\n\n", character.name, character.background));
    if !character.traits.is_empty() {
        let traits: Vec<&str> = character.trait_names().collect();
        out.push_str(&format!("*Traits:* {}\n\n", traits.join(", ")));
    }
    if !character.goals.is_empty() {
        let goals: Vec<&str> = character.goal_descriptions().collect();
        out.push_str(&format!("*Goals:* {}\n\n", goals.join(", ")));
    }
}

fn render_node(out: &mut String, node: &StoryNode, input: &StoryInput<'_>, graph: &StoryGraph) {
    out.push_str(&format!("### {}\n\n{}\n\n", node.title, node.content));

    for id in &node.characters {
        if input.character(*id).is_none() {
            debug!(node = %node.title, character_id = %id, "skipping unknown character");
        }
    }
    // Roster order, not the node's own order.
    let present: Vec<&str> = input
        .characters
        .iter()
        .filter(|c| node.characters.contains(&c.id))
        .map(|c| c.name.as_str())
        .collect();
    if !present.is_empty() {
        out.push_str(&format!("*Present:* {}\n\n", present.join(", ")));
    }

    if let Some(choices) = node.choices.as_deref().filter(|c| !c.is_empty()) {
        out.push_str("*Choices:*\n\n");
        for id in choices {
            match graph.branch(*id) {
                Some(branch) => out.push_str(&format!("- {}\n", branch.description)),
                None => debug!(node = %node.title, branch_id = %id, "skipping unknown choice"),
            }
        }
        out.push('\n');
    }
}
