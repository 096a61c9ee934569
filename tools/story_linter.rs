//! story_linter: check a saved story state for problems.
//!
//! Validation issues and dangling references are errors; suspicious but
//! harmless content (a missing protagonist, beats with no text) is a
//! warning. Exits non-zero when any error is found.

use clap::Parser;
use rustc_hash::FxHashSet;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use story_engine::core::path::linear_path;
use story_engine::core::pipeline::StoryInput;
use story_engine::core::validation::validate;
use story_engine::schema::character::Role;
use story_engine::schema::id::{BranchId, CharacterId, NodeId};
use story_engine::schema::options::GenerationOptions;
use story_engine::schema::story::BranchCondition;
use story_engine::state::snapshot::{import_json, import_ron};
use story_engine::state::StoryState;

#[derive(Debug, Parser)]
#[command(
    name = "story_linter",
    about = "Report validation issues and dangling references in a story state"
)]
struct Args {
    /// Story state to check (.json or .ron).
    state: PathBuf,

    /// Generation options (RON) whose character focus list is checked too.
    #[arg(long)]
    options: Option<PathBuf>,
}

fn lint(state: &StoryState, focus: &[CharacterId]) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for issue in validate(&StoryInput::from(state)) {
        errors.push(issue.to_string());
    }

    let characters: FxHashSet<CharacterId> = state.characters.iter().map(|c| c.id).collect();
    let nodes: FxHashSet<NodeId> = state.nodes.iter().map(|n| n.id).collect();
    let branches: FxHashSet<BranchId> = state.branches.iter().map(|b| b.id).collect();

    let leads: Vec<&str> = state
        .characters
        .iter()
        .filter(|c| c.role == Role::Protagonist)
        .map(|c| c.name.as_str())
        .collect();
    if !state.characters.is_empty() && leads.is_empty() {
        warnings.push(format!("No character has the {} role", Role::Protagonist.label()));
    }
    if leads.len() > 1 {
        warnings.push(format!(
            "{} characters share the {} role; only '{}' leads the story",
            leads.len(),
            Role::Protagonist.label(),
            leads[0]
        ));
    }

    for character in &state.characters {
        for relationship in &character.relationships {
            if !characters.contains(&relationship.target_character_id) {
                errors.push(format!(
                    "Character '{}' has a relationship with unknown character {}",
                    character.name, relationship.target_character_id
                ));
            }
        }
    }

    for id in focus.iter().filter(|id| !characters.contains(*id)) {
        errors.push(format!("Character focus names unknown character {id}"));
    }

    for plot in &state.plots {
        if plot.beats.is_empty() {
            warnings.push(format!("Plot '{}' has no beats", plot.title));
        }
        for beat in plot.beats.iter().filter(|b| b.description.trim().is_empty()) {
            warnings.push(format!(
                "Plot '{}' has an empty {} beat",
                plot.title,
                beat.kind.label()
            ));
        }
    }

    for event in &state.events {
        for id in event.characters.iter().filter(|id| !characters.contains(*id)) {
            errors.push(format!("Event {} involves unknown character {id}", event.id));
        }
    }

    for node in &state.nodes {
        for id in node.characters.iter().filter(|id| !characters.contains(*id)) {
            errors.push(format!("Node '{}' references unknown character {id}", node.title));
        }
        for id in node.choices.iter().flatten().filter(|id| !branches.contains(*id)) {
            errors.push(format!("Node '{}' lists unknown choice branch {id}", node.title));
        }
    }

    let mut default_sources: FxHashSet<NodeId> = FxHashSet::default();
    for branch in &state.branches {
        if !nodes.contains(&branch.from_node_id) {
            errors.push(format!(
                "Branch {} starts at unknown node {}",
                branch.id, branch.from_node_id
            ));
        }
        if !nodes.contains(&branch.to_node_id) {
            errors.push(format!(
                "Branch {} ends at unknown node {}",
                branch.id, branch.to_node_id
            ));
        }
        if branch.condition == BranchCondition::Default
            && !default_sources.insert(branch.from_node_id)
        {
            warnings.push(format!(
                "Node {} has more than one default branch; only the first is read",
                branch.from_node_id
            ));
        }
    }

    if state.generated_story.is_some() && state.graph().is_empty() {
        warnings.push("Story text is stored but the graph has no nodes".to_string());
    }

    // Choice nodes are never on the linear path; anything else should be.
    let path = linear_path(&state.nodes, &state.branches);
    let readable = state
        .nodes
        .iter()
        .filter(|n| !is_choice_target(state, n.id))
        .count();
    if path.len() < readable {
        warnings.push(format!(
            "Only {} of {} non-choice nodes are on the linear reading path",
            path.len(),
            readable
        ));
    }

    (errors, warnings)
}

fn is_choice_target(state: &StoryState, id: NodeId) -> bool {
    state
        .branches
        .iter()
        .any(|b| b.to_node_id == id && b.condition.is_choice())
}

/// Unknown-key warnings go first, in the order the import saw them.
fn prepend_unknown_keys(warnings: &mut Vec<String>, ignored: &[String]) {
    warnings.splice(
        0..0,
        ignored
            .iter()
            .map(|key| format!("Unknown key '{key}' is ignored")),
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let contents = match std::fs::read_to_string(&args.state) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("ERROR: cannot read '{}': {e}", args.state.display());
            process::exit(1);
        }
    };

    let mut state = StoryState::new();
    let imported = if args.state.extension().and_then(|s| s.to_str()) == Some("ron") {
        import_ron(&mut state, &contents)
    } else {
        import_json(&mut state, &contents)
    };
    let report = match imported {
        Ok(report) => report,
        Err(e) => {
            eprintln!("ERROR: {e}");
            process::exit(1);
        }
    };

    let focus = match &args.options {
        Some(path) => {
            let loaded = std::fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|text| GenerationOptions::parse_ron(&text).map_err(|e| e.to_string()));
            match loaded {
                Ok(options) => options.character_focus,
                Err(e) => {
                    eprintln!("ERROR: cannot load options '{}': {e}", path.display());
                    process::exit(1);
                }
            }
        }
        None => Vec::new(),
    };

    let (errors, mut warnings) = lint(&state, &focus);
    prepend_unknown_keys(&mut warnings, &report.ignored);

    println!("=== Story Lint Report ===\n");
    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }
    for warning in &warnings {
        println!("WARNING: {warning}");
    }
    for error in &errors {
        println!("ERROR: {error}");
    }
    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if !errors.is_empty() {
        process::exit(1);
    }
}
