//! storygen: generate a story from an exported state file.
//!
//! Prints the rendered markdown by default. `--graph` prints the node and
//! branch lists instead, `--summary` the authored-elements summary, and
//! `--export` writes the state back out with the new story applied.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

use story_engine::core::pipeline::StoryEngine;
use story_engine::schema::story::StoryGraph;
use story_engine::state::snapshot::{export_json, export_ron, import_json, import_ron};
use story_engine::state::StoryState;

#[derive(Debug, Parser)]
#[command(name = "storygen", about = "Weave a story graph and narrative from a saved story state")]
struct Args {
    /// Story state to read (.json or .ron).
    state: PathBuf,

    /// Generation options (RON).
    #[arg(long)]
    options: Option<PathBuf>,

    /// Narration template overrides (RON).
    #[arg(long)]
    templates: Option<PathBuf>,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Print the node and branch lists instead of the narrative.
    #[arg(long)]
    graph: bool,

    /// Print the story elements summary before generating.
    #[arg(long)]
    summary: bool,

    /// Write the updated state to this file (.json or .ron).
    #[arg(long)]
    export: Option<PathBuf>,
}

fn is_ron(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("ron")
}

fn load_state(path: &Path) -> Result<StoryState, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read '{}': {e}", path.display()))?;
    let mut state = StoryState::new();
    let report = if is_ron(path) {
        import_ron(&mut state, &contents)
    } else {
        import_json(&mut state, &contents)
    }
    .map_err(|e| format!("cannot import '{}': {e}", path.display()))?;
    for key in &report.ignored {
        eprintln!("WARNING: ignoring unknown key '{key}'");
    }
    Ok(state)
}

fn print_graph(graph: &StoryGraph) {
    if graph.is_empty() {
        println!("(empty graph)");
        return;
    }
    println!("Nodes ({}):", graph.nodes.len());
    for node in &graph.nodes {
        let marker = if node.has_choices() { " [decision]" } else { "" };
        println!("  {} {}{}", node.id, node.title, marker);
    }
    println!("\nBranches ({}):", graph.branches.len());
    for branch in &graph.branches {
        let from = graph.node(branch.from_node_id).map_or("?", |n| n.title.as_str());
        let to = graph.node(branch.to_node_id).map_or("?", |n| n.title.as_str());
        println!("  {from} -> {to} [{}] {}", branch.condition, branch.description);
    }
}

fn run(args: Args) -> Result<(), String> {
    let mut state = load_state(&args.state)?;

    if args.summary {
        println!("=== Story Elements Summary ===\n{}\n", state.summary());
    }

    let mut builder = StoryEngine::builder().seed(args.seed);
    if let Some(path) = &args.options {
        builder = builder.options_file(path);
    }
    if let Some(path) = &args.templates {
        builder = builder.templates_file(path);
    }
    let mut engine = builder.build().map_err(|e| e.to_string())?;

    let story = engine.generate(&state).map_err(|e| e.to_string())?;
    if args.graph {
        print_graph(&story.graph);
    } else {
        print!("{}", story.text);
    }

    if let Some(path) = &args.export {
        state.apply_generated(&story);
        let out = if is_ron(path) {
            export_ron(&state)
        } else {
            export_json(&state)
        }
        .map_err(|e| e.to_string())?;
        std::fs::write(path, out).map_err(|e| format!("cannot write '{}': {e}", path.display()))?;
        eprintln!("Saved story state to {}", path.display());
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(message) = run(Args::parse()) {
        eprintln!("ERROR: {message}");
        process::exit(1);
    }
}
