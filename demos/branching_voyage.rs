/// Branching Voyage example: choices, character focus and the async task.
///
/// A sci-fi voyage-and-return with two plots. The navigator is focused so
/// she appears in every scene, choices are on, and generation runs as a
/// background task with a short delay while the status is printed. The
/// resulting state is exported as JSON at the end.
///
/// Run with: cargo run --example branching_voyage
use std::time::Duration;

use story_engine::core::pipeline::StoryEngine;
use story_engine::core::task::{GenerationStatus, GenerationTask, TaskConfig};
use story_engine::schema::character::{Character, Role};
use story_engine::schema::genre::Genre;
use story_engine::schema::options::{GenerationOptions, StoryLength};
use story_engine::schema::plot::{BeatType, Plot, PlotArc};
use story_engine::schema::setting::{Location, Setting};
use story_engine::schema::id::LocationId;
use story_engine::state::snapshot::export_json;
use story_engine::state::StoryState;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("story_engine=debug"))
        .init();

    let mut state = StoryState::new();

    let captain = Character::new("Captain Osei", Role::Protagonist);
    let mut navigator = Character::new("Lark", Role::Supporting);
    navigator.background = "Reads starlight like other people read faces".to_string();
    let mut warden = Character::new("The Warden", Role::Antagonist);
    warden.background = "An AI that has kept the gate for nine centuries".to_string();
    let focus = navigator.id;

    state.add_character(captain);
    state.add_character(navigator);
    state.add_character(warden);

    let mut rim = Setting::new(
        "The Outer Rim",
        "a scatter of dead beacons past the last charted star.",
    );
    rim.locations.push(Location {
        id: LocationId::new_v4(),
        name: "Beacon Nine".to_string(),
        description: "The only beacon still transmitting".to_string(),
    });
    state.add_setting(rim);

    state.add_plot(
        Plot::new("Past the Last Star", PlotArc::VoyageReturn)
            .with_beat(BeatType::IncitingIncident, "Beacon Nine starts broadcasting their names.")
            .with_beat(BeatType::RisingAction, "The ship's stores run low as the gate recedes."),
    );
    state.add_plot(
        Plot::new("The Warden's Bargain", PlotArc::OvercomingMonster)
            .with_beat(BeatType::Climax, "The Warden offers passage for one memory each.")
            .with_beat(
                BeatType::Resolution,
                "They come home lighter, and not all of them know why.",
            ),
    );
    state.set_genre(Genre::SciFi);

    let options = GenerationOptions {
        length: StoryLength::Long,
        ..GenerationOptions::default()
    }
    .focus_on(focus);

    let engine = StoryEngine::builder()
        .seed(9)
        .options(options)
        .build()
        .expect("Failed to build engine");

    let task = GenerationTask::spawn(
        engine,
        state,
        TaskConfig {
            delay: Duration::from_millis(500),
        },
    );
    let mut status = task.subscribe();
    println!("Status: {:?}", task.status());

    let _ = status.wait_for(GenerationStatus::is_finished).await;
    let outcome = task.wait().await.expect("Generation task panicked");
    println!("Status: {:?}\n", outcome.status);

    if let Some(story) = &outcome.story {
        println!("{}", story.text);
        println!("--- Graph ---");
        for branch in &story.graph.branches {
            let from = story.graph.node(branch.from_node_id).map_or("?", |n| n.title.as_str());
            let to = story.graph.node(branch.to_node_id).map_or("?", |n| n.title.as_str());
            println!("{from} -> {to} [{}]", branch.condition);
        }
    }

    let json = export_json(&outcome.state).expect("Failed to export state");
    println!("\n--- Exported state: {} bytes ---", json.len());
}
