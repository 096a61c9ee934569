/// Ironhaven example: a linear fantasy tragedy built entirely in code.
///
/// One setting, a protagonist, her rival and a mentor, and a five-beat
/// plot. Choices are disabled so the output is a single straight read.
///
/// Run with: cargo run --example ironhaven
use story_engine::core::pipeline::StoryEngine;
use story_engine::schema::character::{
    Character, Goal, Level, Relationship, RelationshipKind, Role, Trait,
};
use story_engine::schema::event::StoryEvent;
use story_engine::schema::genre::Genre;
use story_engine::schema::id::{EventId, GoalId, RelationshipId, TraitId};
use story_engine::schema::options::GenerationOptions;
use story_engine::schema::plot::{BeatType, Plot, PlotArc};
use story_engine::schema::setting::Setting;
use story_engine::state::StoryState;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("story_engine=info"))
        .init();

    let mut state = StoryState::new();

    // --- Cast ---
    let mut mira = Character::new("Mira", Role::Protagonist);
    mira.archetype = "Hero".to_string();
    mira.background = "A smith's daughter who never left the walls".to_string();
    mira.traits = vec![
        Trait {
            id: TraitId::new_v4(),
            name: "stubborn".to_string(),
            level: Level::High,
        },
        Trait {
            id: TraitId::new_v4(),
            name: "quick-handed".to_string(),
            level: Level::Medium,
        },
    ];
    mira.goals.push(Goal {
        id: GoalId::new_v4(),
        description: "Keep the forges burning".to_string(),
        motivation: "Her father's oath".to_string(),
        urgency: Level::High,
    });

    let mut vell = Character::new("Vell", Role::Antagonist);
    vell.archetype = "Shadow".to_string();
    vell.background = "A disgraced captain who wants the city for himself".to_string();

    let mut oskar = Character::new("Oskar", Role::Mentor);
    oskar.archetype = "Sage".to_string();
    oskar.background = "The old bellwright".to_string();

    let forge_fire = StoryEvent {
        id: EventId::new_v4(),
        description: "The night Vell burned the smithy".to_string(),
        characters: vec![mira.id, vell.id],
        location: "Forge Row".to_string(),
        consequences: vec!["Mira swore to keep the forges burning".to_string()],
    };

    mira.relationships.push(Relationship {
        id: RelationshipId::new_v4(),
        target_character_id: vell.id,
        kind: RelationshipKind::Enemy,
        strength: Level::High,
        description: "Vell burned her father's forge".to_string(),
    });

    state.add_character(mira);
    state.add_character(vell);
    state.add_character(oskar);
    state.add_event(forge_fire);

    // --- World ---
    let mut city = Setting::new(
        "Ironhaven",
        "a walled city of forges where the smoke never clears.",
    );
    city.rules.push("Iron cannot be sold outside the walls".to_string());
    state.add_setting(city);

    // --- Plot ---
    state.add_plot(
        Plot::new("The Siege of Ironhaven", PlotArc::Tragedy)
            .with_beat(
                BeatType::IncitingIncident,
                "A bell tolls at midnight, though no one rang it.",
            )
            .with_beat(BeatType::RisingAction, "Vell's men seal the eastern forges one by one.")
            .with_beat(BeatType::Climax, "The gate falls, and Mira holds the breach alone.")
            .with_beat(BeatType::FallingAction, "Oskar recasts the bell from the gate's hinges.")
            .with_beat(BeatType::Resolution, "The forges burn again, fewer but brighter."),
    );
    state.set_genre(Genre::Fantasy);

    println!("=== Story Elements Summary ===\n{}\n", state.summary());

    let mut engine = StoryEngine::builder()
        .seed(1871)
        .options(GenerationOptions::default().with_choices(false))
        .build()
        .expect("Failed to build engine");

    let story = engine.generate(&state).expect("State should be complete");
    state.apply_generated(&story);

    println!("{}", story.text);
    println!(
        "({} nodes, {} branches, now at step {:?})",
        story.graph.nodes.len(),
        story.graph.branches.len(),
        state.current_step
    );
}
