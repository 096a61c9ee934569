//! Graph builder: turns authored plots and characters into a story graph.
//!
//! The graph is one introduction node followed by a node per story beat,
//! chained by `default` branches in emission order. When choices are
//! enabled, a few nodes that nothing points at yet become decision
//! points with two extra choice nodes each.

use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::core::pipeline::StoryInput;
use crate::core::template::{Bindings, ChoiceTemplate, TemplateSet};
use crate::schema::character::{Character, Role};
use crate::schema::id::{BranchId, CharacterId, NodeId};
use crate::schema::options::GenerationOptions;
use crate::schema::story::{BranchCondition, StoryBranch, StoryGraph, StoryNode};

/// Title of the node every graph starts with.
pub const INTRODUCTION_TITLE: &str = "Introduction";

/// Builds one generation batch. All randomness comes from the `rng`
/// handed to [`GraphBuilder::build`].
pub struct GraphBuilder<'a> {
    templates: &'a TemplateSet,
    options: &'a GenerationOptions,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(templates: &'a TemplateSet, options: &'a GenerationOptions) -> Self {
        Self { templates, options }
    }

    pub fn build<R: Rng + ?Sized>(&self, input: &StoryInput<'_>, rng: &mut R) -> StoryGraph {
        let mut graph = StoryGraph::default();
        let protagonist = input.protagonist().map(|c| c.name.as_str());

        if input.characters.is_empty() {
            warn!("building a story graph with an empty character roster");
        } else if protagonist.is_none() {
            debug!("no protagonist in roster, using placeholder");
        }
        if input.setting().is_none() {
            debug!("no setting available, using placeholder");
        }

        graph.nodes.push(self.introduction(input, protagonist, rng));

        let focus = resolve_focus(input.characters, &self.options.character_focus);
        for plot in input.plots {
            for beat in &plot.beats {
                let node = StoryNode {
                    id: NodeId::from_rng(rng),
                    title: beat.kind.label(),
                    content: beat.description.clone(),
                    characters: sample_cast(input.characters, &focus, rng),
                    choices: None,
                };
                if let Some(previous) = graph.nodes.last() {
                    let branch = self.continuation(previous, &node, rng);
                    graph.branches.push(branch);
                }
                graph.nodes.push(node);
            }
        }

        if self.options.include_choices {
            self.inject_choices(&mut graph, protagonist, rng);
        }

        graph
    }

    fn introduction<R: Rng + ?Sized>(
        &self,
        input: &StoryInput<'_>,
        protagonist: Option<&str>,
        rng: &mut R,
    ) -> StoryNode {
        let bindings = Bindings::new()
            .with("setting", input.setting().map(|s| s.name.as_str()))
            .with("protagonist", protagonist);
        StoryNode {
            id: NodeId::from_rng(rng),
            title: INTRODUCTION_TITLE.to_string(),
            content: self.templates.introduction.expand(&bindings),
            characters: input
                .characters
                .iter()
                .filter(|c| c.role == Role::Protagonist)
                .map(|c| c.id)
                .collect(),
            choices: None,
        }
    }

    fn continuation<R: Rng + ?Sized>(
        &self,
        from: &StoryNode,
        to: &StoryNode,
        rng: &mut R,
    ) -> StoryBranch {
        let bindings = Bindings::new().with("title", Some(from.title.as_str()));
        StoryBranch {
            id: BranchId::from_rng(rng),
            from_node_id: from.id,
            to_node_id: to.id,
            condition: BranchCondition::Default,
            description: self.templates.continuation.expand(&bindings),
        }
    }

    /// Turn the earliest nodes that no branch points at into decision
    /// points. Candidates are fixed before any choice node is added.
    fn inject_choices<R: Rng + ?Sized>(
        &self,
        graph: &mut StoryGraph,
        protagonist: Option<&str>,
        rng: &mut R,
    ) {
        let targeted: FxHashSet<NodeId> = graph.branches.iter().map(|b| b.to_node_id).collect();
        let candidates: Vec<usize> = graph
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !targeted.contains(&node.id))
            .map(|(index, _)| index)
            .collect();
        let wanted = rng.gen_range(2..=3usize);
        debug!(
            candidates = candidates.len(),
            wanted, "injecting choice points"
        );

        for index in candidates.into_iter().take(wanted) {
            let source = &graph.nodes[index];
            let source_id = source.id;
            let source_title = source.title.clone();
            let cast = source.characters.clone();

            let mut choice_ids = Vec::with_capacity(2);
            let choices = [
                (1, &self.templates.high_road),
                (2, &self.templates.resistance),
            ];
            for (number, template) in choices {
                let (node, branch) = make_choice(
                    template,
                    number,
                    source_id,
                    &source_title,
                    &cast,
                    protagonist,
                    rng,
                );
                choice_ids.push(branch.id);
                graph.nodes.push(node);
                graph.branches.push(branch);
            }
            graph.nodes[index].choices = Some(choice_ids);
        }
    }
}

fn make_choice<R: Rng + ?Sized>(
    template: &ChoiceTemplate,
    number: u32,
    source_id: NodeId,
    source_title: &str,
    cast: &[CharacterId],
    protagonist: Option<&str>,
    rng: &mut R,
) -> (StoryNode, StoryBranch) {
    let bindings = Bindings::new()
        .with("title", Some(source_title))
        .with("protagonist", protagonist);
    let node = StoryNode {
        id: NodeId::from_rng(rng),
        title: template.title.expand(&bindings),
        content: template.content.expand(&bindings),
        characters: cast.to_vec(),
        choices: None,
    };
    let branch = StoryBranch {
        id: BranchId::from_rng(rng),
        from_node_id: source_id,
        to_node_id: node.id,
        condition: BranchCondition::Choice(number),
        description: template.description.expand(&bindings),
    };
    (node, branch)
}

/// Focus ids that name a character on the roster, in roster order.
fn resolve_focus(roster: &[Character], focus: &[CharacterId]) -> Vec<CharacterId> {
    for id in focus {
        if !roster.iter().any(|c| c.id == *id) {
            debug!(character_id = %id, "ignoring focus on unknown character");
        }
    }
    roster
        .iter()
        .filter(|c| focus.contains(&c.id))
        .map(|c| c.id)
        .collect()
}

/// Pick a random non-empty subset of the roster (size uniform in
/// `1..=len`), then add any focused characters not already picked.
fn sample_cast<R: Rng + ?Sized>(
    roster: &[Character],
    focus: &[CharacterId],
    rng: &mut R,
) -> Vec<CharacterId> {
    if roster.is_empty() {
        return Vec::new();
    }
    let size = rng.gen_range(1..=roster.len());
    let mut cast: Vec<CharacterId> = roster.choose_multiple(rng, size).map(|c| c.id).collect();
    for id in focus {
        if !cast.contains(id) {
            cast.push(*id);
        }
    }
    cast
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::genre::Genre;
    use crate::schema::plot::{BeatType, Plot, PlotArc};
    use crate::schema::setting::Setting;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Fixture {
        characters: Vec<Character>,
        settings: Vec<Setting>,
        plots: Vec<Plot>,
    }

    impl Fixture {
        fn ironhaven() -> Self {
            Self {
                characters: vec![
                    Character::new("Mira", Role::Protagonist),
                    Character::new("Vell", Role::Antagonist),
                    Character::new("Oskar", Role::Mentor),
                ],
                settings: vec![Setting::new("Ironhaven", "A walled city of forges.")],
                plots: vec![Plot::new("The Siege", PlotArc::Tragedy)
                    .with_beat(BeatType::IncitingIncident, "A bell tolls")
                    .with_beat(BeatType::Climax, "The gate falls")],
            }
        }

        fn input(&self) -> StoryInput<'_> {
            StoryInput {
                characters: &self.characters,
                settings: &self.settings,
                plots: &self.plots,
                genre: Some(Genre::Fantasy),
            }
        }
    }

    fn build(fixture: &Fixture, options: &GenerationOptions, seed: u64) -> StoryGraph {
        let templates = TemplateSet::default();
        let mut rng = StdRng::seed_from_u64(seed);
        GraphBuilder::new(&templates, options).build(&fixture.input(), &mut rng)
    }

    #[test]
    fn linear_chain_without_choices() {
        let fixture = Fixture::ironhaven();
        let options = GenerationOptions::default().with_choices(false);
        let graph = build(&fixture, &options, 42);

        let titles: Vec<_> = graph.nodes.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Introduction", "Inciting Incident", "Climax"]);
        assert_eq!(graph.branches.len(), 2);
        assert!(graph.branches.iter().all(|b| b.condition.is_default()));
        assert_eq!(graph.branches[0].from_node_id, graph.nodes[0].id);
        assert_eq!(graph.branches[0].to_node_id, graph.nodes[1].id);
        assert_eq!(graph.branches[1].description, "Continuing from Inciting Incident");
    }

    #[test]
    fn introduction_names_setting_and_protagonist() {
        let fixture = Fixture::ironhaven();
        let graph = build(&fixture, &GenerationOptions::default(), 1);
        let intro = &graph.nodes[0];
        assert_eq!(intro.title, INTRODUCTION_TITLE);
        assert!(intro.content.starts_with("The air in Ironhaven was thick with tension. Mira"));
        assert_eq!(intro.characters, vec![fixture.characters[0].id]);
    }

    #[test]
    fn beat_content_is_verbatim() {
        let fixture = Fixture::ironhaven();
        let graph = build(&fixture, &GenerationOptions::default().with_choices(false), 3);
        assert_eq!(graph.nodes[1].content, "A bell tolls");
        assert_eq!(graph.nodes[2].content, "The gate falls");
    }

    #[test]
    fn beat_casts_are_non_empty_subsets() {
        let fixture = Fixture::ironhaven();
        for seed in 0..32 {
            let graph = build(&fixture, &GenerationOptions::default().with_choices(false), seed);
            for node in &graph.nodes[1..] {
                assert!(!node.characters.is_empty());
                let unique: FxHashSet<_> = node.characters.iter().collect();
                assert_eq!(unique.len(), node.characters.len());
                assert!(node
                    .characters
                    .iter()
                    .all(|id| fixture.characters.iter().any(|c| c.id == *id)));
            }
        }
    }

    #[test]
    fn focused_characters_join_every_beat() {
        let fixture = Fixture::ironhaven();
        let oskar = fixture.characters[2].id;
        let options = GenerationOptions::default()
            .with_choices(false)
            .focus_on(oskar)
            .focus_on(CharacterId::new_v4());
        for seed in 0..16 {
            let graph = build(&fixture, &options, seed);
            for node in &graph.nodes[1..] {
                assert!(node.characters.contains(&oskar));
            }
        }
    }

    #[test]
    fn choices_attach_to_introduction() {
        let fixture = Fixture::ironhaven();
        let graph = build(&fixture, &GenerationOptions::default(), 9);

        // Only the introduction is not yet a branch target.
        assert_eq!(graph.nodes.len(), 3 + 2);
        let intro = &graph.nodes[0];
        let choices = intro.choices.as_ref().unwrap();
        assert_eq!(choices.len(), 2);

        let first = graph.branch(choices[0]).unwrap();
        let second = graph.branch(choices[1]).unwrap();
        assert_eq!(first.condition, BranchCondition::Choice(1));
        assert_eq!(second.condition, BranchCondition::Choice(2));
        assert_eq!(first.description, "Take the high road");
        assert_eq!(second.description, "Choose resistance");

        let high_road = graph.node(first.to_node_id).unwrap();
        assert_eq!(high_road.title, "Choice 1 from Introduction");
        assert_eq!(high_road.content, "Option 1: Mira decided to take the high road.");
        assert_eq!(high_road.characters, intro.characters);
        assert!(graph.dangling_branches().is_empty());
    }

    #[test]
    fn empty_roster_degrades_to_placeholders() {
        let mut fixture = Fixture::ironhaven();
        fixture.characters.clear();
        fixture.settings.clear();
        let graph = build(&fixture, &GenerationOptions::default(), 5);
        assert!(graph.nodes[0].content.starts_with("The air in the land"));
        assert!(graph.nodes[0].content.contains("The hero could sense"));
        assert!(graph.nodes.iter().all(|n| n.characters.is_empty()));
        let choice = graph.nodes.iter().find(|n| n.title == "Choice 2 from Introduction").unwrap();
        assert_eq!(choice.content, "Option 2: The hero chose the path of greater resistance.");
    }

    #[test]
    fn no_beats_leaves_lone_introduction() {
        let mut fixture = Fixture::ironhaven();
        fixture.plots = vec![Plot::new("Empty", PlotArc::Quest)];
        let graph = build(&fixture, &GenerationOptions::default().with_choices(false), 0);
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.branches.is_empty());
    }

    #[test]
    fn same_seed_same_graph() {
        let fixture = Fixture::ironhaven();
        let options = GenerationOptions::default();
        assert_eq!(build(&fixture, &options, 77), build(&fixture, &options, 77));
    }
}
