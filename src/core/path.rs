use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::schema::id::NodeId;
use crate::schema::story::{StoryBranch, StoryGraph, StoryNode};

/// Resolve the canonical reading order of a graph.
///
/// Starts at the first node and keeps following the first `default`
/// branch leaving the current node. Stops when there is no such branch,
/// when its destination is not a node of the graph, or when the
/// destination was already visited. Choice branches are never followed.
pub fn linear_path<'a>(nodes: &'a [StoryNode], branches: &[StoryBranch]) -> Vec<&'a StoryNode> {
    let Some(first) = nodes.first() else {
        return Vec::new();
    };

    let mut by_id: FxHashMap<NodeId, &StoryNode> = FxHashMap::default();
    for node in nodes {
        by_id.entry(node.id).or_insert(node);
    }

    let mut path = vec![first];
    let mut visited = FxHashSet::default();
    visited.insert(first.id);
    let mut current = first.id;

    loop {
        let Some(branch) = branches
            .iter()
            .find(|b| b.from_node_id == current && b.condition.is_default())
        else {
            break;
        };
        let Some(&next) = by_id.get(&branch.to_node_id) else {
            debug!(branch_id = %branch.id, "default branch points at a missing node");
            break;
        };
        if !visited.insert(next.id) {
            debug!(node_id = %next.id, "cycle in default chain");
            break;
        }
        path.push(next);
        current = next.id;
    }

    path
}

impl StoryGraph {
    pub fn linear_path(&self) -> Vec<&StoryNode> {
        linear_path(&self.nodes, &self.branches)
    }
}
