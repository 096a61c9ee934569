use serde::{Deserialize, Serialize};
use std::fmt;

use super::id::{BranchId, CharacterId, NodeId};

/// The condition tag carried by a branch.
///
/// On the wire this is a plain string: `"default"` for the linear
/// continuation, `"choice_<n>"` for an injected decision edge, and any
/// other tag is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BranchCondition {
    Default,
    Choice(u32),
    Custom(String),
}

impl BranchCondition {
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, Self::Choice(_))
    }
}

impl From<String> for BranchCondition {
    fn from(tag: String) -> Self {
        if tag == "default" {
            return Self::Default;
        }
        // Only the canonical decimal form is a choice; `choice_01` stays custom
        // so it is written back unchanged.
        if let Some(suffix) = tag.strip_prefix("choice_") {
            if let Ok(n) = suffix.parse::<u32>() {
                if n.to_string() == suffix {
                    return Self::Choice(n);
                }
            }
        }
        Self::Custom(tag)
    }
}

impl From<BranchCondition> for String {
    fn from(condition: BranchCondition) -> Self {
        condition.to_string()
    }
}

impl fmt::Display for BranchCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::Choice(n) => write!(f, "choice_{n}"),
            Self::Custom(tag) => f.write_str(tag),
        }
    }
}

/// A single scene of the story graph.
///
/// Produced by the graph builder; only `choices` is ever filled in after
/// creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryNode {
    pub id: NodeId,
    pub title: String,
    pub content: String,
    /// Characters present in this scene (weak references).
    #[serde(default)]
    pub characters: Vec<CharacterId>,
    /// Outgoing choice branches, when this node is a decision point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<BranchId>>,
}

impl StoryNode {
    pub fn has_choices(&self) -> bool {
        self.choices.as_ref().is_some_and(|c| !c.is_empty())
    }
}

/// A directed edge between two story nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryBranch {
    pub id: BranchId,
    pub from_node_id: NodeId,
    pub to_node_id: NodeId,
    pub condition: BranchCondition,
    #[serde(default)]
    pub description: String,
}

/// The nodes and branches of one generation batch, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryGraph {
    pub nodes: Vec<StoryNode>,
    pub branches: Vec<StoryBranch>,
}

impl StoryGraph {
    pub fn node(&self, id: NodeId) -> Option<&StoryNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn branch(&self, id: BranchId) -> Option<&StoryBranch> {
        self.branches.iter().find(|b| b.id == id)
    }

    /// Branches leaving `id`, in list order.
    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = &StoryBranch> {
        self.branches.iter().filter(move |b| b.from_node_id == id)
    }

    /// Branches whose endpoints are not nodes of this graph.
    pub fn dangling_branches(&self) -> Vec<&StoryBranch> {
        self.branches
            .iter()
            .filter(|b| self.node(b.from_node_id).is_none() || self.node(b.to_node_id).is_none())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(title: &str) -> StoryNode {
        StoryNode {
            id: NodeId::new_v4(),
            title: title.to_string(),
            content: String::new(),
            characters: Vec::new(),
            choices: None,
        }
    }

    fn branch(from: &StoryNode, to: NodeId, condition: BranchCondition) -> StoryBranch {
        StoryBranch {
            id: BranchId::new_v4(),
            from_node_id: from.id,
            to_node_id: to,
            condition,
            description: String::new(),
        }
    }

    #[test]
    fn condition_wire_format() {
        for (tag, condition) in [
            ("default", BranchCondition::Default),
            ("choice_1", BranchCondition::Choice(1)),
            ("choice_2", BranchCondition::Choice(2)),
            ("on_betrayal", BranchCondition::Custom("on_betrayal".to_string())),
            ("choice_x", BranchCondition::Custom("choice_x".to_string())),
            ("choice_01", BranchCondition::Custom("choice_01".to_string())),
            ("choice_+2", BranchCondition::Custom("choice_+2".to_string())),
            ("choice_007", BranchCondition::Custom("choice_007".to_string())),
            ("choice_", BranchCondition::Custom("choice_".to_string())),
        ] {
            assert_eq!(BranchCondition::from(tag.to_string()), condition);
            assert_eq!(condition.to_string(), tag);
        }
    }

    #[test]
    fn branch_uses_camel_case_keys() {
        let a = node("A");
        let b = node("B");
        let json = serde_json::to_value(branch(&a, b.id, BranchCondition::Default)).unwrap();
        assert_eq!(json["condition"], "default");
        assert_eq!(json["fromNodeId"], a.id.to_string());
        assert_eq!(json["toNodeId"], b.id.to_string());
    }

    #[test]
    fn choices_omitted_when_absent() {
        let json = serde_json::to_value(node("A")).unwrap();
        assert!(json.get("choices").is_none());
    }

    #[test]
    fn has_choices_ignores_empty_list() {
        let mut n = node("A");
        assert!(!n.has_choices());
        n.choices = Some(Vec::new());
        assert!(!n.has_choices());
        n.choices = Some(vec![BranchId::new_v4()]);
        assert!(n.has_choices());
    }

    #[test]
    fn empty_graph_reports_empty() {
        let mut graph = StoryGraph::default();
        assert!(graph.is_empty());
        graph.nodes.push(node("A"));
        assert!(!graph.is_empty());
    }

    #[test]
    fn graph_lookups_and_dangling() {
        let a = node("A");
        let b = node("B");
        let good = branch(&a, b.id, BranchCondition::Default);
        let bad = branch(&a, NodeId::new_v4(), BranchCondition::Choice(1));
        let graph = StoryGraph {
            nodes: vec![a.clone(), b.clone()],
            branches: vec![good.clone(), bad.clone()],
        };
        assert_eq!(graph.outgoing(a.id).count(), 2);
        assert_eq!(graph.outgoing(b.id).count(), 0);
        assert_eq!(graph.branch(good.id).map(|b| b.to_node_id), Some(b.id));
        assert_eq!(graph.dangling_branches(), vec![&bad]);
    }
}
