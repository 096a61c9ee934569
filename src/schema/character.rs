use serde::{Deserialize, Serialize};

use super::id::{CharacterId, FlawId, GoalId, RelationshipId, TraitId};

/// A three-step intensity used for trait levels, goal urgency, flaw
/// severity, relationship strength and several generation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    #[default]
    Medium,
    High,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// The dramatic role a character plays. Exactly one protagonist is
/// expected but never enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Protagonist,
    Antagonist,
    Supporting,
    Mentor,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Protagonist => "Protagonist",
            Self::Antagonist => "Antagonist",
            Self::Supporting => "Supporting",
            Self::Mentor => "Mentor",
        }
    }
}

/// Archetype labels offered by the authoring UI. A character's
/// `archetype` field is free text and need not be one of these.
pub const ARCHETYPES: &[&str] = &[
    "Hero",
    "Mentor",
    "Ally",
    "Herald",
    "Trickster",
    "Shapeshifter",
    "Guardian",
    "Shadow",
    "Innocent",
    "Orphan",
    "Warrior",
    "Caregiver",
    "Explorer",
    "Creator",
    "Ruler",
    "Magician",
    "Lover",
    "Sage",
    "Jester",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trait {
    pub id: TraitId,
    pub name: String,
    #[serde(default)]
    pub level: Level,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub description: String,
    #[serde(default)]
    pub motivation: String,
    #[serde(default)]
    pub urgency: Level,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flaw {
    pub id: FlawId,
    pub description: String,
    #[serde(default)]
    pub severity: Level,
    #[serde(default)]
    pub impact: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    Ally,
    Enemy,
    #[default]
    Neutral,
    Family,
    Romantic,
}

/// A directed tie from the owning character to another one.
///
/// `target_character_id` is a weak reference: the target may have been
/// deleted, in which case lookups simply find nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: RelationshipId,
    pub target_character_id: CharacterId,
    #[serde(rename = "type", default)]
    pub kind: RelationshipKind,
    #[serde(default)]
    pub strength: Level,
    #[serde(default)]
    pub description: String,
}

/// An authored character. The engine only ever reads these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub archetype: String,
    #[serde(default)]
    pub traits: Vec<Trait>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub flaws: Vec<Flaw>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub background: String,
}

impl Character {
    /// A bare character with no traits, goals, flaws or relationships.
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            id: CharacterId::new_v4(),
            name: name.into(),
            role,
            archetype: String::new(),
            traits: Vec::new(),
            goals: Vec::new(),
            flaws: Vec::new(),
            relationships: Vec::new(),
            background: String::new(),
        }
    }

    pub fn is_protagonist(&self) -> bool {
        self.role == Role::Protagonist
    }

    pub fn trait_names(&self) -> impl Iterator<Item = &str> {
        self.traits.iter().map(|t| t.name.as_str())
    }

    pub fn goal_descriptions(&self) -> impl Iterator<Item = &str> {
        self.goals.iter().map(|g| g.description.as_str())
    }
}

/// Find a character by id. Absent ids yield `None`, never an error.
pub fn find_character(characters: &[Character], id: CharacterId) -> Option<&Character> {
    characters.iter().find(|c| c.id == id)
}

/// The first character whose role is protagonist.
pub fn find_protagonist(characters: &[Character]) -> Option<&Character> {
    characters.iter().find(|c| c.is_protagonist())
}
