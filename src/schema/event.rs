use serde::{Deserialize, Serialize};

use super::id::{CharacterId, EventId};

/// A recorded happening in the story world. Stored alongside the rest
/// of the authored state; the generator does not consume events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryEvent {
    pub id: EventId,
    pub description: String,
    /// Characters involved (weak references).
    #[serde(default)]
    pub characters: Vec<CharacterId>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub consequences: Vec<String>,
}
