use serde::{Deserialize, Serialize};

use super::id::{LocationId, SettingId};

/// A named place inside a setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A world setting. Only the first setting of a collection is consumed
/// by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub id: SettingId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Free-text world rules, in authored order.
    #[serde(default)]
    pub rules: Vec<String>,
    #[serde(default)]
    pub locations: Vec<Location>,
}

impl Setting {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: SettingId::new_v4(),
            name: name.into(),
            description: description.into(),
            rules: Vec::new(),
            locations: Vec::new(),
        }
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }
}
