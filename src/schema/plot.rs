use serde::{Deserialize, Serialize};

use super::id::{BeatId, PlotId};

/// The classic plot shapes a plot can follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotArc {
    RagsToRiches,
    Tragedy,
    Rebirth,
    OvercomingMonster,
    #[default]
    Quest,
    VoyageReturn,
}

impl PlotArc {
    pub const ALL: [PlotArc; 6] = [
        PlotArc::RagsToRiches,
        PlotArc::Tragedy,
        PlotArc::Rebirth,
        PlotArc::OvercomingMonster,
        PlotArc::Quest,
        PlotArc::VoyageReturn,
    ];

    /// Wire name, e.g. `voyage_return`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RagsToRiches => "rags_to_riches",
            Self::Tragedy => "tragedy",
            Self::Rebirth => "rebirth",
            Self::OvercomingMonster => "overcoming_monster",
            Self::Quest => "quest",
            Self::VoyageReturn => "voyage_return",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::RagsToRiches => "Rags to Riches",
            Self::Tragedy => "Tragedy",
            Self::Rebirth => "Rebirth",
            Self::OvercomingMonster => "Overcoming the Monster",
            Self::Quest => "The Quest",
            Self::VoyageReturn => "Voyage and Return",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::RagsToRiches => {
                "A character rises from poverty or obscurity to success and recognition"
            }
            Self::Tragedy => {
                "A character falls from a position of status, often due to a fatal flaw"
            }
            Self::Rebirth => {
                "A character undergoes a transformative experience that changes them for the better"
            }
            Self::OvercomingMonster => {
                "A hero confronts and defeats a threatening force (monster, villain, etc.)"
            }
            Self::Quest => {
                "A hero journeys to obtain an object or reach a location, facing challenges along the way"
            }
            Self::VoyageReturn => {
                "A protagonist goes to a strange land, faces challenges, and returns changed"
            }
        }
    }
}

/// Where a beat sits in the dramatic structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeatType {
    IncitingIncident,
    RisingAction,
    Climax,
    FallingAction,
    Resolution,
}

impl BeatType {
    pub const ALL: [BeatType; 5] = [
        BeatType::IncitingIncident,
        BeatType::RisingAction,
        BeatType::Climax,
        BeatType::FallingAction,
        BeatType::Resolution,
    ];

    /// Wire name, e.g. `inciting_incident`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IncitingIncident => "inciting_incident",
            Self::RisingAction => "rising_action",
            Self::Climax => "climax",
            Self::FallingAction => "falling_action",
            Self::Resolution => "resolution",
        }
    }

    /// Title-cased label used as a story node title, e.g. `Inciting Incident`.
    pub fn label(&self) -> String {
        title_case(self.as_str())
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::IncitingIncident => "The event that sets the story in motion",
            Self::RisingAction => "Complications and obstacles that build tension",
            Self::Climax => "The highest point of tension and turning point of the story",
            Self::FallingAction => "Events following the climax, leading to resolution",
            Self::Resolution => "The conclusion that ties up story threads",
        }
    }
}

/// Replace underscores with spaces and upper-case the first letter of
/// each word.
pub fn title_case(raw: &str) -> String {
    raw.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One authored step of a plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryBeat {
    pub id: BeatId,
    #[serde(rename = "type")]
    pub kind: BeatType,
    pub description: String,
}

impl StoryBeat {
    pub fn new(kind: BeatType, description: impl Into<String>) -> Self {
        Self {
            id: BeatId::new_v4(),
            kind,
            description: description.into(),
        }
    }
}

/// A plot: an arc plus an ordered list of beats. Beat order is the seed
/// order for story node generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plot {
    pub id: PlotId,
    pub title: String,
    #[serde(default)]
    pub arc: PlotArc,
    #[serde(default)]
    pub beats: Vec<StoryBeat>,
    #[serde(default)]
    pub description: String,
}

impl Plot {
    pub fn new(title: impl Into<String>, arc: PlotArc) -> Self {
        Self {
            id: PlotId::new_v4(),
            title: title.into(),
            arc,
            beats: Vec::new(),
            description: String::new(),
        }
    }

    pub fn with_beat(mut self, kind: BeatType, description: impl Into<String>) -> Self {
        self.beats.push(StoryBeat::new(kind, description));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beat_labels() {
        assert_eq!(BeatType::IncitingIncident.label(), "Inciting Incident");
        assert_eq!(BeatType::RisingAction.label(), "Rising Action");
        assert_eq!(BeatType::Climax.label(), "Climax");
        assert_eq!(BeatType::FallingAction.label(), "Falling Action");
        assert_eq!(BeatType::Resolution.label(), "Resolution");
    }

    #[test]
    fn title_case_handles_odd_input() {
        assert_eq!(title_case("voyage_and_return"), "Voyage And Return");
        assert_eq!(title_case("_climax_"), "Climax");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn beat_type_wire_name() {
        let beat = StoryBeat::new(BeatType::FallingAction, "The smoke clears");
        let json = serde_json::to_value(&beat).unwrap();
        assert_eq!(json["type"], "falling_action");
    }

    #[test]
    fn arc_names() {
        assert_eq!(PlotArc::OvercomingMonster.name(), "Overcoming the Monster");
        assert_eq!(PlotArc::ALL.len(), 6);
        let json = serde_json::to_string(&PlotArc::VoyageReturn).unwrap();
        assert_eq!(json, "\"voyage_return\"");
    }

    #[test]
    fn builder_keeps_beat_order() {
        let plot = Plot::new("The Siege", PlotArc::Tragedy)
            .with_beat(BeatType::IncitingIncident, "A bell tolls")
            .with_beat(BeatType::Climax, "The gate falls");
        let kinds: Vec<_> = plot.beats.iter().map(|b| b.kind).collect();
        assert_eq!(kinds, vec![BeatType::IncitingIncident, BeatType::Climax]);
    }
}
