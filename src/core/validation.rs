use serde::Serialize;
use std::fmt;

use crate::core::pipeline::StoryInput;

/// A reason generation cannot run yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationIssue {
    NoCharacters,
    NoSettings,
    NoPlots,
    NoGenre,
}

impl ValidationIssue {
    pub fn message(&self) -> &'static str {
        match self {
            Self::NoCharacters => "No characters have been created",
            Self::NoSettings => "No world settings have been defined",
            Self::NoPlots => "No plots have been created",
            Self::NoGenre => "No genre has been selected",
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Check that everything generation needs is present.
///
/// Every check runs; the result lists all blocking issues in a fixed
/// order and is empty when generation may proceed.
pub fn validate(input: &StoryInput<'_>) -> Vec<ValidationIssue> {
    [
        (input.characters.is_empty(), ValidationIssue::NoCharacters),
        (input.settings.is_empty(), ValidationIssue::NoSettings),
        (input.plots.is_empty(), ValidationIssue::NoPlots),
        (input.genre.is_none(), ValidationIssue::NoGenre),
    ]
    .into_iter()
    .filter_map(|(failed, issue)| failed.then_some(issue))
    .collect()
}
