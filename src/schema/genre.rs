use serde::{Deserialize, Serialize};
use std::fmt;

use super::id::ThemeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    Fantasy,
    #[serde(rename = "sci-fi")]
    SciFi,
    Horror,
    Romance,
    Mystery,
    Thriller,
    Western,
    Historical,
}

impl Genre {
    pub const ALL: [Genre; 8] = [
        Genre::Fantasy,
        Genre::SciFi,
        Genre::Horror,
        Genre::Romance,
        Genre::Mystery,
        Genre::Thriller,
        Genre::Western,
        Genre::Historical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fantasy => "fantasy",
            Self::SciFi => "sci-fi",
            Self::Horror => "horror",
            Self::Romance => "romance",
            Self::Mystery => "mystery",
            Self::Thriller => "thriller",
            Self::Western => "western",
            Self::Historical => "historical",
        }
    }

    /// Parse a wire name, case-insensitively.
    pub fn parse(name: &str) -> Option<Genre> {
        let name = name.to_lowercase();
        Self::ALL.into_iter().find(|g| g.as_str() == name)
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The emotional register of a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Dark,
    Uplifting,
    Melancholic,
    Hopeful,
    Tense,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryTheme {
    pub id: ThemeId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub mood: Mood,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_wire_names() {
        assert_eq!(serde_json::to_string(&Genre::SciFi).unwrap(), "\"sci-fi\"");
        assert_eq!(serde_json::to_string(&Genre::Western).unwrap(), "\"western\"");
        let g: Genre = serde_json::from_str("\"sci-fi\"").unwrap();
        assert_eq!(g, Genre::SciFi);
    }

    #[test]
    fn genre_parse() {
        assert_eq!(Genre::parse("Fantasy"), Some(Genre::Fantasy));
        assert_eq!(Genre::parse("sci-fi"), Some(Genre::SciFi));
        assert_eq!(Genre::parse("cyberpunk"), None);
    }
}
