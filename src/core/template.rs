//! Narration templates: scripted sentences with named slots.
//!
//! Every sentence the engine writes on its own (as opposed to authored
//! beat text) comes from a template, so a project can restyle the
//! narration from a RON file without touching the graph logic.

use ron::extensions::Extensions;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template parse error: {0}")]
    Parse(String),
    #[error("unknown slot '{slot}' in template '{template}'")]
    UnknownSlot { template: String, slot: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Slot names the engine knows how to bind.
pub const KNOWN_SLOTS: &[&str] = &[
    "setting",
    "protagonist",
    "title",
    "genre",
    "description",
    "plot",
];

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateSegment {
    /// Literal text, emitted as-is.
    Literal(String),
    /// `{name}` or `{name|fallback}`.
    Slot {
        name: String,
        fallback: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub segments: Vec<TemplateSegment>,
}

impl Template {
    /// Parse a template string.
    ///
    /// Syntax:
    /// - `{name}` → slot, expands to the bound value
    /// - `{name|fallback}` → slot with text used when the binding is
    ///   missing or empty
    /// - `{{` / `}}` → literal braces
    pub fn parse(input: &str) -> Result<Template, TemplateError> {
        let mut segments = Vec::new();
        let mut literal_buf = String::new();
        let chars: Vec<char> = input.chars().collect();
        let len = chars.len();
        let mut i = 0;

        while i < len {
            match chars[i] {
                '{' if i + 1 < len && chars[i + 1] == '{' => {
                    literal_buf.push('{');
                    i += 2;
                }
                '{' => {
                    if !literal_buf.is_empty() {
                        segments.push(TemplateSegment::Literal(std::mem::take(&mut literal_buf)));
                    }

                    let start = i + 1;
                    let mut end = start;
                    while end < len && chars[end] != '}' {
                        if chars[end] == '{' {
                            return Err(TemplateError::Parse(
                                "nested braces are not allowed".to_string(),
                            ));
                        }
                        end += 1;
                    }
                    if end == len {
                        return Err(TemplateError::Parse("unclosed brace".to_string()));
                    }

                    let content: String = chars[start..end].iter().collect();
                    segments.push(Self::parse_slot(&content)?);
                    i = end + 1;
                }
                '}' if i + 1 < len && chars[i + 1] == '}' => {
                    literal_buf.push('}');
                    i += 2;
                }
                '}' => {
                    return Err(TemplateError::Parse(
                        "unmatched closing brace".to_string(),
                    ));
                }
                c => {
                    literal_buf.push(c);
                    i += 1;
                }
            }
        }

        if !literal_buf.is_empty() {
            segments.push(TemplateSegment::Literal(literal_buf));
        }

        Ok(Template { segments })
    }

    fn parse_slot(content: &str) -> Result<TemplateSegment, TemplateError> {
        let (name, fallback) = match content.split_once('|') {
            Some((name, fallback)) => (name.trim(), Some(fallback.to_string())),
            None => (content.trim(), None),
        };
        if name.is_empty() {
            return Err(TemplateError::Parse("empty slot name".to_string()));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(TemplateError::Parse(format!("invalid slot name '{name}'")));
        }
        Ok(TemplateSegment::Slot {
            name: name.to_string(),
            fallback,
        })
    }

    /// Parse one of the built-in sentences. These are known to be
    /// well-formed; should one ever fail to parse it is emitted verbatim.
    fn builtin(text: &'static str) -> Template {
        Self::parse(text).unwrap_or_else(|_| Template {
            segments: vec![TemplateSegment::Literal(text.to_string())],
        })
    }

    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            TemplateSegment::Slot { name, .. } => Some(name.as_str()),
            TemplateSegment::Literal(_) => None,
        })
    }

    /// Fill every slot from `bindings`.
    ///
    /// A binding that is absent or empty falls back to the slot's default
    /// text; a slot with neither expands to nothing.
    pub fn expand(&self, bindings: &Bindings<'_>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                TemplateSegment::Literal(text) => out.push_str(text),
                TemplateSegment::Slot { name, fallback } => {
                    match (bindings.get(name), fallback) {
                        (Some(value), _) => out.push_str(value),
                        (None, Some(fallback)) => out.push_str(fallback),
                        (None, None) => {
                            warn!(slot = %name, "template slot has no binding and no fallback");
                        }
                    }
                }
            }
        }
        out
    }

    fn check_slots(&self, template: &str) -> Result<(), TemplateError> {
        match self.slot_names().find(|s| !KNOWN_SLOTS.contains(s)) {
            Some(slot) => Err(TemplateError::UnknownSlot {
                template: template.to_string(),
                slot: slot.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Values available to a template expansion.
#[derive(Debug, Clone, Default)]
pub struct Bindings<'a> {
    values: FxHashMap<&'static str, &'a str>,
}

impl<'a> Bindings<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `slot` to `value`. `None` leaves the slot unbound.
    pub fn with(mut self, slot: &'static str, value: Option<&'a str>) -> Self {
        if let Some(value) = value {
            self.values.insert(slot, value);
        }
        self
    }

    /// The bound value, treating empty text as unbound.
    pub fn get(&self, slot: &str) -> Option<&'a str> {
        self.values.get(slot).copied().filter(|v| !v.is_empty())
    }
}

/// The three sentences that make up one injected choice.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceTemplate {
    /// Title of the choice node. Binds `title` to the source node title.
    pub title: Template,
    /// Content of the choice node. Binds `protagonist`.
    pub content: Template,
    /// Description of the choice branch.
    pub description: Template,
}

/// Every scripted sentence used by the graph builder and renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSet {
    pub title: Template,
    pub subtitle: Template,
    pub setting_intro: Template,
    pub introduction: Template,
    pub continuation: Template,
    pub high_road: ChoiceTemplate,
    pub resistance: ChoiceTemplate,
    pub conclusion: Template,
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self {
            title: Template::builtin("{plot|The Adventure Begins}"),
            subtitle: Template::builtin(
                "A {genre|curious} tale set in {setting|a mysterious world}",
            ),
            setting_intro: Template::builtin("In the world of {setting}, {description}"),
            introduction: Template::builtin(
                "The air in {setting|the land} was thick with tension. {protagonist|The hero} could sense that something momentous was about to occur.",
            ),
            continuation: Template::builtin("Continuing from {title}"),
            high_road: ChoiceTemplate {
                title: Template::builtin("Choice 1 from {title}"),
                content: Template::builtin(
                    "Option 1: {protagonist|The hero} decided to take the high road.",
                ),
                description: Template::builtin("Take the high road"),
            },
            resistance: ChoiceTemplate {
                title: Template::builtin("Choice 2 from {title}"),
                content: Template::builtin(
                    "Option 2: {protagonist|The hero} chose the path of greater resistance.",
                ),
                description: Template::builtin("Choose resistance"),
            },
            conclusion: Template::builtin(
                "And thus, the story of {protagonist|the hero} in {setting|this world} continues to unfold...",
            ),
        }
    }
}

// RON loading goes through an all-optional mirror of the set so that a
// file only has to mention the sentences it changes.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RonChoice {
    title: Option<String>,
    content: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RonTemplateSet {
    title: Option<String>,
    subtitle: Option<String>,
    setting_intro: Option<String>,
    introduction: Option<String>,
    continuation: Option<String>,
    high_road: Option<RonChoice>,
    resistance: Option<RonChoice>,
    conclusion: Option<String>,
}

fn override_with(
    target: &mut Template,
    name: &str,
    source: Option<String>,
) -> Result<(), TemplateError> {
    if let Some(text) = source {
        let template = Template::parse(&text)?;
        template.check_slots(name)?;
        *target = template;
    }
    Ok(())
}

fn override_choice(
    target: &mut ChoiceTemplate,
    name: &str,
    source: Option<RonChoice>,
) -> Result<(), TemplateError> {
    if let Some(choice) = source {
        override_with(&mut target.title, &format!("{name}.title"), choice.title)?;
        override_with(&mut target.content, &format!("{name}.content"), choice.content)?;
        override_with(
            &mut target.description,
            &format!("{name}.description"),
            choice.description,
        )?;
    }
    Ok(())
}

impl TemplateSet {
    /// Load a template set from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<TemplateSet, TemplateError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a template set from RON. Sentences not mentioned keep the
    /// built-in text.
    pub fn parse_ron(input: &str) -> Result<TemplateSet, TemplateError> {
        let raw: RonTemplateSet = ron::Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(input)?;
        let mut set = TemplateSet::default();

        override_with(&mut set.title, "title", raw.title)?;
        override_with(&mut set.subtitle, "subtitle", raw.subtitle)?;
        override_with(&mut set.setting_intro, "setting_intro", raw.setting_intro)?;
        override_with(&mut set.introduction, "introduction", raw.introduction)?;
        override_with(&mut set.continuation, "continuation", raw.continuation)?;
        override_choice(&mut set.high_road, "high_road", raw.high_road)?;
        override_choice(&mut set.resistance, "resistance", raw.resistance)?;
        override_with(&mut set.conclusion, "conclusion", raw.conclusion)?;

        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_literal_only() {
        let t = Template::parse("Hello, world.").unwrap();
        assert_eq!(
            t.segments,
            vec![TemplateSegment::Literal("Hello, world.".to_string())]
        );
    }

    #[test]
    fn parse_slot_with_fallback() {
        let t = Template::parse("In {setting|the land} tonight").unwrap();
        assert_eq!(t.segments.len(), 3);
        assert_eq!(
            t.segments[1],
            TemplateSegment::Slot {
                name: "setting".to_string(),
                fallback: Some("the land".to_string()),
            }
        );
    }

    #[test]
    fn parse_escaped_braces() {
        let t = Template::parse("Use {{braces}} here.").unwrap();
        assert_eq!(
            t.segments,
            vec![TemplateSegment::Literal("Use {braces} here.".to_string())]
        );
    }

    #[test]
    fn parse_errors() {
        assert!(Template::parse("Bad {} here").is_err());
        assert!(Template::parse("Bad {outer{inner}} here").is_err());
        assert!(Template::parse("Bad {unclosed here").is_err());
        assert!(Template::parse("Bad } here").is_err());
        assert!(Template::parse("Bad {two words} here").is_err());
    }

    #[test]
    fn expand_prefers_binding_then_fallback() {
        let t = Template::parse("{protagonist|The hero} waits in {setting|the land}.").unwrap();
        let bound = Bindings::new()
            .with("protagonist", Some("Mira"))
            .with("setting", Some("Ironhaven"));
        assert_eq!(t.expand(&bound), "Mira waits in Ironhaven.");
        assert_eq!(t.expand(&Bindings::new()), "The hero waits in the land.");
    }

    #[test]
    fn empty_binding_uses_fallback() {
        let t = Template::parse("{setting|somewhere}").unwrap();
        let b = Bindings::new().with("setting", Some(""));
        assert_eq!(t.expand(&b), "somewhere");
    }

    #[test]
    fn unbound_slot_without_fallback_is_dropped() {
        let t = Template::parse("In the world of {setting}, ok").unwrap();
        assert_eq!(t.expand(&Bindings::new()), "In the world of , ok");
    }

    #[test]
    fn builtin_templates_parse_and_use_known_slots() {
        let set = TemplateSet::default();
        for (name, template) in [
            ("title", &set.title),
            ("subtitle", &set.subtitle),
            ("setting_intro", &set.setting_intro),
            ("introduction", &set.introduction),
            ("continuation", &set.continuation),
            ("high_road.title", &set.high_road.title),
            ("high_road.content", &set.high_road.content),
            ("resistance.content", &set.resistance.content),
            ("conclusion", &set.conclusion),
        ] {
            template.check_slots(name).unwrap();
            assert!(
                template.segments.iter().any(|s| matches!(s, TemplateSegment::Slot { .. })),
                "{name} should have at least one slot"
            );
        }
    }

    #[test]
    fn builtin_introduction_text() {
        let set = TemplateSet::default();
        assert_eq!(
            set.introduction.expand(&Bindings::new()),
            "The air in the land was thick with tension. The hero could sense that something momentous was about to occur."
        );
    }

    #[test]
    fn ron_overrides_only_named_sentences() {
        let set = TemplateSet::parse_ron(
            r#"(
                conclusion: "{protagonist|Someone} rests at last.",
                high_road: (description: "Hold the line"),
            )"#,
        )
        .unwrap();
        let b = Bindings::new().with("protagonist", Some("Mira"));
        assert_eq!(set.conclusion.expand(&b), "Mira rests at last.");
        assert_eq!(set.high_road.description.expand(&b), "Hold the line");
        assert_eq!(set.high_road.title, TemplateSet::default().high_road.title);
        assert_eq!(set.introduction, TemplateSet::default().introduction);
    }

    #[test]
    fn ron_rejects_unknown_slot() {
        let err = TemplateSet::parse_ron(r#"(conclusion: "{villain} wins")"#).unwrap_err();
        assert!(matches!(err, TemplateError::UnknownSlot { ref slot, .. } if slot == "villain"));
    }

    #[test]
    fn load_fixture_templates() {
        let path = std::path::PathBuf::from("tests/fixtures/templates.ron");
        let set = TemplateSet::load_from_ron(&path).unwrap();
        let b = Bindings::new().with("protagonist", Some("Mira"));
        assert_eq!(set.resistance.description.expand(&b), "Refuse the summons");
    }
}
