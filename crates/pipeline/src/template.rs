//! Prompt templates with `{name}` placeholders.
//!
//! A placeholder is a brace-delimited key matching `[a-z][a-z0-9_]*`. Any other
//! brace text (`{ }`, `{Name}`, `{"json": 1}`) is kept literally, so prompts may
//! contain example JSON or formatting without escaping.
//!
//! Values are substituted in a single pass and never re-scanned: a stage output
//! that happens to contain `{destination}` is inserted verbatim.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([a-z][a-z0-9_]*)\}").expect("placeholder pattern is valid")
});

/// Raised when [`PromptTemplate::render`] finds no value for a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no value supplied for placeholder '{{{placeholder}}}'")]
pub struct MissingPlaceholder {
    /// The unresolved key, without braces.
    pub placeholder: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A parsed prompt template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parses `source`. Parsing never fails; text that is not a placeholder is
    /// literal.
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut segments = Vec::new();
        let mut cursor = 0;

        for caps in PLACEHOLDER.captures_iter(&source) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if whole.start() > cursor {
                segments.push(Segment::Literal(source[cursor..whole.start()].to_string()));
            }
            segments.push(Segment::Placeholder(caps[1].to_string()));
            cursor = whole.end();
        }
        if cursor < source.len() {
            segments.push(Segment::Literal(source[cursor..].to_string()));
        }

        Self { source, segments }
    }

    /// Returns the template text as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the distinct placeholder keys in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder(key) = segment {
                if !seen.contains(&key.as_str()) {
                    seen.push(key);
                }
            }
        }
        seen
    }

    /// Renders the template, asking `lookup` for each placeholder value.
    pub fn render<'v, F>(&self, lookup: F) -> Result<String, MissingPlaceholder>
    where
        F: Fn(&str) -> Option<&'v str>,
    {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(key) => {
                    let value = lookup(key).ok_or_else(|| MissingPlaceholder {
                        placeholder: key.clone(),
                    })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

impl From<&str> for PromptTemplate {
    fn from(source: &str) -> Self {
        Self::parse(source)
    }
}

impl From<String> for PromptTemplate {
    fn from(source: String) -> Self {
        Self::parse(source)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn lookup(key: &str) -> Option<&'static str> {
        match key {
            "destination" => Some("Iceland"),
            "duration" => Some("5 days"),
            "theme" => Some("Output with {destination} inside"),
            _ => None,
        }
    }

    #[test]
    fn renders_placeholders_and_literals() {
        let t = PromptTemplate::parse("Plan {duration} in {destination}.");
        assert_eq!(t.render(lookup).unwrap(), "Plan 5 days in Iceland.");
    }

    #[test]
    fn non_key_braces_stay_literal() {
        let t = PromptTemplate::parse(r#"{"plan": 1} {Destination} { destination }"#);
        assert!(t.placeholders().is_empty());
        assert_eq!(t.render(lookup).unwrap(), t.source());
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let t = PromptTemplate::parse("Theme:\n{theme}");
        assert_eq!(
            t.render(lookup).unwrap(),
            "Theme:\nOutput with {destination} inside"
        );
    }

    #[test]
    fn placeholders_are_deduplicated_in_order() {
        let t = PromptTemplate::parse("{b} {a} {b} {c}");
        assert_eq!(t.placeholders(), vec!["b", "a", "c"]);
    }

    #[test]
    fn missing_value_names_the_placeholder() {
        let err = PromptTemplate::parse("Fly from {departure_city}")
            .render(lookup)
            .unwrap_err();
        assert_eq!(err.placeholder, "departure_city");
        assert_eq!(
            err.to_string(),
            "no value supplied for placeholder '{departure_city}'"
        );
    }
}
