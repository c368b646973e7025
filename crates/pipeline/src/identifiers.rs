//! Newtype domain identifiers.
//!
//! Every named concept in a pipeline run is a distinct newtype wrapping a
//! primitive. This prevents accidentally interchanging, for example, a
//! [`StageName`] with a [`ParameterName`] even though both are strings and both
//! appear as `{placeholder}` keys inside prompt templates.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for template-key newtypes.
// Same surface as `string_id!`, but `new()` also enforces the placeholder
// grammar: `[a-z][a-z0-9_]*`.
// ---------------------------------------------------------------------------
macro_rules! key_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new key, returning `None` unless the value matches
            /// `[a-z][a-z0-9_]*`.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if is_template_key(&v) { Some(Self(v)) } else { None }
            }

            /// Returns the key as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

/// Returns `true` if `value` can be used as a `{placeholder}` inside a prompt
/// template.
pub fn is_template_key(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {
            chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        }
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Identifiers: template keys
// ---------------------------------------------------------------------------

key_id! {
    /// Identifies a stage within a pipeline (e.g. `"theme"`, `"flights"`).
    ///
    /// Stage names are unique per pipeline. Later stages reference the output of
    /// an earlier stage by writing `{stage_name}` in their prompt templates.
    StageName
}

key_id! {
    /// Names one scalar input of a run (e.g. `"destination"`, `"trip_dates"`).
    ParameterName
}

// ---------------------------------------------------------------------------
// Identifiers: free-form strings
// ---------------------------------------------------------------------------

string_id! {
    /// The model identifier sent to the text-generation provider
    /// (e.g. `"gpt-4o-mini"`).
    ModelId
}

string_id! {
    /// Identifies a pipeline definition (e.g. `"conference-planning"`).
    PipelineName
}

string_id! {
    /// Identifies a research-brief tool attached to a stage.
    ToolName
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single pipeline execution run.
///
/// Generated fresh for every run; recorded on tracing spans and in the report
/// header so all activity from a single run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a [`RunId`] from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
