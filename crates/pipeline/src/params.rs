//! Run parameters: the fixed named inputs supplied once at run start.

use serde::{Deserialize, Serialize};

use crate::ParameterName;

/// Insertion-ordered scalar inputs for one run.
///
/// Values are stored in their display form; numeric inputs such as a traveler
/// count are formatted by the caller. The order of insertion is the order the
/// report header lists them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParameters {
    entries: Vec<(ParameterName, String)>,
}

impl RunParameters {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name = value`, replacing an earlier value of the same name in place.
    #[must_use]
    pub fn with(mut self, name: ParameterName, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
        self
    }

    /// Returns the value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&ParameterName, &str)> {
        self.entries.iter().map(|(n, v)| (n, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Turns a snake_case key into a title-cased label: `trip_dates` → `Trip Dates`.
pub fn label(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> ParameterName {
        ParameterName::new(s).unwrap()
    }

    #[test]
    fn keeps_insertion_order_and_replaces_in_place() {
        let params = RunParameters::new()
            .with(key("destination"), "Iceland")
            .with(key("duration"), "5 days")
            .with(key("destination"), "Japan");

        let names: Vec<_> = params.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["destination", "duration"]);
        assert_eq!(params.get("destination"), Some("Japan"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn labels_are_title_cased() {
        assert_eq!(label("trip_dates"), "Trip Dates");
        assert_eq!(label("destination"), "Destination");
        assert_eq!(label("budget_preference"), "Budget Preference");
    }
}
