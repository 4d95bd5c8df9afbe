//! Parsed configuration documents and their read accessors.

use std::fmt::Write as _;

use indexmap::IndexMap;
use serde::Serialize;

use crate::klipper::value::Value;

/// Parameters of one section, in first-insertion order.
pub type Section = IndexMap<String, Value>;

/// A parsed Klipper configuration.
///
/// Sections are kept in commit order. A section whose header appears twice
/// is stored once, at the position of its last header, holding the
/// parameters of its last occurrence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigDocument {
    sections: IndexMap<String, Section>,
}

impl ConfigDocument {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a section, replacing any earlier section of the same name.
    ///
    /// Empty names are ignored.
    pub(crate) fn commit(&mut self, name: String, data: Section) {
        if name.is_empty() {
            return;
        }
        self.sections.shift_remove(&name);
        self.sections.insert(name, data);
    }

    /// Number of sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Returns `true` if the document has no sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Looks up a section by exact name.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Returns all sections whose name starts with `prefix`, in document order.
    #[must_use]
    pub fn sections_with_prefix(&self, prefix: &str) -> Vec<(&str, &Section)> {
        self.sections
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(name, section)| (name.as_str(), section))
            .collect()
    }

    /// Returns all section names, sorted.
    #[must_use]
    pub fn section_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sections.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Looks up a single parameter.
    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&Value> {
        self.sections.get(section).and_then(|s| s.get(key))
    }

    /// Iterates over sections in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections.iter().map(|(name, s)| (name.as_str(), s))
    }

    /// Renders the document back into configuration text.
    ///
    /// Include directives come first, then every section with one
    /// `key: value` line per parameter. List values are written
    /// comma-joined.
    ///
    /// This is lossy: comments, blank lines and the original position of
    /// include directives are not preserved. Parsing the output yields the
    /// same sections, keys and values.
    #[must_use]
    pub fn to_config_text(&self, includes: &[String]) -> String {
        let mut out = String::new();

        for include in includes {
            let _ = writeln!(out, "[include {include}]");
        }

        for (i, (name, section)) in self.sections.iter().enumerate() {
            if i > 0 || !includes.is_empty() {
                out.push('\n');
            }
            let _ = writeln!(out, "[{name}]");
            for (key, value) in section {
                let _ = writeln!(out, "{key}: {value}");
            }
        }

        out
    }
}
