//! Notes-document access.
//!
//! The replay engine reads highlight records through [`NotesStore`] so it
//! never depends on how the outline is stored. [`crate::org::OrgNotes`] is the
//! implementation for Org-mode text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default property holding a heading's highlight record.
pub const HIGHLIGHT_PROPERTY: &str = "HIGHLIGHT";

/// A position in the notes document, as a 0-based line index.
///
/// Displayed 1-based, the way editors number lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location(usize);

impl Location {
    pub fn new(line: usize) -> Self {
        Self(line)
    }

    /// Build a location from a 1-based line number; `0` maps to the first line.
    pub fn from_line_number(line: usize) -> Self {
        Self(line.saturating_sub(1))
    }

    /// 0-based line index.
    pub fn line(&self) -> usize {
        self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.0 + 1)
    }
}

/// Read access to an outline-structured notes document.
pub trait NotesStore {
    /// Value of property `name` on the heading that owns `location`.
    ///
    /// A location inside a heading's body resolves to that heading. Returns
    /// `None` when there is no such heading or it lacks the property.
    fn property(&self, location: Location, name: &str) -> Option<String>;

    /// Locations of every heading, in document order, at any depth.
    fn headings(&self) -> Vec<Location>;
}

impl<T: NotesStore + ?Sized> NotesStore for &T {
    fn property(&self, location: Location, name: &str) -> Option<String> {
        (**self).property(location, name)
    }

    fn headings(&self) -> Vec<Location> {
        (**self).headings()
    }
}
