//! Discovery: collect highlight entries from a notes document.

use crate::notes::{Location, NotesStore};
use tracing::debug;

/// A heading's raw highlight text, found during one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub location: Location,
    pub raw: String,
}

/// Visit every heading in document order, at any depth, and keep those that
/// carry `property`. Headings without it are not an error.
pub fn discover<N: NotesStore + ?Sized>(notes: &N, property: &str) -> Vec<Entry> {
    let entries: Vec<Entry> = notes
        .headings()
        .into_iter()
        .filter_map(|location| {
            notes
                .property(location, property)
                .map(|raw| Entry { location, raw })
        })
        .collect();
    debug!("Discovered {} entries with {}", entries.len(), property);
    entries
}
