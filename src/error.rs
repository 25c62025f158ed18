//! Error types for the noter-replay library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ReplayError`] is **fatal**: the replay cannot proceed at all (no
//!   session, no highlight at the requested heading, the PDF window cannot be
//!   shown). Returned as `Err(ReplayError)` from [`crate::replay_one`] and
//!   [`crate::replay_all`].
//!
//! * [`EntryError`] is **non-fatal**: a single entry failed during a batch
//!   (malformed record, viewer refused the annotation) but the other entries
//!   are fine. Stored inside [`crate::output::ReplayReport`] so callers can
//!   inspect partial success.
//!
//! Decoder failures carry a typed [`RecordError`] explaining which part of the
//! record shape was wrong.

use crate::notes::Location;
use crate::pipeline::reader::ReadError;
use crate::viewer::ViewerError;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the noter-replay library.
#[derive(Debug, Error)]
pub enum ReplayError {
    // ── Record errors ─────────────────────────────────────────────────────
    /// The highlight text does not decode into a region descriptor.
    #[error("Malformed highlight record: {0}")]
    MalformedRecord(#[from] RecordError),

    /// The heading at the requested location carries no highlight property.
    #[error("No {property} property at {location}")]
    NoHighlightAtLocation { location: Location, property: String },

    // ── Collaborator errors ───────────────────────────────────────────────
    /// No session binds the notes document to a PDF document.
    #[error("No active notes session.\nOpen the notes document together with its PDF first.")]
    NoActiveSession,

    /// The session's PDF buffer is not shown and could not be opened.
    #[error("Cannot show the PDF document: {source}")]
    NoPdfWindow {
        #[source]
        source: ViewerError,
    },

    /// The viewer rejected the annotation for a region.
    #[error("Viewer rejected highlight on page {page}: {source}")]
    AnnotationFailed {
        page: u32,
        #[source]
        source: ViewerError,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not read the notes file.
    #[error("Failed to read notes file '{path}': {source}")]
    NotesReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Why a highlight record failed to decode.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    /// The text is not a well-formed structured literal.
    #[error("unreadable record: {0}")]
    Unreadable(#[from] ReadError),

    /// The top-level datum is an atom rather than a list or record.
    #[error("expected a list or record, found {found}")]
    NotARecord { found: String },

    /// Fewer than three positional fields.
    #[error("expected at least 3 fields, found {found}")]
    TooFewFields { found: usize },

    /// Field 2 is not shaped `(page (coords...))`.
    #[error("region field must be (PAGE (COORDS...)), found {found}")]
    BadRegion { found: String },

    /// The page is not a positive integer.
    #[error("page must be a positive integer, found {found}")]
    BadPage { found: String },

    /// A coordinate is not a number.
    #[error("coordinate {index} is not a number: {found}")]
    NonNumericCoordinate { index: usize, found: String },

    /// A coordinate overflowed to infinity.
    #[error("coordinate {index} is not finite: {found}")]
    NonFiniteCoordinate { index: usize, found: String },

    /// The coordinates do not group into quads.
    #[error("coordinate count {count} is not a multiple of 4")]
    CoordinateCount { count: usize },
}

/// A non-fatal error for a single batch entry.
///
/// Stored in [`crate::output::ReplayReport::skipped`] when an entry is skipped
/// under [`crate::config::FailurePolicy::SkipAndContinue`].
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum EntryError {
    /// The entry's highlight text failed to decode.
    #[error("{location}: malformed highlight record: {detail}")]
    Malformed { location: Location, detail: String },

    /// The viewer refused the decoded region.
    #[error("{location}: viewer rejected highlight on page {page}: {detail}")]
    AnnotationFailed {
        location: Location,
        page: u32,
        detail: String,
    },
}

impl EntryError {
    /// Location of the heading the failed entry came from.
    pub fn location(&self) -> Location {
        match self {
            EntryError::Malformed { location, .. } => *location,
            EntryError::AnnotationFailed { location, .. } => *location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_highlight_display() {
        let e = ReplayError::NoHighlightAtLocation {
            location: Location::new(11),
            property: "HIGHLIGHT".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("HIGHLIGHT"), "got: {msg}");
        assert!(msg.contains("line 12"), "got: {msg}");
    }

    #[test]
    fn malformed_wraps_record_error() {
        let e: ReplayError = RecordError::CoordinateCount { count: 5 }.into();
        assert!(matches!(e, ReplayError::MalformedRecord(_)));
        assert!(e.to_string().contains("multiple of 4"));
    }

    #[test]
    fn annotation_failed_display() {
        let e = ReplayError::AnnotationFailed {
            page: 7,
            source: ViewerError::new("page out of range"),
        };
        assert!(e.to_string().contains("page 7"));
        assert!(e.to_string().contains("page out of range"));
    }

    #[test]
    fn entry_error_location() {
        let e = EntryError::Malformed {
            location: Location::new(3),
            detail: "bad".into(),
        };
        assert_eq!(e.location(), Location::new(3));
        assert!(e.to_string().starts_with("line 4"));
    }
}
