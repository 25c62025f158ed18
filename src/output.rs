//! Replay results.

use crate::error::EntryError;
use serde::{Deserialize, Serialize};

/// Outcome of a successful replay call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayReport {
    /// Entries that carried a highlight record.
    pub attempted: usize,
    /// Entries whose highlight was handed to the viewer.
    pub applied: usize,
    /// Entries skipped under [`crate::config::FailurePolicy::SkipAndContinue`].
    pub skipped: Vec<EntryError>,
}

impl ReplayReport {
    /// Status line for the user.
    pub fn message(&self) -> String {
        let noun = if self.applied == 1 { "highlight" } else { "highlights" };
        if self.skipped.is_empty() {
            format!("Applied {} {}", self.applied, noun)
        } else {
            format!(
                "Applied {} of {} {} ({} skipped)",
                self.applied,
                self.attempted,
                noun,
                self.skipped.len()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::Location;

    #[test]
    fn message_without_skips() {
        let r = ReplayReport {
            attempted: 1,
            applied: 1,
            skipped: vec![],
        };
        assert_eq!(r.message(), "Applied 1 highlight");
        assert_eq!(ReplayReport::default().message(), "Applied 0 highlights");
    }

    #[test]
    fn message_with_skips() {
        let r = ReplayReport {
            attempted: 3,
            applied: 2,
            skipped: vec![EntryError::Malformed {
                location: Location::new(9),
                detail: "bad".into(),
            }],
        };
        assert_eq!(r.message(), "Applied 2 of 3 highlights (1 skipped)");
    }
}
