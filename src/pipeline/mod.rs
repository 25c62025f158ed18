//! Pipeline stages for highlight replay.
//!
//! Each submodule implements exactly one transformation step, so each is
//! testable on its own.
//!
//! ## Data Flow
//!
//! ```text
//! discover ──▶ reader ──▶ decode ──▶ (replay engine)
//! (headings)   (literal)  (region)
//! ```
//!
//! 1. [`discover`]: collect `(location, raw text)` entries from the notes
//! 2. [`reader`]: read the raw text as a structured literal
//! 3. [`decode`]: pick the region field out of the record and validate it
//! 4. [`encode`]: the reverse direction, region → record text

pub mod decode;
pub mod discover;
pub mod encode;
pub mod reader;
