//! # noter-replay
//!
//! Re-create PDF highlight annotations from the highlight records kept in an
//! Org notes document.
//!
//! Each note heading may carry a `HIGHLIGHT` property holding a printed Lisp
//! record such as `(org-noter-highlight 1 (2 (0.1 0.2 0.3 0.4)))`. Field 2 of
//! the record is the region: a 1-based page and a flat list of normalized
//! quad coordinates. This crate reads those records back and asks a PDF
//! viewer to draw them as session-scoped annotations. The PDF file itself is
//! never written.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Org notes
//!  │
//!  ├─ 1. Discover  headings carrying HIGHLIGHT, in document order
//!  ├─ 2. Read      record text → structured literal
//!  ├─ 3. Decode    literal → RegionDescriptor (page + quads)
//!  ├─ 4. Focus     show the PDF window, remembering the user's focus
//!  ├─ 5. Annotate  one annotation per region (redraw suspended in batches)
//!  └─ 6. Restore   focus back, one redraw, status message
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use noter_replay::{replay_all, MemoryViewer, OrgNotes, ReplayConfig, Session};
//!
//! let notes = OrgNotes::parse(
//!     "* Intro\n:PROPERTIES:\n:HIGHLIGHT: (hl 1 (2 (0.1 0.2 0.3 0.4)))\n:END:\n",
//! );
//! let mut viewer = MemoryViewer::new();
//! let notes_buf = viewer.create_buffer("notes.org");
//! let pdf_buf = viewer.create_buffer("paper.pdf");
//! viewer.display(notes_buf);
//!
//! let session = Session::new(notes_buf, pdf_buf);
//! let report = replay_all(&notes, Some(&session), &mut viewer, &ReplayConfig::default())?;
//! assert_eq!(report.applied, 1);
//! println!("{}", report.message());
//! # Ok::<(), noter_replay::ReplayError>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `noter-replay` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod memory;
pub mod notes;
pub mod org;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod region;
pub mod replay;
pub mod viewer;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{FailurePolicy, ReplayConfig, ReplayConfigBuilder};
pub use error::{EntryError, RecordError, ReplayError};
pub use memory::{Annotation, MemoryViewer};
pub use notes::{Location, NotesStore, HIGHLIGHT_PROPERTY};
pub use org::{OrgHeading, OrgNotes};
pub use output::ReplayReport;
pub use pipeline::decode::decode;
pub use pipeline::discover::{discover, Entry};
pub use pipeline::encode::encode_record;
pub use progress::{NoopProgressCallback, ProgressCallback, ReplayProgressCallback};
pub use region::{Quad, RegionDescriptor};
pub use replay::{replay_all, replay_one};
pub use viewer::{BufferId, Session, Viewer, ViewerError, WindowId};
