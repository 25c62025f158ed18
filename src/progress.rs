//! Progress-callback trait for per-entry replay events.
//!
//! Inject an [`Arc<dyn ReplayProgressCallback>`] via
//! [`crate::config::ReplayConfigBuilder::progress_callback`] to observe a batch
//! replay entry by entry: a status line in an editor, a log, a test probe.
//!
//! # Example
//!
//! ```rust
//! use noter_replay::{Location, ReplayConfig, ReplayProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     applied: AtomicUsize,
//! }
//!
//! impl ReplayProgressCallback for CountingCallback {
//!     fn on_entry_applied(&self, location: Location, page: u32, quads: usize) {
//!         self.applied.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{location}: page {page}, {quads} quads");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { applied: AtomicUsize::new(0) });
//!
//! let config = ReplayConfig::builder()
//!     .progress_callback(counter as Arc<dyn ReplayProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::EntryError;
use crate::notes::Location;
use std::sync::Arc;

/// Called by [`crate::replay_all`] as it works through a batch.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ReplayProgressCallback: Send + Sync {
    /// Called once after discovery, before any entry is decoded.
    ///
    /// # Arguments
    /// * `total`: number of entries carrying a highlight property
    fn on_replay_start(&self, total: usize) {
        let _ = total;
    }

    /// Called when an entry's region has been handed to the viewer.
    fn on_entry_applied(&self, location: Location, page: u32, quads: usize) {
        let _ = (location, page, quads);
    }

    /// Called when an entry is skipped under
    /// [`crate::config::FailurePolicy::SkipAndContinue`].
    fn on_entry_skipped(&self, error: &EntryError) {
        let _ = error;
    }

    /// Called once after the final redraw.
    ///
    /// # Arguments
    /// * `attempted`: entries discovered
    /// * `applied`: entries whose highlight now shows in the viewer
    fn on_replay_complete(&self, attempted: usize, applied: usize) {
        let _ = (attempted, applied);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ReplayProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ReplayConfig`].
pub type ProgressCallback = Arc<dyn ReplayProgressCallback>;
