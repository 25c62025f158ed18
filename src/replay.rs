//! Replay entry points.
//!
//! [`replay_one`] re-creates the highlight recorded on one heading;
//! [`replay_all`] re-creates every highlight in a notes document. Both take
//! the session, notes and viewer explicitly and leave the viewer's focus
//! where the user had it, whether they succeed or fail.
//!
//! ## Batch rendering
//!
//! A viewer normally redraws after every annotation change. For a batch of N
//! highlights that is N redraws of the same page set, so [`replay_all`]
//! suspends incremental redraw around the submission loop and requests a
//! single redraw once the loop ends.

use crate::config::{FailurePolicy, ReplayConfig};
use crate::error::{EntryError, ReplayError};
use crate::notes::{Location, NotesStore};
use crate::output::ReplayReport;
use crate::pipeline::decode::decode;
use crate::pipeline::discover::discover;
use crate::region::RegionDescriptor;
use crate::viewer::{show_buffer, FocusGuard, RedrawSuspension, Session, Viewer, WindowId};
use tracing::{debug, info, warn};

/// Replay the highlight recorded on the heading that owns `location`.
///
/// # Errors
/// - [`ReplayError::NoActiveSession`] when `session` is `None`
/// - [`ReplayError::NoHighlightAtLocation`] when the heading has no record
/// - [`ReplayError::MalformedRecord`] when the record does not decode
/// - [`ReplayError::NoPdfWindow`] when the PDF cannot be shown
/// - [`ReplayError::AnnotationFailed`] when the viewer rejects the region
///
/// Nothing is touched in the viewer before the record has decoded.
pub fn replay_one<N, V>(
    notes: &N,
    session: Option<&Session>,
    viewer: &mut V,
    location: Location,
    config: &ReplayConfig,
) -> Result<ReplayReport, ReplayError>
where
    N: NotesStore + ?Sized,
    V: Viewer + ?Sized,
{
    let session = session.ok_or(ReplayError::NoActiveSession)?;
    let raw = notes.property(location, &config.property).ok_or_else(|| {
        ReplayError::NoHighlightAtLocation {
            location,
            property: config.property.clone(),
        }
    })?;
    let region = decode(&raw)?;
    debug!("Decoded {}: page {}, {} quads", location, region.page(), region.quad_count());

    let mut focus = FocusGuard::acquire(viewer);
    let window = enter_document(&mut *focus, session)?;
    focus
        .add_highlight_annotation(window, &region)
        .map_err(|source| ReplayError::AnnotationFailed {
            page: region.page(),
            source,
        })?;

    info!("Replayed highlight from {} on page {}", location, region.page());
    Ok(ReplayReport {
        attempted: 1,
        applied: 1,
        skipped: Vec::new(),
    })
}

/// Replay every highlight recorded in `notes`.
///
/// Entries are processed in document order. The PDF window is resolved once
/// and redrawn once for the whole batch. Failed entries are handled per
/// [`ReplayConfig::failure_policy`]; with the default policy the returned
/// report's `applied` count is the number of entries that decoded and were
/// accepted by the viewer.
///
/// # Errors
/// - [`ReplayError::NoActiveSession`] when `session` is `None`
/// - [`ReplayError::NoPdfWindow`] when the PDF cannot be shown
/// - [`ReplayError::MalformedRecord`] / [`ReplayError::AnnotationFailed`]
///   only under [`FailurePolicy::Abort`]
pub fn replay_all<N, V>(
    notes: &N,
    session: Option<&Session>,
    viewer: &mut V,
    config: &ReplayConfig,
) -> Result<ReplayReport, ReplayError>
where
    N: NotesStore + ?Sized,
    V: Viewer + ?Sized,
{
    let session = session.ok_or(ReplayError::NoActiveSession)?;

    // ── Step 1: Discover ─────────────────────────────────────────────────
    let entries = discover(notes, &config.property);
    let attempted = entries.len();
    info!("Replaying {} highlight entries", attempted);
    if let Some(ref cb) = config.progress_callback {
        cb.on_replay_start(attempted);
    }

    // ── Step 2: Decode ───────────────────────────────────────────────────
    let mut skipped = Vec::new();
    let mut regions: Vec<(Location, RegionDescriptor)> = Vec::with_capacity(attempted);
    for entry in entries {
        match decode(&entry.raw) {
            Ok(region) => regions.push((entry.location, region)),
            Err(e) => match config.failure_policy {
                FailurePolicy::Abort => {
                    warn!("Aborting replay: {}: {}", entry.location, e);
                    return Err(e.into());
                }
                FailurePolicy::SkipAndContinue => {
                    warn!("Skipping {}: {}", entry.location, e);
                    skip(
                        config,
                        &mut skipped,
                        EntryError::Malformed {
                            location: entry.location,
                            detail: e.to_string(),
                        },
                    );
                }
            },
        }
    }

    // ── Step 3: Apply with one redraw ────────────────────────────────────
    let applied = if regions.is_empty() {
        debug!("No decodable highlights; viewer left untouched");
        0
    } else {
        let mut focus = FocusGuard::acquire(viewer);
        let window = enter_document(&mut *focus, session)?;
        let mut surface = RedrawSuspension::begin(&mut *focus, window);

        let mut applied = 0;
        for (location, region) in &regions {
            match surface.add_highlight_annotation(window, region) {
                Ok(()) => {
                    applied += 1;
                    debug!("Applied {} on page {}", location, region.page());
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_entry_applied(*location, region.page(), region.quad_count());
                    }
                }
                Err(source) => match config.failure_policy {
                    FailurePolicy::Abort => {
                        warn!("Aborting replay at {}: {}", location, source);
                        return Err(ReplayError::AnnotationFailed {
                            page: region.page(),
                            source,
                        });
                    }
                    FailurePolicy::SkipAndContinue => {
                        warn!("Skipping {}: {}", location, source);
                        skip(
                            config,
                            &mut skipped,
                            EntryError::AnnotationFailed {
                                location: *location,
                                page: region.page(),
                                detail: source.to_string(),
                            },
                        );
                    }
                },
            }
        }
        applied
    };

    let report = ReplayReport {
        attempted,
        applied,
        skipped,
    };
    info!("{}", report.message());
    if let Some(ref cb) = config.progress_callback {
        cb.on_replay_complete(attempted, applied);
    }
    Ok(report)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Show the session's PDF (reusing a visible window) and focus it.
fn enter_document<V: Viewer + ?Sized>(
    viewer: &mut V,
    session: &Session,
) -> Result<WindowId, ReplayError> {
    let window = show_buffer(viewer, session.doc_buffer())
        .map_err(|source| ReplayError::NoPdfWindow { source })?;
    viewer.select_window(window);
    Ok(window)
}

fn skip(config: &ReplayConfig, skipped: &mut Vec<EntryError>, error: EntryError) {
    if let Some(ref cb) = config.progress_callback {
        cb.on_entry_skipped(&error);
    }
    skipped.push(error);
}
