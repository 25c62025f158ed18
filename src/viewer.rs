//! The PDF viewer seen from the replay engine.
//!
//! The engine never owns windows or buffers: it drives a host through the
//! [`Viewer`] trait using opaque [`WindowId`] / [`BufferId`] handles, and is
//! told which buffers belong together by an explicit [`Session`].
//!
//! Two scoped guards live here as well:
//!
//! * [`FocusGuard`] records the selected window and the buffer it shows, and
//!   puts both back when dropped.
//! * [`RedrawSuspension`] turns off incremental redraw and, when dropped,
//!   turns it back on and issues exactly one redraw for its window.
//!
//! Both restore on every exit path, including early `?` returns.

use crate::region::RegionDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, DerefMut};
use thiserror::Error;
use tracing::debug;

/// Opaque handle to a viewer buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BufferId(pub u32);

/// Opaque handle to a viewer window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowId(pub u32);

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buffer#{}", self.0)
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// Association between a notes document and the PDF it annotates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    notes_buffer: BufferId,
    doc_buffer: BufferId,
}

impl Session {
    pub fn new(notes_buffer: BufferId, doc_buffer: BufferId) -> Self {
        Self {
            notes_buffer,
            doc_buffer,
        }
    }

    pub fn notes_buffer(&self) -> BufferId {
        self.notes_buffer
    }

    pub fn doc_buffer(&self) -> BufferId {
        self.doc_buffer
    }
}

/// A failure reported by the viewer host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ViewerError {
    message: String,
}

impl ViewerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Window, buffer and annotation primitives of a PDF viewer host.
///
/// Focus and buffer switching are infallible so they can run from `Drop`.
pub trait Viewer {
    /// The window that currently has focus.
    fn selected_window(&self) -> WindowId;

    /// Buffer displayed in `window`.
    fn window_buffer(&self, window: WindowId) -> BufferId;

    fn select_window(&mut self, window: WindowId);

    fn set_window_buffer(&mut self, window: WindowId, buffer: BufferId);

    /// A window already showing `buffer`, if any.
    fn find_window_showing(&self, buffer: BufferId) -> Option<WindowId>;

    /// Show `buffer` in a window and return it.
    fn open_in_window(&mut self, buffer: BufferId) -> Result<WindowId, ViewerError>;

    /// Create a session-scoped highlight for `region` in the document shown
    /// by `window`. Nothing is written to the PDF file.
    fn add_highlight_annotation(
        &mut self,
        window: WindowId,
        region: &RegionDescriptor,
    ) -> Result<(), ViewerError>;

    /// While suspended, annotation changes do not trigger redraws.
    fn set_redraw_suspended(&mut self, suspended: bool);

    fn request_redraw(&mut self, window: WindowId);
}

impl<T: Viewer + ?Sized> Viewer for &mut T {
    fn selected_window(&self) -> WindowId {
        (**self).selected_window()
    }

    fn window_buffer(&self, window: WindowId) -> BufferId {
        (**self).window_buffer(window)
    }

    fn select_window(&mut self, window: WindowId) {
        (**self).select_window(window)
    }

    fn set_window_buffer(&mut self, window: WindowId, buffer: BufferId) {
        (**self).set_window_buffer(window, buffer)
    }

    fn find_window_showing(&self, buffer: BufferId) -> Option<WindowId> {
        (**self).find_window_showing(buffer)
    }

    fn open_in_window(&mut self, buffer: BufferId) -> Result<WindowId, ViewerError> {
        (**self).open_in_window(buffer)
    }

    fn add_highlight_annotation(
        &mut self,
        window: WindowId,
        region: &RegionDescriptor,
    ) -> Result<(), ViewerError> {
        (**self).add_highlight_annotation(window, region)
    }

    fn set_redraw_suspended(&mut self, suspended: bool) {
        (**self).set_redraw_suspended(suspended)
    }

    fn request_redraw(&mut self, window: WindowId) {
        (**self).request_redraw(window)
    }
}

/// Window showing `buffer`, opening one only if none is visible.
pub fn show_buffer<V: Viewer + ?Sized>(
    viewer: &mut V,
    buffer: BufferId,
) -> Result<WindowId, ViewerError> {
    if let Some(window) = viewer.find_window_showing(buffer) {
        debug!("Reusing {} for {}", window, buffer);
        return Ok(window);
    }
    let window = viewer.open_in_window(buffer)?;
    debug!("Opened {} for {}", window, buffer);
    Ok(window)
}

/// Restores the selected window and its buffer on drop.
pub struct FocusGuard<'a, V: Viewer + ?Sized> {
    viewer: &'a mut V,
    window: WindowId,
    buffer: BufferId,
}

impl<'a, V: Viewer + ?Sized> FocusGuard<'a, V> {
    /// Remember the current focus of `viewer`.
    pub fn acquire(viewer: &'a mut V) -> Self {
        let window = viewer.selected_window();
        let buffer = viewer.window_buffer(window);
        Self {
            viewer,
            window,
            buffer,
        }
    }
}

impl<V: Viewer + ?Sized> Deref for FocusGuard<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        &*self.viewer
    }
}

impl<V: Viewer + ?Sized> DerefMut for FocusGuard<'_, V> {
    fn deref_mut(&mut self) -> &mut V {
        &mut *self.viewer
    }
}

impl<V: Viewer + ?Sized> Drop for FocusGuard<'_, V> {
    fn drop(&mut self) {
        self.viewer.select_window(self.window);
        self.viewer.set_window_buffer(self.window, self.buffer);
        debug!("Restored focus to {} showing {}", self.window, self.buffer);
    }
}

/// Suspends incremental redraw; one redraw of `window` fires on drop.
pub struct RedrawSuspension<'a, V: Viewer + ?Sized> {
    viewer: &'a mut V,
    window: WindowId,
}

impl<'a, V: Viewer + ?Sized> RedrawSuspension<'a, V> {
    pub fn begin(viewer: &'a mut V, window: WindowId) -> Self {
        viewer.set_redraw_suspended(true);
        Self { viewer, window }
    }
}

impl<V: Viewer + ?Sized> Deref for RedrawSuspension<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        &*self.viewer
    }
}

impl<V: Viewer + ?Sized> DerefMut for RedrawSuspension<'_, V> {
    fn deref_mut(&mut self) -> &mut V {
        &mut *self.viewer
    }
}

impl<V: Viewer + ?Sized> Drop for RedrawSuspension<'_, V> {
    fn drop(&mut self) {
        self.viewer.set_redraw_suspended(false);
        self.viewer.request_redraw(self.window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryViewer;

    #[test]
    fn focus_guard_restores_window_and_buffer() {
        let mut viewer = MemoryViewer::new();
        let notes = viewer.create_buffer("notes.org");
        let pdf = viewer.create_buffer("paper.pdf");
        let home = viewer.display(notes);
        {
            let mut guard = FocusGuard::acquire(&mut viewer);
            let w = show_buffer(&mut *guard, pdf).unwrap();
            guard.select_window(w);
            guard.set_window_buffer(home, pdf);
        }
        assert_eq!(viewer.selected_window(), home);
        assert_eq!(viewer.window_buffer(home), notes);
    }

    #[test]
    fn show_buffer_reuses_visible_window() {
        let mut viewer = MemoryViewer::new();
        let notes = viewer.create_buffer("notes.org");
        let pdf = viewer.create_buffer("paper.pdf");
        viewer.display(notes);
        let first = show_buffer(&mut viewer, pdf).unwrap();
        let second = show_buffer(&mut viewer, pdf).unwrap();
        assert_eq!(first, second);
        assert_eq!(viewer.window_count(), 2);
    }

    #[test]
    fn suspension_fires_single_redraw() {
        let mut viewer = MemoryViewer::new();
        let pdf = viewer.create_buffer("paper.pdf");
        let w = viewer.display(pdf);
        {
            let mut suspended = RedrawSuspension::begin(&mut viewer, w);
            assert!(suspended.redraw_suspended());
            for page in 1..=3 {
                let region = RegionDescriptor::new(page, vec![0.1, 0.1, 0.2, 0.2]).unwrap();
                suspended.add_highlight_annotation(w, &region).unwrap();
            }
        }
        assert!(!viewer.redraw_suspended());
        assert_eq!(viewer.redraw_count(), 1);
        assert_eq!(viewer.annotations().len(), 3);
    }
}
