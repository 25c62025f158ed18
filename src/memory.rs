//! In-memory viewer host.
//!
//! [`MemoryViewer`] models just enough of a PDF viewer for the replay engine:
//! named buffers, windows showing them, a selected window, session-scoped
//! highlight annotations and redraw bookkeeping. The CLI replays into it and
//! prints the resulting annotations; tests use it to observe focus and redraw
//! behaviour.

use crate::region::{Quad, RegionDescriptor};
use crate::viewer::{BufferId, Viewer, ViewerError, WindowId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// A session-scoped highlight held in viewer memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: usize,
    pub buffer: BufferId,
    pub page: u32,
    pub quads: Vec<Quad>,
}

/// A viewer whose whole state lives in memory.
///
/// Starts with one window showing a `*scratch*` buffer.
#[derive(Debug)]
pub struct MemoryViewer {
    buffers: Vec<String>,
    /// Indexed by `WindowId`; windows are never deleted.
    windows: Vec<BufferId>,
    selected: WindowId,
    annotations: Vec<Annotation>,
    redraw_suspended: bool,
    redraw_count: usize,
    incremental_redraws: usize,
    page_count: Option<u32>,
    refuse_windows: bool,
    rejected_pages: HashSet<u32>,
}

impl Default for MemoryViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryViewer {
    pub fn new() -> Self {
        Self {
            buffers: vec!["*scratch*".to_string()],
            windows: vec![BufferId(0)],
            selected: WindowId(0),
            annotations: Vec::new(),
            redraw_suspended: false,
            redraw_count: 0,
            incremental_redraws: 0,
            page_count: None,
            refuse_windows: false,
            rejected_pages: HashSet::new(),
        }
    }

    /// Reject annotations beyond `pages`, as a viewer would for a document of
    /// that length.
    pub fn with_page_count(mut self, pages: u32) -> Self {
        self.page_count = Some(pages);
        self
    }

    /// Make [`Viewer::open_in_window`] fail.
    pub fn refuse_new_windows(&mut self, refuse: bool) {
        self.refuse_windows = refuse;
    }

    /// Make annotations on `page` fail.
    pub fn reject_page(&mut self, page: u32) {
        self.rejected_pages.insert(page);
    }

    pub fn create_buffer(&mut self, name: impl Into<String>) -> BufferId {
        self.buffers.push(name.into());
        BufferId((self.buffers.len() - 1) as u32)
    }

    pub fn buffer_name(&self, buffer: BufferId) -> Option<&str> {
        self.buffers.get(buffer.0 as usize).map(String::as_str)
    }

    /// Show `buffer` in the selected window and return that window.
    pub fn display(&mut self, buffer: BufferId) -> WindowId {
        let window = self.selected;
        self.set_window_buffer(window, buffer);
        window
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn annotations_for(&self, buffer: BufferId) -> impl Iterator<Item = &Annotation> + '_ {
        self.annotations.iter().filter(move |a| a.buffer == buffer)
    }

    pub fn redraw_suspended(&self) -> bool {
        self.redraw_suspended
    }

    /// Explicit redraw requests received.
    pub fn redraw_count(&self) -> usize {
        self.redraw_count
    }

    /// Redraws triggered by annotation changes while redraw was not suspended.
    pub fn incremental_redraws(&self) -> usize {
        self.incremental_redraws
    }
}

impl Viewer for MemoryViewer {
    fn selected_window(&self) -> WindowId {
        self.selected
    }

    fn window_buffer(&self, window: WindowId) -> BufferId {
        self.windows
            .get(window.0 as usize)
            .copied()
            .unwrap_or(BufferId(0))
    }

    fn select_window(&mut self, window: WindowId) {
        if (window.0 as usize) < self.windows.len() {
            self.selected = window;
        }
    }

    fn set_window_buffer(&mut self, window: WindowId, buffer: BufferId) {
        if let Some(slot) = self.windows.get_mut(window.0 as usize) {
            *slot = buffer;
        }
    }

    fn find_window_showing(&self, buffer: BufferId) -> Option<WindowId> {
        self.windows
            .iter()
            .position(|&b| b == buffer)
            .map(|i| WindowId(i as u32))
    }

    fn open_in_window(&mut self, buffer: BufferId) -> Result<WindowId, ViewerError> {
        if self.refuse_windows {
            return Err(ViewerError::new("no room for another window"));
        }
        if self.buffer_name(buffer).is_none() {
            return Err(ViewerError::new(format!("{buffer} does not exist")));
        }
        self.windows.push(buffer);
        Ok(WindowId((self.windows.len() - 1) as u32))
    }

    fn add_highlight_annotation(
        &mut self,
        window: WindowId,
        region: &RegionDescriptor,
    ) -> Result<(), ViewerError> {
        let buffer = self
            .windows
            .get(window.0 as usize)
            .copied()
            .ok_or_else(|| ViewerError::new(format!("{window} does not exist")))?;
        let page = region.page();
        if self.page_count.is_some_and(|n| page > n) || self.rejected_pages.contains(&page) {
            return Err(ViewerError::new(format!("page {page} is not in the document")));
        }

        let id = self.annotations.len();
        self.annotations.push(Annotation {
            id,
            buffer,
            page,
            quads: region.quads().collect(),
        });
        if !self.redraw_suspended {
            self.incremental_redraws += 1;
        }
        debug!("Added annotation {} on page {} in {}", id, page, buffer);
        Ok(())
    }

    fn set_redraw_suspended(&mut self, suspended: bool) {
        self.redraw_suspended = suspended;
    }

    fn request_redraw(&mut self, _window: WindowId) {
        self.redraw_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(page: u32) -> RegionDescriptor {
        RegionDescriptor::new(page, vec![0.1, 0.2, 0.3, 0.4]).unwrap()
    }

    #[test]
    fn starts_with_scratch_window() {
        let viewer = MemoryViewer::new();
        assert_eq!(viewer.selected_window(), WindowId(0));
        assert_eq!(viewer.buffer_name(viewer.window_buffer(WindowId(0))), Some("*scratch*"));
    }

    #[test]
    fn annotations_outside_document_are_rejected() {
        let mut viewer = MemoryViewer::new().with_page_count(3);
        let pdf = viewer.create_buffer("paper.pdf");
        let w = viewer.display(pdf);
        assert!(viewer.add_highlight_annotation(w, &region(3)).is_ok());
        assert!(viewer.add_highlight_annotation(w, &region(4)).is_err());
        assert_eq!(viewer.annotations().len(), 1);
        assert_eq!(viewer.incremental_redraws(), 1);
    }

    #[test]
    fn refused_window() {
        let mut viewer = MemoryViewer::new();
        let pdf = viewer.create_buffer("paper.pdf");
        viewer.refuse_new_windows(true);
        assert!(viewer.open_in_window(pdf).is_err());
        assert!(viewer.open_in_window(BufferId(99)).is_err());
    }

    #[test]
    fn annotations_track_their_buffer() {
        let mut viewer = MemoryViewer::new();
        let a = viewer.create_buffer("a.pdf");
        let b = viewer.create_buffer("b.pdf");
        let wa = viewer.display(a);
        let wb = viewer.open_in_window(b).unwrap();
        viewer.add_highlight_annotation(wa, &region(1)).unwrap();
        viewer.add_highlight_annotation(wb, &region(2)).unwrap();
        assert_eq!(viewer.annotations_for(b).map(|a| a.page).collect::<Vec<_>>(), vec![2]);
    }
}
