/// Lightbox navigation state
///
/// The grid renders per batch, so a click only knows its position inside
/// one batch. The navigator maps that to an index into the flattened photo
/// sequence and moves through it one photo at a time, clamped at both ends.
///
/// While a photo is open the page scroll is locked. The lock is an RAII
/// guard held inside the selection, so every way of clearing the selection
/// (close, refresh, drop) releases it.

use std::cell::Cell;
use std::rc::Rc;
use tracing::debug;

use super::data::Batch;

/// Shared page-scroll state. Scrolling is disabled while any lock is held.
#[derive(Debug, Clone, Default)]
pub struct PageScroll {
    locks: Rc<Cell<usize>>,
}

impl PageScroll {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable page scrolling until the returned guard is dropped
    pub fn lock(&self) -> ScrollLock {
        self.locks.set(self.locks.get() + 1);
        ScrollLock {
            locks: Rc::clone(&self.locks),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locks.get() > 0
    }
}

/// Held while the page must not scroll
#[derive(Debug)]
pub struct ScrollLock {
    locks: Rc<Cell<usize>>,
}

impl Drop for ScrollLock {
    fn drop(&mut self) {
        self.locks.set(self.locks.get().saturating_sub(1));
    }
}

/// Navigation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

#[derive(Debug)]
struct Selection {
    index: usize,
    scroll: ScrollLock,
}

/// Open/closed state of the overlay viewer
#[derive(Debug, Default)]
pub struct Lightbox {
    selection: Option<Selection>,
}

/// Map a batch-relative position to a flattened index.
///
/// Sums the lengths of every batch before `batch_index`. Returns `None`
/// when the position does not name a committed photo.
pub fn global_index(batches: &[Batch], batch_index: usize, index_within_batch: usize) -> Option<usize> {
    let batch = batches.get(batch_index)?;
    if index_within_batch >= batch.len() {
        return None;
    }
    let before: usize = batches[..batch_index].iter().map(Batch::len).sum();
    Some(before + index_within_batch)
}

impl Lightbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the viewer on the photo clicked at `(batch_index, index_within_batch)`.
    ///
    /// Returns the flattened index that is now shown. An invalid position
    /// leaves the lightbox unchanged.
    pub fn open(
        &mut self,
        batches: &[Batch],
        batch_index: usize,
        index_within_batch: usize,
        scroll: &PageScroll,
    ) -> Option<usize> {
        let index = global_index(batches, batch_index, index_within_batch)?;

        // Reuse the held lock if already open; otherwise take a new one
        let lock = match self.selection.take() {
            Some(selection) => selection.scroll,
            None => scroll.lock(),
        };
        self.selection = Some(Selection { index, scroll: lock });
        debug!(batch_index, index_within_batch, index, "lightbox opened");
        Some(index)
    }

    /// Move one photo in `direction` within a sequence of `total` photos.
    ///
    /// Stops at either end (no wraparound). No-op when closed.
    pub fn navigate(&mut self, direction: Direction, total: usize) -> Option<usize> {
        let selection = self.selection.as_mut()?;
        let last = total.saturating_sub(1);
        selection.index = match direction {
            Direction::Previous => selection.index.saturating_sub(1),
            Direction::Next => (selection.index + 1).min(last),
        };
        selection.index = selection.index.min(last);
        Some(selection.index)
    }

    /// Clear the selection and release the page-scroll lock
    pub fn close(&mut self) {
        if self.selection.take().is_some() {
            debug!("lightbox closed");
        }
    }

    pub fn index(&self) -> Option<usize> {
        self.selection.as_ref().map(|selection| selection.index)
    }

    pub fn is_open(&self) -> bool {
        self.selection.is_some()
    }
}
