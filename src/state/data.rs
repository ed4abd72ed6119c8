/// Shared data structures for the gallery state
///
/// These structs represent the data model that flows between
/// the image host client, the controller and the view layer.

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Represents one remote image in a listing
///
/// Created once from a listing descriptor and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResource {
    /// Origin-assigned identifier, unique within a listing
    pub public_id: String,
    /// Asset version assigned by the host, part of the delivery URL
    pub version: Option<u64>,
    /// Encoding format (e.g. "jpg")
    pub format: String,
    pub width: u32,
    pub height: u32,
    /// Full-resolution delivery URL, shown in the lightbox
    pub url: String,
    /// Scaled, auto-quality delivery URL, shown in the grid
    pub thumbnail_url: String,
}

impl ImageResource {
    /// Width over height, or 1.0 when the host did not report dimensions
    pub fn aspect_ratio(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// The complete ordered result of one "list by tag" call
///
/// Replaced wholesale on refresh, never edited in place.
#[derive(Debug, Clone)]
pub struct Listing {
    resources: Arc<[ImageResource]>,
    fetched_at: DateTime<Utc>,
}

impl Listing {
    pub fn new(resources: Vec<ImageResource>) -> Self {
        Self {
            resources: resources.into(),
            fetched_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Up to `len` entries starting at `start`, clamped to the listing end
    pub fn slice(&self, start: usize, len: usize) -> &[ImageResource] {
        let start = start.min(self.resources.len());
        let end = start.saturating_add(len).min(self.resources.len());
        &self.resources[start..end]
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

/// A committed, immutable slice of the listing
///
/// Fields are private: once a batch exists its contents cannot change,
/// only new batches can be appended after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    index: usize,
    photos: Arc<[ImageResource]>,
}

impl Batch {
    pub(crate) fn new(index: usize, photos: &[ImageResource]) -> Self {
        Self {
            index,
            photos: photos.into(),
        }
    }

    /// Position of this batch, starting at 0
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn photos(&self) -> &[ImageResource] {
        &self.photos
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }
}
