/// Session cache of downloaded images
///
/// Images are downloaded on demand and kept as renderer handles keyed by
/// URL, in two tiers:
/// - thumbnails stay for the whole session (cleared on refresh)
/// - full-resolution images are kept only around the lightbox position;
///   everything outside the window passed to `retain_full` is dropped
///
/// A download that finishes after its slot was dropped is discarded.

use iced::widget::image::Handle;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::cloud::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Thumbnail,
    Full,
}

#[derive(Debug, Clone)]
pub enum ImageSlot {
    Pending,
    Ready(Handle),
    Failed,
}

#[derive(Debug, Default)]
pub struct ImageCache {
    thumbnails: HashMap<String, ImageSlot>,
    full: HashMap<String, ImageSlot>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn tier_mut(&mut self, tier: Tier) -> &mut HashMap<String, ImageSlot> {
        match tier {
            Tier::Thumbnail => &mut self.thumbnails,
            Tier::Full => &mut self.full,
        }
    }

    /// Mark `url` as pending. Returns true if the caller should start a
    /// download (nothing cached yet, or the previous attempt failed).
    pub fn request(&mut self, tier: Tier, url: &str) -> bool {
        let slots = self.tier_mut(tier);
        match slots.get(url) {
            Some(ImageSlot::Pending) | Some(ImageSlot::Ready(_)) => false,
            Some(ImageSlot::Failed) | None => {
                slots.insert(url.to_string(), ImageSlot::Pending);
                true
            }
        }
    }

    /// Store a finished download. Returns false if the slot was dropped in
    /// the meantime and the result was discarded.
    pub fn complete(&mut self, url: &str, result: Result<Vec<u8>, FetchError>) -> bool {
        let slot = match self.full.get_mut(url) {
            Some(slot) => slot,
            None => match self.thumbnails.get_mut(url) {
                Some(slot) => slot,
                None => return false,
            },
        };

        *slot = match result {
            Ok(bytes) => ImageSlot::Ready(Handle::from_bytes(bytes)),
            Err(err) => {
                warn!(%url, error = %err, "image download failed");
                ImageSlot::Failed
            }
        };
        true
    }

    /// Drop every full-resolution slot whose URL is not in `keep`
    pub fn retain_full(&mut self, keep: &[String]) {
        let before = self.full.len();
        self.full.retain(|url, _| keep.contains(url));
        let evicted = before - self.full.len();
        if evicted > 0 {
            debug!(evicted, kept = self.full.len(), "released full-resolution images");
        }
    }

    pub fn get(&self, tier: Tier, url: &str) -> Option<&ImageSlot> {
        match tier {
            Tier::Thumbnail => self.thumbnails.get(url),
            Tier::Full => self.full.get(url),
        }
    }

    pub fn handle(&self, tier: Tier, url: &str) -> Option<&Handle> {
        match self.get(tier, url) {
            Some(ImageSlot::Ready(handle)) => Some(handle),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.thumbnails.clear();
        self.full.clear();
    }

    #[cfg(test)]
    pub fn full_len(&self) -> usize {
        self.full.len()
    }
}
