use tracing::{debug, info, warn};

use super::data::{Batch, ImageResource, Listing};
use crate::cloud::FetchError;
use crate::config::GalleryConfig;

/// Identifies one listing request.
///
/// Every initial load or refresh bumps the controller's generation. A
/// response carrying an older ticket is discarded so a slow request can
/// never overwrite a fresher listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// What `finish_load` did with a listing response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Listing stored and batch 0 committed (or nothing, for an empty tag)
    Committed { total: usize },
    /// Request failed; error surfaced, nothing committed
    Failed,
    /// Response belonged to a superseded request and was ignored
    Stale,
}

/// The Gallery owns the fetch lifecycle of the photo listing.
///
/// It retrieves the whole tagged listing once, then hands it out in
/// fixed-size batches. Committed batches are append-only: the flattened
/// photo sequence is always a prefix of the listing.
#[derive(Debug)]
pub struct Gallery {
    config: GalleryConfig,
    listing: Option<Listing>,
    batches: Vec<Batch>,
    /// Listing entries already committed to batches
    cursor: usize,
    has_more: bool,
    /// A listing request is in flight
    loading: bool,
    error: Option<FetchError>,
    generation: u64,
}

impl Gallery {
    pub fn new(config: GalleryConfig) -> Self {
        Self {
            config,
            listing: None,
            batches: Vec::new(),
            cursor: 0,
            has_more: true,
            loading: false,
            error: None,
            generation: 0,
        }
    }

    /// Start an initial load. The caller performs the request and hands
    /// the result back through `finish_load` with the returned ticket.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        debug!(generation = self.generation, "listing load started");
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Apply the result of a listing request
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<ImageResource>, FetchError>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                "discarding superseded listing response"
            );
            return LoadOutcome::Stale;
        }

        self.loading = false;

        match result {
            Ok(resources) => {
                let listing = Listing::new(resources);
                let total = listing.len();

                self.batches.clear();
                self.cursor = 0;
                self.listing = Some(listing);
                self.commit_next_batch();

                if let Some(listing) = &self.listing {
                    info!(
                        total,
                        committed = self.cursor,
                        fetched_at = %listing.fetched_at(),
                        "listing committed"
                    );
                }
                LoadOutcome::Committed { total }
            }
            Err(err) => {
                warn!(error = %err, "listing load failed");
                self.listing = None;
                self.batches.clear();
                self.cursor = 0;
                self.has_more = false;
                self.error = Some(err);
                LoadOutcome::Failed
            }
        }
    }

    /// Commit the next batch from the held listing.
    ///
    /// No network request is made. Returns the index of the new batch, or
    /// `None` when a listing request is in flight, nothing is left, or no
    /// listing is held.
    pub fn load_more(&mut self) -> Option<usize> {
        if self.loading || !self.has_more {
            return None;
        }
        let index = self.commit_next_batch()?;
        debug!(index, cursor = self.cursor, has_more = self.has_more, "batch appended");
        Some(index)
    }

    /// Discard the listing and every batch, then start a new initial load.
    ///
    /// The host may return a different order this time; that is accepted.
    pub fn refresh(&mut self) -> LoadTicket {
        info!("refreshing gallery");
        self.listing = None;
        self.batches.clear();
        self.cursor = 0;
        self.has_more = true;
        self.error = None;
        self.begin_load()
    }

    /// Swap in new parameters. If they name a different listing this acts
    /// as a refresh and returns the ticket for the new load.
    #[cfg(test)]
    pub fn reconfigure(&mut self, config: GalleryConfig) -> Option<LoadTicket> {
        let changed = self.config.identifies_different_listing(&config);
        self.config = config;
        if changed {
            Some(self.refresh())
        } else {
            None
        }
    }

    fn commit_next_batch(&mut self) -> Option<usize> {
        let listing = self.listing.as_ref()?;
        let slice = listing.slice(self.cursor, self.config.batch_size());

        if !slice.is_empty() {
            let batch = Batch::new(self.batches.len(), slice);
            self.cursor += batch.len();
            self.batches.push(batch);
        }
        self.has_more = self.cursor < listing.len();

        if slice.is_empty() {
            None
        } else {
            Some(self.batches.len() - 1)
        }
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    /// Committed batches in order
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    #[cfg(test)]
    pub fn listing(&self) -> Option<&Listing> {
        self.listing.as_ref()
    }

    /// Length of the flattened photo sequence
    pub fn len(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// Flattened photo sequence: every committed batch, in order
    pub fn photos(&self) -> impl Iterator<Item = &ImageResource> {
        self.batches.iter().flat_map(|batch| batch.photos().iter())
    }

    /// Photo at a flattened index
    pub fn photo(&self, index: usize) -> Option<&ImageResource> {
        let mut offset = index;
        for batch in &self.batches {
            if offset < batch.len() {
                return batch.photos().get(offset);
            }
            offset -= batch.len();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resources(count: usize) -> Vec<ImageResource> {
        (0..count)
            .map(|i| ImageResource {
                public_id: format!("photo-{}", i),
                version: Some(1),
                format: "jpg".to_string(),
                width: 800,
                height: 600,
                url: format!("https://img.test/photo-{}.jpg", i),
                thumbnail_url: format!("https://img.test/w_400/photo-{}.jpg", i),
            })
            .collect()
    }

    fn loaded(count: usize) -> Gallery {
        let mut gallery = Gallery::new(GalleryConfig::default());
        let ticket = gallery.begin_load();
        gallery.finish_load(ticket, Ok(resources(count)));
        gallery
    }

    #[test]
    fn test_thirty_photos_in_batches_of_twelve() {
        let mut gallery = loaded(30);
        assert_eq!(gallery.batches().len(), 1);
        assert_eq!(gallery.batches()[0].len(), 12);
        assert_eq!(gallery.cursor(), 12);
        assert!(gallery.has_more());

        assert_eq!(gallery.load_more(), Some(1));
        assert_eq!(gallery.batches()[1].len(), 12);
        assert_eq!(gallery.cursor(), 24);
        assert!(gallery.has_more());

        assert_eq!(gallery.load_more(), Some(2));
        assert_eq!(gallery.batches()[2].len(), 6);
        assert_eq!(gallery.cursor(), 30);
        assert!(!gallery.has_more());

        assert_eq!(gallery.load_more(), None);
        assert_eq!(gallery.batches().len(), 3);
        assert_eq!(gallery.cursor(), 30);
    }

    #[test]
    fn test_flattened_sequence_is_listing_prefix() {
        let mut gallery = loaded(20);
        let check = |gallery: &Gallery| {
            let listing = gallery.listing().unwrap();
            let flat: Vec<_> = gallery.photos().cloned().collect();
            assert_eq!(flat.as_slice(), listing.slice(0, gallery.cursor()));
            let committed: usize = gallery.batches().iter().map(Batch::len).sum();
            assert_eq!(committed, gallery.cursor());
            assert_eq!(gallery.has_more(), gallery.cursor() < listing.len());
        };

        check(&gallery);
        assert_eq!(gallery.cursor(), gallery.batches()[0].len());
        gallery.load_more();
        check(&gallery);
    }

    #[test]
    fn test_load_more_is_idempotent_when_exhausted() {
        let mut gallery = loaded(5);
        assert!(!gallery.has_more());
        let before = (gallery.cursor(), gallery.batches().len(), gallery.has_more());
        gallery.load_more();
        gallery.load_more();
        let after = (gallery.cursor(), gallery.batches().len(), gallery.has_more());
        assert_eq!(before, after);
    }

    #[test]
    fn test_committed_batches_never_change() {
        let mut gallery = loaded(50);
        let first = gallery.batches()[0].clone();
        let mut last_cursor = gallery.cursor();

        while gallery.load_more().is_some() {
            assert_eq!(gallery.batches()[0], first);
            assert!(gallery.cursor() >= last_cursor);
            last_cursor = gallery.cursor();
        }

        for (i, batch) in gallery.batches().iter().enumerate() {
            assert_eq!(batch.index(), i);
        }
    }

    #[test]
    fn test_failed_load_leaves_sequence_empty() {
        let mut gallery = Gallery::new(GalleryConfig::default());
        let ticket = gallery.begin_load();
        assert!(gallery.is_loading());

        let outcome = gallery.finish_load(ticket, Err(FetchError::Status { status: 503 }));
        assert_eq!(outcome, LoadOutcome::Failed);
        assert!(gallery.is_empty());
        assert!(gallery.listing().is_none());
        assert!(!gallery.is_loading());
        assert_eq!(gallery.error(), Some(&FetchError::Status { status: 503 }));
        assert_eq!(gallery.load_more(), None);
    }

    #[test]
    fn test_retry_after_failure_clears_error() {
        let mut gallery = Gallery::new(GalleryConfig::default());
        let ticket = gallery.begin_load();
        gallery.finish_load(ticket, Err(FetchError::Network("offline".to_string())));

        let ticket = gallery.refresh();
        assert!(gallery.error().is_none());
        gallery.finish_load(ticket, Ok(resources(3)));
        assert_eq!(gallery.len(), 3);
    }

    #[test]
    fn test_empty_listing_is_not_an_error() {
        let gallery = loaded(0);
        assert!(gallery.error().is_none());
        assert!(gallery.batches().is_empty());
        assert!(!gallery.has_more());
        assert_eq!(gallery.listing().map(Listing::len), Some(0));
    }

    #[test]
    fn test_refresh_resets_before_new_listing_arrives() {
        let mut gallery = loaded(30);
        gallery.load_more();
        gallery.load_more();

        let ticket = gallery.refresh();
        assert!(gallery.batches().is_empty());
        assert_eq!(gallery.cursor(), 0);
        assert!(gallery.has_more());
        assert!(gallery.is_loading());

        let mut reordered = resources(30);
        reordered.reverse();
        gallery.finish_load(ticket, Ok(reordered));
        assert_eq!(gallery.photo(0).unwrap().public_id, "photo-29");
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut gallery = Gallery::new(GalleryConfig::default());
        let old = gallery.begin_load();
        let new = gallery.refresh();

        assert_eq!(gallery.finish_load(new, Ok(resources(4))), LoadOutcome::Committed { total: 4 });
        assert_eq!(gallery.finish_load(old, Ok(resources(40))), LoadOutcome::Stale);
        assert_eq!(gallery.listing().unwrap().len(), 4);

        // A stale failure must not clobber a good listing either
        let outcome = gallery.finish_load(old, Err(FetchError::Status { status: 500 }));
        assert_eq!(outcome, LoadOutcome::Stale);
        assert!(gallery.error().is_none());
    }

    #[test]
    fn test_load_more_waits_for_in_flight_listing() {
        let mut gallery = loaded(30);
        let ticket = gallery.begin_load();
        assert_eq!(gallery.load_more(), None);
        assert_eq!(gallery.cursor(), 12);
        gallery.finish_load(ticket, Ok(resources(30)));
        assert_eq!(gallery.load_more(), Some(1));
    }

    #[test]
    fn test_reconfigure_reloads_only_on_identity_change() {
        let mut gallery = loaded(30);

        let mut cosmetic = gallery.config().clone();
        cosmetic.thumbnail_width = 640;
        assert!(gallery.reconfigure(cosmetic).is_none());
        assert_eq!(gallery.cursor(), 12);

        let smaller = gallery.config().clone().with_batch_size(5);
        let ticket = gallery.reconfigure(smaller).unwrap();
        assert!(gallery.batches().is_empty());
        gallery.finish_load(ticket, Ok(resources(30)));
        assert_eq!(gallery.batches()[0].len(), 5);
    }

    #[test]
    fn test_photo_lookup_across_batches() {
        let mut gallery = loaded(30);
        gallery.load_more();
        assert_eq!(gallery.photo(14).unwrap().public_id, "photo-14");
        assert!(gallery.photo(24).is_none());
    }
}
