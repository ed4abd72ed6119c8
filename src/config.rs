/// Gallery configuration
///
/// The gallery is configured at compile time. The constants below are
/// gathered into a `GalleryConfig` so the controller and the image host
/// client receive them explicitly instead of reaching for globals.

use serde::{Deserialize, Serialize};

/// Base URL of the image host's delivery network
pub const HOST_BASE: &str = "https://res.cloudinary.com";

/// Host account identifier (Cloudinary "cloud name")
pub const CLOUD_NAME: &str = "memorial-gallery";

/// Tag carried by every photo that belongs in the gallery
pub const GALLERY_TAG: &str = "memorial";

/// Number of photos committed per batch
pub const BATCH_SIZE: usize = 12;

/// Width of grid thumbnails in pixels
pub const THUMBNAIL_WIDTH: u32 = 400;

/// Playlist played by the background music session
pub const PLAYLIST_ID: &str = "PL3YtK8tDoOLzg7lHZ9SNtH60xDqqGvkTV";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GalleryConfig {
    /// Scheme and host of the delivery network, without trailing slash
    pub host_base: String,
    pub cloud_name: String,
    pub tag: String,
    /// Photos per batch. Always at least 1.
    pub batch_size: usize,
    pub thumbnail_width: u32,
    pub playlist_id: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            host_base: HOST_BASE.to_string(),
            cloud_name: CLOUD_NAME.to_string(),
            tag: GALLERY_TAG.to_string(),
            batch_size: BATCH_SIZE,
            thumbnail_width: THUMBNAIL_WIDTH,
            playlist_id: PLAYLIST_ID.to_string(),
        }
    }
}

impl GalleryConfig {
    /// Override the batch size. Zero is raised to 1 so pagination always
    /// makes progress.
    #[cfg(test)]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Point the client at a different host (used by tests and mirrors)
    #[cfg(test)]
    pub fn with_host_base(mut self, host_base: impl Into<String>) -> Self {
        self.host_base = host_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Effective batch size, never zero even if deserialized as 0
    pub fn batch_size(&self) -> usize {
        self.batch_size.max(1)
    }

    /// True when `other` names a different listing than `self`.
    ///
    /// Only the parameters that identify a listing count: the account,
    /// the tag, and how the listing is partitioned.
    #[cfg(test)]
    pub fn identifies_different_listing(&self, other: &GalleryConfig) -> bool {
        self.host_base != other.host_base
            || self.cloud_name != other.cloud_name
            || self.tag != other.tag
            || self.batch_size() != other.batch_size()
    }

    #[cfg(test)]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    #[cfg(test)]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
