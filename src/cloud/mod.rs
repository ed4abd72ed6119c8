/// Image host client
///
/// This module talks to the external image host:
/// - Listing every resource carrying the gallery tag (listing.rs)
/// - Deriving delivery URLs and downloading image bytes (delivery.rs)
/// - The error taxonomy shared by both (error.rs)
///
/// Storage, moderation and image transformation all live on the host.
/// Nothing here persists across sessions.

pub mod delivery;
pub mod error;
pub mod listing;

pub use error::FetchError;

#[cfg(test)]
pub(crate) mod test_support;
