/// State management module
///
/// This module handles all gallery state, including:
/// - Shared data structures (data.rs)
/// - The listing fetch lifecycle and batch pagination (gallery.rs)
/// - Lightbox selection and the page-scroll lock (lightbox.rs)
/// - Downloaded image handles for the session (cache.rs)

pub mod cache;
pub mod data;
pub mod gallery;
pub mod lightbox;
