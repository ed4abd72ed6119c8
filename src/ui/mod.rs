/// View layer
///
/// - `grid.rs` renders committed batches and the end-of-list sentinel
/// - `lightbox.rs` renders the overlay viewer

pub mod grid;
pub mod lightbox;
