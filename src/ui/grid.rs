/// Batched photo grid
///
/// Each committed batch is laid out in its own `Wrap` container. Appending
/// a batch adds a new container below the others, so photos already on
/// screen never move when more arrive. Never merge batches into a single
/// container.

use iced::widget::scrollable::Viewport;
use iced::widget::{button, column, container, image, text, Column};
use iced::{Alignment, Color, Element, Length};
use iced_aw::Wrap;

use crate::i18n::{Key, Language};
use crate::state::cache::{ImageCache, ImageSlot, Tier};
use crate::state::data::{Batch, ImageResource};
use crate::state::gallery::Gallery;
use crate::Message;

/// Width of a grid tile in logical pixels
const TILE_WIDTH: f32 = 240.0;

/// Spacing between tiles and between batches
const GAP: f32 = 12.0;

/// How close to the end of the content the sentinel counts as visible
const SENTINEL_MARGIN: f32 = 400.0;

/// End-of-list visibility sentinel
///
/// Scroll events arrive in bursts. The sentinel only reports the moment it
/// goes from hidden to visible, so one approach to the end of the list
/// asks for one batch.
#[derive(Debug, Default)]
pub struct Sentinel {
    visible: bool,
}

impl Sentinel {
    /// Feed the distance between the viewport bottom and the content end.
    /// Returns true when the sentinel just became visible.
    pub fn observe(&mut self, distance_to_end: f32) -> bool {
        let visible = distance_to_end <= SENTINEL_MARGIN;
        let appeared = visible && !self.visible;
        self.visible = visible;
        appeared
    }

    /// Forget the last observation (after the list grew or was cleared)
    pub fn reset(&mut self) {
        self.visible = false;
    }
}

/// Pixels left to scroll before reaching the end of the content
pub fn distance_to_end(viewport: &Viewport) -> f32 {
    let offset = viewport.absolute_offset().y;
    let remaining = viewport.content_bounds().height - viewport.bounds().height - offset;
    remaining.max(0.0)
}

/// The whole grid: one block per batch, then the list footer
pub fn view<'a>(gallery: &'a Gallery, cache: &'a ImageCache, language: Language) -> Element<'a, Message> {
    let mut blocks: Column<'a, Message> = column![].spacing(GAP).width(Length::Fill);

    for batch in gallery.batches() {
        blocks = blocks.push(batch_view(batch, cache));
    }

    blocks.push(footer(gallery, language)).into()
}

fn batch_view<'a>(batch: &'a Batch, cache: &'a ImageCache) -> Element<'a, Message> {
    let tiles: Vec<Element<'a, Message>> = batch
        .photos()
        .iter()
        .enumerate()
        .map(|(index, photo)| tile(batch.index(), index, photo, cache))
        .collect();

    container(Wrap::with_elements(tiles).spacing(GAP).line_spacing(GAP))
        .width(Length::Fill)
        .into()
}

fn tile<'a>(batch: usize, index: usize, photo: &'a ImageResource, cache: &'a ImageCache) -> Element<'a, Message> {
    let height = TILE_WIDTH / photo.aspect_ratio();

    let content: Element<'a, Message> = match cache.get(Tier::Thumbnail, &photo.thumbnail_url) {
        Some(ImageSlot::Ready(handle)) => image(handle.clone())
            .width(Length::Fixed(TILE_WIDTH))
            .height(Length::Fixed(height))
            .into(),
        Some(ImageSlot::Failed) => placeholder(height, "!"),
        Some(ImageSlot::Pending) | None => placeholder(height, ""),
    };

    button(content)
        .padding(0)
        .style(button::text)
        .on_press(Message::OpenPhoto { batch, index })
        .into()
}

fn placeholder<'a>(height: f32, label: &'a str) -> Element<'a, Message> {
    container(text(label).size(20))
        .width(Length::Fixed(TILE_WIDTH))
        .height(Length::Fixed(height))
        .center_x(Length::Fixed(TILE_WIDTH))
        .center_y(Length::Fixed(height))
        .style(|_theme| container::Style {
            background: Some(Color::from_rgb(0.93, 0.90, 0.85).into()),
            ..Default::default()
        })
        .into()
}

fn footer<'a>(gallery: &'a Gallery, language: Language) -> Element<'a, Message> {
    let content: Element<'a, Message> = if gallery.is_loading() {
        text(language.t(Key::Loading)).size(16).into()
    } else if let Some(err) = gallery.error() {
        column![
            text(format!("{}: {}", language.t(Key::LoadError), err)).size(16),
            button(language.t(Key::Retry))
                .on_press(Message::Refresh)
                .padding(10),
        ]
        .spacing(10)
        .align_x(Alignment::Center)
        .into()
    } else if gallery.is_empty() {
        text(language.t(Key::Placeholder)).size(16).into()
    } else if gallery.has_more() {
        button(language.t(Key::LoadMore))
            .on_press(Message::LoadMore)
            .padding(10)
            .into()
    } else {
        text(language.t(Key::EndOfGallery)).size(14).into()
    };

    container(content)
        .width(Length::Fill)
        .center_x(Length::Fill)
        .padding(20)
        .into()
}
