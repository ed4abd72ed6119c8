/// Full-screen photo viewer
///
/// Shows the full-resolution image of the selected photo with a
/// `current / total` counter. Chevrons are hidden at either end of the
/// sequence; clicking the dimmed background closes the viewer. A failed
/// full-resolution download is reported under the picture with a retry.

use iced::widget::{button, column, container, image, mouse_area, opaque, row, text, Space};
use iced::{Alignment, Color, Element, Length};

use crate::i18n::{Key, Language};
use crate::state::cache::{ImageCache, ImageSlot, Tier};
use crate::state::data::ImageResource;
use crate::state::lightbox::Direction;
use crate::Message;

/// Counter label, 1-based
pub fn counter(index: usize, total: usize) -> String {
    format!("{} / {}", index + 1, total)
}

pub fn view<'a>(
    photo: &'a ImageResource,
    index: usize,
    total: usize,
    cache: &'a ImageCache,
    language: Language,
) -> Element<'a, Message> {
    // Fall back to the grid thumbnail while the full image downloads
    let picture: Element<'a, Message> = match cache
        .handle(Tier::Full, &photo.url)
        .or_else(|| cache.handle(Tier::Thumbnail, &photo.thumbnail_url))
    {
        Some(handle) => image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        None if full_failed(cache, photo) => Space::new(Length::Fill, Length::Fill).into(),
        None => text("…").size(32).color(Color::WHITE).into(),
    };

    let status: Element<'a, Message> = if full_failed(cache, photo) {
        row![
            text(language.t(Key::FullImageFailed)).size(14).color(Color::WHITE),
            button(language.t(Key::Retry)).on_press(Message::ReloadFull).padding(6),
        ]
        .spacing(12)
        .align_y(Alignment::Center)
        .into()
    } else {
        Space::with_height(Length::Shrink).into()
    };

    let previous: Element<'a, Message> = if index > 0 {
        chevron("‹", Direction::Previous)
    } else {
        Space::with_width(Length::Fixed(48.0)).into()
    };
    let next: Element<'a, Message> = if index + 1 < total {
        chevron("›", Direction::Next)
    } else {
        Space::with_width(Length::Fixed(48.0)).into()
    };

    let close = button(text("✕").size(24).color(Color::WHITE))
        .style(button::text)
        .on_press(Message::CloseLightbox);

    let body = column![
        row![Space::with_width(Length::Fill), close],
        row![
            previous,
            opaque(container(picture).width(Length::Fill).height(Length::Fill).center_x(Length::Fill)),
            next
        ]
        .align_y(Alignment::Center)
        .spacing(16)
        .height(Length::Fill),
        opaque(container(status).center_x(Length::Fill)),
        container(text(counter(index, total)).size(14).color(Color::WHITE)).center_x(Length::Fill),
    ]
    .spacing(8)
    .padding(16);

    mouse_area(
        container(body)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(Color::from_rgba(0.0, 0.0, 0.0, 0.9).into()),
                ..Default::default()
            }),
    )
    .on_press(Message::CloseLightbox)
    .into()
}

/// The full-resolution download of `photo` ended in an error
pub fn full_failed(cache: &ImageCache, photo: &ImageResource) -> bool {
    matches!(cache.get(Tier::Full, &photo.url), Some(ImageSlot::Failed))
}

fn chevron<'a>(label: &'a str, direction: Direction) -> Element<'a, Message> {
    button(text(label).size(40).color(Color::WHITE))
        .width(Length::Fixed(48.0))
        .style(button::text)
        .on_press(Message::Navigate(direction))
        .into()
}
