use iced::keyboard::{self, key};
use iced::widget::scrollable::{AbsoluteOffset, Viewport};
use iced::widget::{button, column, container, row, scrollable, stack, text, Space};
use iced::{Alignment, Element, Length, Subscription, Task, Theme};
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod cloud;
mod config;
mod i18n;
mod media;
mod state;
mod ui;

use cloud::delivery::fetch_image;
use cloud::listing::fetch_listing;
use cloud::FetchError;
use config::GalleryConfig;
use i18n::{Key, Language};
use media::{MediaSession, Playback};
use state::cache::{ImageCache, Tier};
use state::data::ImageResource;
use state::gallery::{Gallery, LoadOutcome, LoadTicket};
use state::lightbox::{Direction, Lightbox, PageScroll};

/// Request timeout for the image host
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Full-resolution images kept on each side of the lightbox position
const FULL_WINDOW: usize = 1;

/// Main application state
struct MemorialGallery {
    /// Listing, batches and fetch lifecycle
    gallery: Gallery,
    /// Overlay viewer selection
    lightbox: Lightbox,
    /// Locked while the lightbox is open
    page_scroll: PageScroll,
    /// Grid offset to hold while the page scroll is locked
    scroll_offset: AbsoluteOffset,
    sentinel: ui::grid::Sentinel,
    images: ImageCache,
    media: MediaSession,
    language: Language,
    client: reqwest::Client,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// A listing request finished
    ListingLoaded(LoadTicket, Result<Vec<ImageResource>, FetchError>),
    /// Commit the next batch
    LoadMore,
    /// Discard everything and list again (also the retry action)
    Refresh,
    /// The grid scrolled
    GridScrolled(Viewport),
    /// An image download finished
    ImageLoaded(String, Result<Vec<u8>, FetchError>),
    /// A grid tile was clicked
    OpenPhoto { batch: usize, index: usize },
    Navigate(Direction),
    /// Retry the full-resolution download of the open photo
    ReloadFull,
    CloseLightbox,
    ToggleLanguage,
    /// The music player finished loading
    MediaLoaded(Result<(), FetchError>),
    ToggleMusic,
}

fn grid_id() -> scrollable::Id {
    scrollable::Id::new("gallery-grid")
}

impl MemorialGallery {
    /// Create a new instance of the application and start the first load
    fn new() -> (Self, Task<Message>) {
        let config = GalleryConfig::default();
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "http client setup failed, using defaults without timeout");
                reqwest::Client::new()
            });

        let mut app = MemorialGallery {
            media: MediaSession::new(config.playlist_id.clone()),
            gallery: Gallery::new(config),
            lightbox: Lightbox::new(),
            page_scroll: PageScroll::new(),
            scroll_offset: AbsoluteOffset::default(),
            sentinel: ui::grid::Sentinel::default(),
            images: ImageCache::new(),
            language: Language::default(),
            client,
        };

        info!(
            cloud = %app.gallery.config().cloud_name,
            tag = %app.gallery.config().tag,
            batch_size = app.gallery.config().batch_size(),
            "memorial gallery starting"
        );

        let ticket = app.gallery.begin_load();
        let listing = app.list(ticket);
        let player = match app.media.init() {
            Some(url) => Task::perform(media::load_player(app.client.clone(), url), Message::MediaLoaded),
            None => Task::none(),
        };

        (app, Task::batch([listing, player]))
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ListingLoaded(ticket, result) => match self.gallery.finish_load(ticket, result) {
                LoadOutcome::Committed { .. } => self.fetch_last_batch(),
                LoadOutcome::Failed | LoadOutcome::Stale => Task::none(),
            },
            Message::LoadMore => match self.gallery.load_more() {
                Some(_) => {
                    self.sentinel.reset();
                    self.fetch_last_batch()
                }
                None => Task::none(),
            },
            Message::Refresh => {
                self.lightbox.close();
                self.images.clear();
                self.sentinel.reset();
                let ticket = self.gallery.refresh();
                self.list(ticket)
            }
            Message::GridScrolled(viewport) => {
                self.on_scroll(viewport.absolute_offset(), ui::grid::distance_to_end(&viewport))
            }
            Message::ImageLoaded(url, result) => {
                if !self.images.complete(&url, result) {
                    debug!(%url, "dropping image for a released cache slot");
                }
                Task::none()
            }
            Message::OpenPhoto { batch, index } => {
                let batches = self.gallery.batches();
                match self.lightbox.open(batches, batch, index, &self.page_scroll) {
                    Some(global) => self.show_full(global),
                    None => Task::none(),
                }
            }
            Message::Navigate(direction) => match self.lightbox.navigate(direction, self.gallery.len()) {
                Some(global) => self.show_full(global),
                None => Task::none(),
            },
            Message::ReloadFull => match self.lightbox.index() {
                Some(global) => self.show_full(global),
                None => Task::none(),
            },
            Message::CloseLightbox => {
                self.lightbox.close();
                self.images.retain_full(&[]);
                Task::none()
            }
            Message::ToggleLanguage => {
                self.language = self.language.toggled();
                Task::none()
            }
            Message::MediaLoaded(result) => {
                self.media.loaded(result);
                Task::none()
            }
            Message::ToggleMusic => {
                self.media.on_ready(Playback::toggle);
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let language = self.language;

        let header = row![
            column![
                text(language.t(Key::Title)).size(40),
                text(language.t(Key::Subtitle)).size(16),
            ]
            .spacing(6),
            Space::with_width(Length::Fill),
            button(text(self.music_label())).on_press(Message::ToggleMusic).padding(8),
            button(language.t(Key::SwitchLanguage)).on_press(Message::ToggleLanguage).padding(8),
            button(language.t(Key::Refresh)).on_press(Message::Refresh).padding(8),
        ]
        .spacing(12)
        .align_y(Alignment::Center);

        let grid = scrollable(ui::grid::view(&self.gallery, &self.images, language))
            .id(grid_id())
            .on_scroll(Message::GridScrolled)
            .height(Length::Fill);

        let page: Element<Message> = container(column![header, grid].spacing(24))
            .padding(32)
            .width(Length::Fill)
            .height(Length::Fill)
            .into();

        let overlay = self
            .lightbox
            .index()
            .and_then(|index| self.gallery.photo(index).map(|photo| (index, photo)));

        match overlay {
            Some((index, photo)) => stack![
                page,
                ui::lightbox::view(photo, index, self.gallery.len(), &self.images, language)
            ]
            .into(),
            None => page,
        }
    }

    /// Keyboard navigation for the lightbox
    fn subscription(&self) -> Subscription<Message> {
        keyboard::on_key_press(|key, _modifiers| match key {
            keyboard::Key::Named(key::Named::ArrowLeft) => Some(Message::Navigate(Direction::Previous)),
            keyboard::Key::Named(key::Named::ArrowRight) => Some(Message::Navigate(Direction::Next)),
            keyboard::Key::Named(key::Named::Escape) => Some(Message::CloseLightbox),
            _ => None,
        })
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Light
    }

    fn music_label(&self) -> String {
        let playback = self.media.playback();
        let symbol = if !self.media.is_ready() {
            "…"
        } else if playback.playing && !playback.muted {
            "❚❚"
        } else {
            "▶"
        };
        format!("{} {}", symbol, self.language.t(Key::Music))
    }

    /// Issue the listing request for `ticket`
    fn list(&self, ticket: LoadTicket) -> Task<Message> {
        Task::perform(
            fetch_listing(self.client.clone(), self.gallery.config().clone()),
            move |result| Message::ListingLoaded(ticket, result),
        )
    }

    /// Grid scroll handling. While the page scroll is locked the grid is
    /// pinned to the saved offset and the sentinel sees nothing.
    fn on_scroll(&mut self, offset: AbsoluteOffset, distance_to_end: f32) -> Task<Message> {
        if self.page_scroll.is_locked() {
            if offset != self.scroll_offset {
                return scrollable::scroll_to(grid_id(), self.scroll_offset);
            }
            return Task::none();
        }

        self.scroll_offset = offset;
        if self.sentinel.observe(distance_to_end) {
            return self.update(Message::LoadMore);
        }
        Task::none()
    }

    /// Download thumbnails for the most recently committed batch
    fn fetch_last_batch(&mut self) -> Task<Message> {
        let urls: Vec<String> = match self.gallery.batches().last() {
            Some(batch) => batch.photos().iter().map(|photo| photo.thumbnail_url.clone()).collect(),
            None => return Task::none(),
        };
        Task::batch(urls.into_iter().map(|url| self.fetch(Tier::Thumbnail, url)))
    }

    /// Release full-resolution images outside the window around `index`,
    /// then download the one at `index`
    fn show_full(&mut self, index: usize) -> Task<Message> {
        let start = index.saturating_sub(FULL_WINDOW);
        let window: Vec<String> = (start..=index + FULL_WINDOW)
            .filter_map(|i| self.gallery.photo(i).map(|photo| photo.url.clone()))
            .collect();
        self.images.retain_full(&window);

        match self.gallery.photo(index).map(|photo| photo.url.clone()) {
            Some(url) => self.fetch(Tier::Full, url),
            None => Task::none(),
        }
    }

    fn fetch(&mut self, tier: Tier, url: String) -> Task<Message> {
        if !self.images.request(tier, &url) {
            return Task::none();
        }
        Task::perform(fetch_image(self.client.clone(), url.clone()), move |result| {
            Message::ImageLoaded(url.clone(), result)
        })
    }
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("memorial_gallery=info")),
        )
        .init();

    iced::application("Memorial Gallery", MemorialGallery::update, MemorialGallery::view)
        .subscription(MemorialGallery::subscription)
        .theme(MemorialGallery::theme)
        .centered()
        .run_with(MemorialGallery::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use state::cache::ImageSlot;

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

    fn loaded(count: usize) -> MemorialGallery {
        let (mut app, _) = MemorialGallery::new();
        let ticket = app.gallery.begin_load();
        let _ = app.update(Message::ListingLoaded(ticket, Ok(resources(count))));
        app
    }

    fn full_url(app: &MemorialGallery, index: usize) -> String {
        app.gallery.photo(index).map(|photo| photo.url.clone()).unwrap()
    }

    #[test]
    fn test_navigation_releases_distant_full_images() {
        let mut app = loaded(30);
        let first = full_url(&app, 0);

        let _ = app.update(Message::OpenPhoto { batch: 0, index: 0 });
        assert!(matches!(app.images.get(Tier::Full, &first), Some(ImageSlot::Pending)));
        let _ = app.update(Message::ImageLoaded(first.clone(), Ok(vec![0; 64])));

        let _ = app.update(Message::Navigate(Direction::Next));
        assert!(app.images.handle(Tier::Full, &first).is_some());

        let _ = app.update(Message::Navigate(Direction::Next));
        assert_eq!(app.lightbox.index(), Some(2));
        assert!(app.images.get(Tier::Full, &first).is_none());
        assert!(app.images.get(Tier::Full, &full_url(&app, 2)).is_some());

        // The first download finishing late is not cached again
        let _ = app.update(Message::ImageLoaded(first.clone(), Ok(vec![0; 64])));
        assert!(app.images.get(Tier::Full, &first).is_none());

        let _ = app.update(Message::CloseLightbox);
        assert_eq!(app.images.full_len(), 0);
        // Thumbnails stay for the session
        let thumbnail = app.gallery.photo(0).map(|photo| photo.thumbnail_url.clone()).unwrap();
        assert!(app.images.get(Tier::Thumbnail, &thumbnail).is_some());
    }

    #[test]
    fn test_locked_scroll_never_loads_more() {
        let mut app = loaded(30);
        let _ = app.update(Message::OpenPhoto { batch: 0, index: 3 });
        assert!(app.page_scroll.is_locked());

        let _ = app.on_scroll(AbsoluteOffset { x: 0.0, y: 900.0 }, 0.0);
        assert_eq!(app.gallery.cursor(), 12);
        assert_eq!(app.scroll_offset, AbsoluteOffset::default());
    }

    #[test]
    fn test_refresh_closes_lightbox_and_unlocks_scroll() {
        let mut app = loaded(30);
        let _ = app.update(Message::OpenPhoto { batch: 0, index: 5 });
        assert!(app.lightbox.is_open());

        let _ = app.update(Message::Refresh);
        assert!(!app.lightbox.is_open());
        assert!(!app.page_scroll.is_locked());
        assert!(app.gallery.is_empty());
        assert!(app.gallery.is_loading());
        assert_eq!(app.images.full_len(), 0);
    }

    #[test]
    fn test_sentinel_scroll_appends_batches() {
        let mut app = loaded(30);

        let _ = app.on_scroll(AbsoluteOffset { x: 0.0, y: 100.0 }, 1500.0);
        assert_eq!(app.gallery.cursor(), 12);
        assert_eq!(app.scroll_offset, AbsoluteOffset { x: 0.0, y: 100.0 });

        let _ = app.on_scroll(AbsoluteOffset { x: 0.0, y: 1200.0 }, 300.0);
        assert_eq!(app.gallery.cursor(), 24);

        let _ = app.on_scroll(AbsoluteOffset { x: 0.0, y: 1300.0 }, 200.0);
        assert_eq!(app.gallery.cursor(), 30);
        assert!(!app.gallery.has_more());

        let _ = app.on_scroll(AbsoluteOffset { x: 0.0, y: 2000.0 }, 2000.0);
        let _ = app.on_scroll(AbsoluteOffset { x: 0.0, y: 2600.0 }, 0.0);
        assert_eq!(app.gallery.cursor(), 30);
    }

    #[test]
    fn test_failed_full_image_can_be_retried() {
        let mut app = loaded(30);
        let url = full_url(&app, 0);

        let _ = app.update(Message::OpenPhoto { batch: 0, index: 0 });
        let _ = app.update(Message::ImageLoaded(url.clone(), Err(FetchError::Status { status: 503 })));
        assert!(matches!(app.images.get(Tier::Full, &url), Some(ImageSlot::Failed)));

        let _ = app.update(Message::ReloadFull);
        assert!(matches!(app.images.get(Tier::Full, &url), Some(ImageSlot::Pending)));
    }
}
