/// Background music session
///
/// The memorial page plays a playlist through an external embedded player.
/// The session object owns that player's lifecycle explicitly: it is
/// constructed once by the application, initialised, becomes ready when
/// the embed endpoint answers, and is disposed when the application drops
/// it. Actions requested before the player is ready are queued and run on
/// readiness.

use std::fmt;
use tracing::{debug, info, warn};

use crate::cloud::FetchError;

/// Embed endpoint of the playlist host
const EMBED_BASE: &str = "https://www.youtube.com/embed/videoseries";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Initializing,
    Ready,
    Failed,
    Disposed,
}

/// Playback controls exposed to ready callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playback {
    pub playing: bool,
    /// The player starts muted; the first user interaction unmutes it
    pub muted: bool,
}

impl Default for Playback {
    fn default() -> Self {
        Self {
            playing: true,
            muted: true,
        }
    }
}

impl Playback {
    /// Play/pause toggle. Unmutes on first use.
    pub fn toggle(&mut self) {
        if self.muted {
            self.muted = false;
            self.playing = true;
        } else {
            self.playing = !self.playing;
        }
    }
}

type ReadyCallback = Box<dyn FnOnce(&mut Playback)>;

pub struct MediaSession {
    playlist_id: String,
    state: SessionState,
    playback: Playback,
    pending: Vec<ReadyCallback>,
}

impl MediaSession {
    pub fn new(playlist_id: impl Into<String>) -> Self {
        Self {
            playlist_id: playlist_id.into(),
            state: SessionState::Idle,
            playback: Playback::default(),
            pending: Vec::new(),
        }
    }

    pub fn embed_url(&self) -> String {
        format!(
            "{}?list={}&autoplay=1&mute=1&loop=1&controls=0",
            EMBED_BASE, self.playlist_id
        )
    }

    /// Begin loading the player. Returns the URL to load, or `None` if the
    /// session was already initialised or disposed.
    pub fn init(&mut self) -> Option<String> {
        if self.state != SessionState::Idle {
            return None;
        }
        self.state = SessionState::Initializing;
        info!(playlist = %self.playlist_id, "media session initializing");
        Some(self.embed_url())
    }

    /// Run `callback` once the player is ready (immediately if it already is)
    pub fn on_ready(&mut self, callback: impl FnOnce(&mut Playback) + 'static) {
        match self.state {
            SessionState::Ready => callback(&mut self.playback),
            SessionState::Idle | SessionState::Initializing => self.pending.push(Box::new(callback)),
            SessionState::Failed | SessionState::Disposed => {
                debug!(state = ?self.state, "media session unavailable, dropping action");
            }
        }
    }

    /// Record the outcome of loading the player
    pub fn loaded(&mut self, result: Result<(), FetchError>) {
        if self.state != SessionState::Initializing {
            return;
        }
        match result {
            Ok(()) => {
                self.state = SessionState::Ready;
                info!(queued = self.pending.len(), "media session ready");
                for callback in std::mem::take(&mut self.pending) {
                    callback(&mut self.playback);
                }
            }
            Err(err) => {
                warn!(error = %err, "media session failed to load");
                self.state = SessionState::Failed;
                self.pending.clear();
            }
        }
    }

    /// Tear down the player. Idempotent.
    pub fn dispose(&mut self) {
        if self.state == SessionState::Disposed {
            return;
        }
        self.pending.clear();
        self.playback.playing = false;
        self.state = SessionState::Disposed;
        debug!("media session disposed");
    }

    #[cfg(test)]
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }
}

impl Drop for MediaSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for MediaSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaSession")
            .field("playlist_id", &self.playlist_id)
            .field("state", &self.state)
            .field("playback", &self.playback)
            .field("pending", &self.pending.len())
            .finish()
    }
}

/// Check that the embed endpoint answers before declaring the player ready
pub async fn load_player(client: reqwest::Client, url: String) -> Result<(), FetchError> {
    let response = client.get(&url).send().await?;
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(FetchError::Status {
            status: status.as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::test_support::serve_once;

    #[test]
    fn test_actions_queue_until_ready() {
        let mut session = MediaSession::new("PL123");
        assert!(session.init().unwrap().contains("list=PL123"));
        assert_eq!(session.init(), None);

        session.on_ready(Playback::toggle);
        assert!(session.playback().muted);

        session.loaded(Ok(()));
        assert!(session.is_ready());
        assert!(!session.playback().muted);
        assert!(session.playback().playing);

        session.on_ready(Playback::toggle);
        assert!(!session.playback().playing);
    }

    #[test]
    fn test_failed_load_drops_queue() {
        let mut session = MediaSession::new("PL123");
        session.init();
        session.on_ready(Playback::toggle);
        session.loaded(Err(FetchError::Network("offline".to_string())));
        assert_eq!(session.state(), SessionState::Failed);
        assert!(session.playback().muted);
    }

    #[test]
    fn test_dispose_is_final() {
        let mut session = MediaSession::new("PL123");
        session.init();
        session.dispose();
        session.dispose();
        assert_eq!(session.state(), SessionState::Disposed);
        assert!(!session.playback().playing);

        session.loaded(Ok(()));
        assert_eq!(session.state(), SessionState::Disposed);
        assert_eq!(session.init(), None);
    }

    #[tokio::test]
    async fn test_load_player_probe() {
        let base = serve_once("200 OK", b"<html></html>".to_vec()).await;
        assert!(load_player(reqwest::Client::new(), base).await.is_ok());

        let base = serve_once("410 Gone", Vec::new()).await;
        let err = load_player(reqwest::Client::new(), base).await.unwrap_err();
        assert_eq!(err, FetchError::Status { status: 410 });
    }
}
