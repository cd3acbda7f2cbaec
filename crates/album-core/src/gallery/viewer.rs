//! Full-screen media viewer state.
//!
//! The viewer owns the open album and the current index. Navigation wraps in
//! both directions. Leaving a playing item yields the command the front end
//! must send to the player before swapping media.

use serde_json::json;
use tracing::{debug, warn};

use super::media::{embed_url, preview_src};
use super::{Album, MediaItem, MediaType};

/// A playback instruction for the active player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackCommand {
    /// Resume playback.
    Play,
    /// Pause, keeping position (HTML5 video).
    Pause,
    /// Stop and unload (YouTube iframe).
    Stop,
}

impl PlaybackCommand {
    /// YouTube IFrame API function name.
    #[must_use]
    pub const fn func(self) -> &'static str {
        match self {
            Self::Play => "playVideo",
            Self::Pause => "pauseVideo",
            Self::Stop => "stopVideo",
        }
    }

    /// The `postMessage` payload understood by YouTube embeds.
    #[must_use]
    pub fn to_post_message(self) -> String {
        json!({ "event": "command", "func": self.func(), "args": [] }).to_string()
    }
}

/// What the stage should render for the current item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// An `<img>` with alt text.
    Image { src: String, alt: String },
    /// A muted, autoplaying HTML5 video.
    Video { src: String },
    /// A YouTube iframe with scripted control enabled.
    YouTube { embed_url: String },
}

/// Viewer state for one open album.
#[derive(Debug, Clone)]
pub struct Viewer {
    album: Album,
    index: usize,
    origin: Option<String>,
}

impl Viewer {
    /// Opens `album` at `index` (wrapped into range).
    ///
    /// Returns `None` and logs a warning for an album without media.
    pub fn open(album: Album, index: usize) -> Option<Self> {
        if album.media.is_empty() {
            warn!(album_id = %album.id, "Album has no media; viewer not opened");
            return None;
        }
        let index = index % album.media.len();
        debug!(album_id = %album.id, index, "Viewer opened");
        Some(Self { album, index, origin: None })
    }

    /// Sets the page origin passed to YouTube embeds.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// The open album.
    pub fn album(&self) -> &Album {
        &self.album
    }

    /// Current position.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current item.
    pub fn current(&self) -> &MediaItem {
        &self.album.media[self.index]
    }

    /// Moves by `delta` with wrap-around, returning the command that stops
    /// the item being left, if it was playing media.
    pub fn step(&mut self, delta: isize) -> Option<PlaybackCommand> {
        let len = self.album.media.len() as isize;
        let next = (self.index as isize + delta).rem_euclid(len) as usize;
        self.move_to(next)
    }

    /// Next item.
    pub fn next(&mut self) -> Option<PlaybackCommand> {
        self.step(1)
    }

    /// Previous item.
    pub fn prev(&mut self) -> Option<PlaybackCommand> {
        self.step(-1)
    }

    /// Jumps to `index` (wrapped into range).
    pub fn go_to(&mut self, index: usize) -> Option<PlaybackCommand> {
        let next = index % self.album.media.len();
        self.move_to(next)
    }

    /// Horizontal swipe of `dx` pixels; anything under 40px is ignored.
    pub fn swipe(&mut self, dx: f64) -> Option<PlaybackCommand> {
        if dx.abs() <= 40.0 {
            return None;
        }
        self.step(if dx < 0.0 { 1 } else { -1 })
    }

    /// Closes the viewer, returning the stop command for playing media.
    pub fn close(self) -> Option<PlaybackCommand> {
        stop_command(self.current())
    }

    /// Preview source for the item before the current one.
    pub fn peek_prev(&self) -> String {
        let len = self.album.media.len();
        preview_src(&self.album.media[(self.index + len - 1) % len], &self.album.cover)
    }

    /// Preview source for the item after the current one.
    pub fn peek_next(&self) -> String {
        let len = self.album.media.len();
        preview_src(&self.album.media[(self.index + 1) % len], &self.album.cover)
    }

    /// What to render for the current item.
    pub fn stage(&self) -> Stage {
        let item = self.current();
        match item.media_type {
            MediaType::Image => Stage::Image { src: item.src.clone(), alt: self.album.title.clone() },
            MediaType::Video => Stage::Video { src: item.src.clone() },
            MediaType::Youtube => Stage::YouTube {
                embed_url: embed_url(&item.src, self.origin.as_deref())
                    .unwrap_or_else(|| item.src.clone()),
            },
        }
    }

    fn move_to(&mut self, next: usize) -> Option<PlaybackCommand> {
        let command = stop_command(self.current());
        self.index = next;
        debug!(album_id = %self.album.id, index = next, "Viewer moved");
        command
    }
}

fn stop_command(item: &MediaItem) -> Option<PlaybackCommand> {
    match item.media_type {
        MediaType::Image => None,
        MediaType::Video => Some(PlaybackCommand::Pause),
        MediaType::Youtube => Some(PlaybackCommand::Stop),
    }
}
