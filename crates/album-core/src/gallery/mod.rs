//! Portfolio gallery model.
//!
//! Albums are static data: a cover, a description, tags and an ordered list of
//! media items. Everything here is pure and synchronous apart from
//! `captions::caption_album`, which talks to a `CaptionSource`.

pub mod album;
pub mod captions;
pub mod context;
pub mod media;
pub mod search;
pub mod viewer;

use serde::{Deserialize, Serialize};

pub use album::Catalog;
pub use captions::{CaptionReport, CaptionSource, caption_album};
pub use context::build_album_context;
pub use media::{embed_url, has_video, preview_src, thumb_for, youtube_id};
pub use search::filter_albums;
pub use viewer::{PlaybackCommand, Stage, Viewer};

/// Kind of a media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// A still image.
    Image,
    /// An HTML5 video file.
    Video,
    /// A YouTube embed or watch URL.
    Youtube,
}

impl MediaType {
    /// Lowercase name as it appears in album JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Youtube => "youtube",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in an album.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// What kind of media this is.
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Source URL.
    #[serde(default)]
    pub src: String,
}

impl MediaItem {
    /// Convenience constructor.
    pub fn new(media_type: MediaType, src: impl Into<String>) -> Self {
        Self { media_type, src: src.into() }
    }
}

/// A portfolio album.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    /// Stable identifier ("aavss", "dataset").
    pub id: String,
    /// Display title.
    pub title: String,
    /// Cover image URL, also the thumbnail fallback.
    #[serde(default)]
    pub cover: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Curated tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Media in display order.
    #[serde(default)]
    pub media: Vec<MediaItem>,
}

/// A caption with derived tags, as returned by the caption endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caption {
    /// One-sentence description of the image.
    #[serde(default)]
    pub caption: String,
    /// Short lowercase-ish tags.
    #[serde(default)]
    pub tags: Vec<String>,
}
