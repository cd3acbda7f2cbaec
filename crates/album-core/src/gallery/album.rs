//! The album catalog.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};

use super::{Album, MediaItem, MediaType};
use crate::error::{AlbumError, Result};

/// An ordered, id-unique set of albums.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    albums: Vec<Album>,
}

impl Catalog {
    /// Builds a catalog, rejecting empty or duplicate ids.
    pub fn new(albums: Vec<Album>) -> Result<Self> {
        let mut seen = HashSet::new();
        for album in &albums {
            if album.id.trim().is_empty() {
                return Err(AlbumError::Catalog(format!("album '{}' has an empty id", album.title)));
            }
            if !seen.insert(album.id.as_str()) {
                return Err(AlbumError::Catalog(format!("duplicate album id '{}'", album.id)));
            }
        }
        Ok(Self { albums })
    }

    /// The two portfolio albums shipped with the site.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            albums: vec![
                Album {
                    id: "aavss".to_string(),
                    title: "Advanced Autonomous Vehicle Safety System".to_string(),
                    cover: "https://res.cloudinary.com/dzrfpc9be/image/upload/v1755231573/IMG_8893_1_wtmgsn.jpg".to_string(),
                    description: "Patent-pending AAVSS — multi-sensor fusion (LiDAR, radar, camera), embedded AI on Jetson Nano, and real-time driver safety analytics.".to_string(),
                    tags: strings(&["AAVSS", "autonomous", "safety", "jetson", "embedded", "fusion"]),
                    media: vec![
                        MediaItem::new(MediaType::Image, "https://images.unsplash.com/photo-1503376780353-7e6692767b70?q=80&w=1600&auto=format&fit=crop"),
                        MediaItem::new(MediaType::Youtube, "https://www.youtube.com/embed/dQw4w9WgXcQ"),
                        MediaItem::new(MediaType::Image, "https://images.unsplash.com/photo-1558985040-ed4d5029c24c?q=80&w=1600&auto=format&fit=crop"),
                    ],
                },
                Album {
                    id: "dataset".to_string(),
                    title: "Sri Lanka Autonomous Driving Dataset".to_string(),
                    cover: "https://images.unsplash.com/photo-1524635962361-d7f8ae9c79b1?q=80&w=1600&auto=format&fit=crop".to_string(),
                    description: "Open driving dataset across Sri Lankan road scenarios — urban, rural, rain/fog/night. Includes lane, sign and hazard annotations.".to_string(),
                    tags: strings(&["dataset", "Sri Lanka", "traffic", "vision", "research"]),
                    media: vec![
                        MediaItem::new(MediaType::Image, "https://images.unsplash.com/photo-1483721310020-03333e577078?q=80&w=1600&auto=format&fit=crop"),
                        MediaItem::new(MediaType::Youtube, "https://www.youtube.com/embed/3JZ_D3ELwOQ"),
                        MediaItem::new(MediaType::Image, "https://images.unsplash.com/photo-1492144534655-ae79c964c9d7?q=80&w=1600&auto=format&fit=crop"),
                    ],
                },
            ],
        }
    }

    /// Loads a JSON array of albums from disk.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let albums: Vec<Album> = serde_json::from_str(&content).map_err(|e| {
            AlbumError::Catalog(format!("{}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), count = albums.len(), "Loaded album catalog");
        Self::new(albums)
    }

    /// Loads `path` when given, otherwise the builtin catalog.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::builtin()), Self::from_json_file)
    }

    /// Looks up an album by id.
    pub fn find(&self, id: &str) -> Option<&Album> {
        let found = self.albums.iter().find(|a| a.id == id);
        if found.is_none() {
            warn!(album_id = %id, "Unknown album");
        }
        found
    }

    /// All albums in display order.
    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    /// Number of albums.
    pub fn len(&self) -> usize {
        self.albums.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}
