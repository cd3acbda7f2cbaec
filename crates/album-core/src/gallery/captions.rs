//! Background captioning of album images.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{Album, Caption, MediaType};
use crate::error::Result;
use crate::store::{AiTagStore, CaptionStore};

/// Anything that can caption an image URL.
///
/// Implemented by the in-process AI service and by the CLI's HTTP client.
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Produces a caption and tags for `image_url`.
    async fn caption(&self, image_url: &str) -> Result<Caption>;
}

/// Outcome of captioning one album.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptionReport {
    /// `(media index, image URL, caption)` for each captioned image.
    pub captions: Vec<(usize, String, Caption)>,
    /// Union of all tags, first occurrence order.
    pub tags: Vec<String>,
    /// Images served from the local caption store.
    pub cached: usize,
    /// Images that could not be captioned.
    pub failed: usize,
}

/// Captions every image in `album`, reusing stored captions.
///
/// New captions are written to `captions`; the union of all tags replaces the
/// album's entry in `ai_tags`. A failure on one image is logged and skipped.
pub async fn caption_album(
    album: &Album,
    source: &dyn CaptionSource,
    captions: &CaptionStore,
    ai_tags: &AiTagStore,
) -> CaptionReport {
    let mut report = CaptionReport::default();

    for (index, item) in album.media.iter().enumerate() {
        if item.media_type != MediaType::Image {
            continue;
        }

        let caption = if let Some(stored) = captions.get(&item.src) {
            report.cached += 1;
            stored
        } else {
            match source.caption(&item.src).await {
                Ok(fresh) => {
                    captions.set(&item.src, &fresh);
                    fresh
                }
                Err(e) => {
                    warn!(album_id = %album.id, url = %item.src, error = %e, "Caption failed");
                    report.failed += 1;
                    continue;
                }
            }
        };

        for tag in &caption.tags {
            if !report.tags.contains(tag) {
                report.tags.push(tag.clone());
            }
        }
        report.captions.push((index, item.src.clone(), caption));
    }

    ai_tags.set(&album.id, &report.tags);
    debug!(
        album_id = %album.id,
        captioned = report.captions.len(),
        cached = report.cached,
        failed = report.failed,
        "Album captioning finished"
    );
    report
}
