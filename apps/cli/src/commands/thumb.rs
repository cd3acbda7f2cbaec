//! `album thumb`: thumbnail and embed URLs for a media URL.

use album_core::gallery::{MediaItem, MediaType, embed_url, thumb_for, youtube_id};
use anyhow::Result;
use serde_json::json;

/// Prints the thumbnail for `url`, falling back to `fallback`.
///
/// The media type is `kind` when given, otherwise YouTube for URLs a video
/// id can be read from and image for everything else.
pub fn execute(url: &str, kind: Option<MediaType>, fallback: &str, json_output: bool) -> Result<()> {
    let media_type = kind.unwrap_or_else(|| {
        if youtube_id(url).is_some() { MediaType::Youtube } else { MediaType::Image }
    });
    let item = MediaItem::new(media_type, url);
    let thumb = thumb_for(&item, fallback);
    let embed = (media_type == MediaType::Youtube).then(|| embed_url(url, None)).flatten();

    if json_output {
        println!(
            "{}",
            json!({ "type": media_type, "thumb": thumb, "youtubeId": youtube_id(url), "embed": embed })
        );
    } else {
        println!("{thumb}");
        if let Some(embed) = embed {
            println!("{embed}");
        }
    }
    Ok(())
}
