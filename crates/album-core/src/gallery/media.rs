//! Media helpers: YouTube ids, thumbnails and embed URLs.

use reqwest::Url;

use super::{Album, MediaItem, MediaType};

/// Extracts a YouTube video id from share, watch or embed URLs.
///
/// Handles `youtu.be/<id>`, `?v=<id>` and `/embed/<id>`. Returns `None` for
/// anything else, including strings that are not URLs.
pub fn youtube_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str().unwrap_or_default();

    if host.contains("youtu.be") {
        let id = parsed.path().trim_start_matches('/');
        return (!id.is_empty()).then(|| id.to_string());
    }

    if let Some((_, v)) = parsed.query_pairs().find(|(k, _)| k == "v") {
        if !v.is_empty() {
            return Some(v.into_owned());
        }
    }

    let mut segments = parsed.path_segments()?;
    segments.by_ref().find(|s| *s == "embed")?;
    segments.next().filter(|id| !id.is_empty()).map(ToString::to_string)
}

/// Thumbnail URL for a media item.
///
/// Images are their own thumbnail; YouTube items use the `hqdefault` still;
/// everything else (and malformed YouTube URLs) falls back to `fallback`,
/// normally the album cover.
pub fn thumb_for(item: &MediaItem, fallback: &str) -> String {
    match item.media_type {
        MediaType::Image => item.src.clone(),
        MediaType::Youtube => youtube_id(&item.src).map_or_else(
            || fallback.to_string(),
            |id| format!("https://img.youtube.com/vi/{id}/hqdefault.jpg"),
        ),
        MediaType::Video => fallback.to_string(),
    }
}

/// Source used for the small previous/next previews in the viewer.
pub fn preview_src(item: &MediaItem, fallback: &str) -> String {
    match item.media_type {
        MediaType::Image => item.src.clone(),
        _ => thumb_for(item, fallback),
    }
}

/// Whether the album contains anything other than images.
pub fn has_video(album: &Album) -> bool {
    album.media.iter().any(|m| m.media_type != MediaType::Image)
}

/// Embed URL with the player parameters the viewer needs for scripted control.
///
/// Existing values for the same keys are replaced. Returns `None` when `src`
/// is not a valid URL.
pub fn embed_url(src: &str, origin: Option<&str>) -> Option<String> {
    let mut url = Url::parse(src).ok()?;

    let mut params: Vec<(&str, &str)> = vec![
        ("enablejsapi", "1"),
        ("rel", "0"),
        ("modestbranding", "1"),
        ("autoplay", "1"),
        ("mute", "1"),
    ];
    if let Some(origin) = origin {
        params.push(("origin", origin));
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !params.iter().any(|(p, _)| k == p))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut().clear().extend_pairs(kept).extend_pairs(params);
    Some(url.to_string())
}
