//! Plain-text album summary sent as `context` with ask requests.

use super::Album;

/// Renders the `Title/Description/Tags/Media` block for an album.
pub fn build_album_context(album: &Album) -> String {
    let media_lines = album
        .media
        .iter()
        .enumerate()
        .map(|(i, m)| {
            if m.src.is_empty() {
                format!("{}. {}", i + 1, m.media_type)
            } else {
                format!("{}. {}:{}", i + 1, m.media_type, m.src)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    [
        format!("Title: {}", album.title),
        format!("Description: {}", album.description),
        format!("Tags: {}", album.tags.join(", ")),
        format!("Media:\n{media_lines}"),
    ]
    .join("\n")
}
