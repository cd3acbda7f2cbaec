//! Album filtering for the grid search box.

use super::Album;
use crate::store::AiTagStore;

/// Returns the albums matching `term`, in catalog order.
///
/// The term is trimmed and lowercased, then matched as a substring against
/// title, description and curated tags, and against the AI tags stored for
/// the album. An empty term matches everything.
pub fn filter_albums<'a>(albums: &'a [Album], term: &str, ai_tags: &AiTagStore) -> Vec<&'a Album> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return albums.iter().collect();
    }

    albums
        .iter()
        .filter(|album| {
            let base =
                format!("{} {} {}", album.title, album.description, album.tags.join(" ")).to_lowercase();
            if base.contains(&needle) {
                return true;
            }
            let mut all_tags = album.tags.clone();
            all_tags.extend(ai_tags.get(&album.id));
            all_tags.join(" ").to_lowercase().contains(&needle)
        })
        .collect()
}
