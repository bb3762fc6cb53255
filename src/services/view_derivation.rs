// ottmarks view derivation
// Filters the stored collection by search text and tab. Order is inherited from
// the store and never changed here.

use crate::types::bookmark::Bookmark;
use crate::types::view::ViewTab;

/// Returns the bookmarks to render.
///
/// Keeps titles containing `search_text` (case-insensitive; empty matches all),
/// then, on the favorites tab, only favorites.
pub fn derive(all: &[Bookmark], search_text: &str, tab: ViewTab) -> Vec<Bookmark> {
    let needle = search_text.to_lowercase();
    all.iter()
        .filter(|b| b.title.to_lowercase().contains(&needle))
        .filter(|b| match tab {
            ViewTab::All => true,
            ViewTab::Favorites => b.favorite,
        })
        .cloned()
        .collect()
}
