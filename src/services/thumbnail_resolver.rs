//! Thumbnail Resolver for ottmarks.
//!
//! Turns a bookmark title into an image URL. Two strategies exist, chosen by
//! [`ThumbnailSource`]:
//!
//! - prompt synthesis: classify the title and build an image-generation URL;
//! - search lookup: ask an [`ImageLookup`] collaborator, falling back to a
//!   keyword photo URL.
//!
//! Independently of the strategy, [`ThumbnailFallbackChain`] describes what
//! the display layer substitutes when an image fails to load.

use std::sync::Arc;

use crate::services::image_lookup::ImageLookup;
use crate::types::settings::{ThumbnailSettings, ThumbnailSource};

/// Fixed square size requested from every image source.
pub const THUMBNAIL_SIZE: u32 = 800;

/// Content category inferred from a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleCategory {
    Music,
    Movie,
    Series,
    Other,
}

impl TitleCategory {
    /// Case-insensitive keyword classification. Earlier categories win.
    pub fn classify(title: &str) -> Self {
        let lowered = title.to_lowercase();
        if lowered.contains("song") || lowered.contains("music") {
            TitleCategory::Music
        } else if lowered.contains("movie") || lowered.contains("film") {
            TitleCategory::Movie
        } else if lowered.contains("show") || lowered.contains("series") {
            TitleCategory::Series
        } else {
            TitleCategory::Other
        }
    }

    pub fn prompt_suffix(&self) -> Option<&'static str> {
        match self {
            TitleCategory::Music => Some("music album cover vibrant"),
            TitleCategory::Movie => Some("movie poster cinematic"),
            TitleCategory::Series => Some("tv series poster"),
            TitleCategory::Other => None,
        }
    }
}

/// Builds the image-generation prompt for a title.
pub fn synthesize_prompt(title: &str) -> String {
    match TitleCategory::classify(title).prompt_suffix() {
        Some(suffix) => format!("{} {}", title, suffix),
        None => title.to_string(),
    }
}

/// Resolves thumbnails according to the configured strategy.
pub struct ThumbnailResolver {
    settings: ThumbnailSettings,
    lookup: Option<Arc<dyn ImageLookup>>,
}

impl ThumbnailResolver {
    /// `lookup` is only consulted in search-lookup mode.
    pub fn new(settings: ThumbnailSettings, lookup: Option<Arc<dyn ImageLookup>>) -> Self {
        Self { settings, lookup }
    }

    pub fn source(&self) -> ThumbnailSource {
        self.settings.source
    }

    pub fn prompt_url(&self, title: &str) -> String {
        format!(
            "{}/prompt/{}?width={size}&height={size}&nologo=true",
            self.settings.image_gen_base.trim_end_matches('/'),
            urlencoding::encode(&synthesize_prompt(title)),
            size = THUMBNAIL_SIZE
        )
    }

    pub fn keyword_photo_url(&self, title: &str) -> String {
        format!(
            "{}/{size}/{size}/{}",
            self.settings.keyword_photo_base.trim_end_matches('/'),
            urlencoding::encode(title.trim()),
            size = THUMBNAIL_SIZE
        )
    }

    pub fn avatar_url(&self, title: &str) -> String {
        format!(
            "{}/api/?name={}&size={}&background=random&bold=true",
            self.settings.avatar_base.trim_end_matches('/'),
            urlencoding::encode(title),
            THUMBNAIL_SIZE
        )
    }

    pub fn seeded_photo_url(&self, title: &str) -> String {
        format!(
            "{}/seed/{}/{size}/{size}",
            self.settings.seeded_photo_base.trim_end_matches('/'),
            urlencoding::encode(title),
            size = THUMBNAIL_SIZE
        )
    }

    pub fn seeded_shape_url(&self, title: &str) -> String {
        format!(
            "{}/7.x/shapes/svg?seed={}",
            self.settings.shape_base.trim_end_matches('/'),
            urlencoding::encode(title)
        )
    }

    /// Thumbnail for a stored bookmark that has none. Never touches the network.
    pub fn display_thumbnail(&self, title: &str) -> String {
        match self.settings.source {
            ThumbnailSource::PromptSynthesis => self.prompt_url(title),
            ThumbnailSource::SearchLookup => self.keyword_photo_url(title),
        }
    }

    /// Resolves the thumbnail for a new bookmark.
    pub async fn resolve(&self, title: &str) -> String {
        match self.settings.source {
            ThumbnailSource::PromptSynthesis => self.prompt_url(title),
            ThumbnailSource::SearchLookup => {
                let Some(lookup) = &self.lookup else {
                    log::debug!("no image lookup configured, using keyword photo");
                    return self.keyword_photo_url(title);
                };
                match lookup.lookup(title).await {
                    Ok(Some(url)) => url,
                    Ok(None) => {
                        log::debug!("image lookup returned nothing for '{}'", title);
                        self.keyword_photo_url(title)
                    }
                    Err(e) => {
                        log::error!("image lookup failed for '{}': {}", title, e);
                        self.keyword_photo_url(title)
                    }
                }
            }
        }
    }

    /// Builds the display fallback chain that starts at `primary`.
    pub fn fallback_chain(&self, primary: &str, title: &str) -> ThumbnailFallbackChain {
        ThumbnailFallbackChain::new(vec![
            primary.to_string(),
            self.avatar_url(title),
            self.seeded_photo_url(title),
            self.seeded_shape_url(title),
        ])
    }
}

/// Ordered image sources tried once each when a load fails.
///
/// The chain only moves forward: after the last source fails it stays there
/// and reports exhaustion.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailFallbackChain {
    sources: Vec<String>,
    cursor: usize,
    exhausted: bool,
}

impl ThumbnailFallbackChain {
    /// Blank and repeated sources are dropped so none is tried twice.
    pub fn new(sources: Vec<String>) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(sources.len());
        for s in sources {
            if !s.trim().is_empty() && !unique.contains(&s) {
                unique.push(s);
            }
        }
        Self {
            sources: unique,
            cursor: 0,
            exhausted: false,
        }
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// The source currently displayed.
    pub fn current(&self) -> Option<&str> {
        self.sources.get(self.cursor).map(String::as_str)
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Records a load failure of the current source and returns the
    /// replacement, or `None` once every source has failed.
    pub fn on_load_failure(&mut self) -> Option<&str> {
        if self.cursor + 1 < self.sources.len() {
            self.cursor += 1;
            self.current()
        } else {
            self.exhausted = true;
            None
        }
    }

    /// Stateless step: the source to show after `failed` did not load.
    ///
    /// A source outside the chain is treated as the primary.
    pub fn next_after(&self, failed: &str) -> Option<&str> {
        let next = match self.sources.iter().position(|s| s == failed) {
            Some(i) => i + 1,
            None => 1,
        };
        self.sources.get(next).map(String::as_str)
    }
}
