//! Enrichment pipeline shared by manual add and quick search.
//!
//! `(title, explicit_url?) -> (url, thumbnail)`; the entry mode only changes
//! how the title is normalised and whether an explicit URL is honoured.

use crate::services::link_resolver::resolve_link;
use crate::services::thumbnail_resolver::ThumbnailResolver;
use crate::types::bookmark::NewBookmark;
use crate::types::settings::LinkSettings;
use crate::types::view::EntryMode;

/// Input to the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentRequest {
    pub title: String,
    pub explicit_url: Option<String>,
    pub mode: EntryMode,
}

impl EnrichmentRequest {
    pub fn manual(title: &str, explicit_url: Option<&str>) -> Self {
        Self {
            title: title.to_string(),
            explicit_url: explicit_url.map(str::to_string),
            mode: EntryMode::Manual,
        }
    }

    pub fn quick_search(title: &str) -> Self {
        Self {
            title: title.to_string(),
            explicit_url: None,
            mode: EntryMode::QuickSearch,
        }
    }
}

/// Output of the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    pub title: String,
    pub url: String,
    pub thumbnail: String,
    /// True when `url` was synthesized; the caller then opens it.
    pub generated_url: bool,
}

impl Enrichment {
    pub fn to_new_bookmark(&self) -> NewBookmark {
        NewBookmark {
            title: self.title.clone(),
            url: self.url.clone(),
            thumbnail: Some(self.thumbnail.clone()),
        }
    }
}

/// Trims the title; quick search also upper-cases its first character.
pub fn normalize_title(title: &str, mode: EntryMode) -> String {
    let trimmed = title.trim();
    match mode {
        EntryMode::Manual => trimmed.to_string(),
        EntryMode::QuickSearch => {
            let mut chars = trimmed.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

pub struct EnrichmentPipeline {
    links: LinkSettings,
    thumbnails: ThumbnailResolver,
}

impl EnrichmentPipeline {
    pub fn new(links: LinkSettings, thumbnails: ThumbnailResolver) -> Self {
        Self { links, thumbnails }
    }

    pub fn thumbnails(&self) -> &ThumbnailResolver {
        &self.thumbnails
    }

    pub fn link_settings(&self) -> &LinkSettings {
        &self.links
    }

    pub async fn enrich(&self, request: &EnrichmentRequest) -> Enrichment {
        let title = normalize_title(&request.title, request.mode);
        let explicit = match request.mode {
            EntryMode::Manual => request
                .explicit_url
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty()),
            EntryMode::QuickSearch => None,
        };

        let url = resolve_link(&title, explicit, &self.links);
        let thumbnail = self.thumbnails.resolve(&title).await;

        Enrichment {
            title,
            url,
            thumbnail,
            generated_url: explicit.is_none(),
        }
    }
}
