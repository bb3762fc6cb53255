use serde::{Deserialize, Serialize};

/// Top-level settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppSettings {
    pub general: GeneralSettings,
    pub thumbnails: ThumbnailSettings,
    pub links: LinkSettings,
    pub voice: VoiceSettings,
    pub auth: AuthSettings,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralSettings {
    /// Database file name inside the data directory.
    pub database_file: String,
    pub default_tab: super::view::ViewTab,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            database_file: "ottmarks.db".to_string(),
            default_tab: super::view::ViewTab::All,
        }
    }
}

/// Which strategy resolves a bookmark thumbnail.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ThumbnailSource {
    /// Build an image-generation prompt from the title.
    PromptSynthesis,
    /// Ask the image-lookup endpoint, falling back to a keyword photo.
    SearchLookup,
}

/// Thumbnail resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThumbnailSettings {
    pub source: ThumbnailSource,
    pub image_gen_base: String,
    pub lookup_endpoint: String,
    #[serde(default)]
    pub lookup_timeout_ms: Option<u64>,
    pub keyword_photo_base: String,
    pub avatar_base: String,
    pub seeded_photo_base: String,
    pub shape_base: String,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            source: ThumbnailSource::PromptSynthesis,
            image_gen_base: "https://image.pollinations.ai".to_string(),
            lookup_endpoint: "http://localhost:3000/api/thumbnail".to_string(),
            lookup_timeout_ms: None,
            keyword_photo_base: "https://loremflickr.com".to_string(),
            avatar_base: "https://ui-avatars.com".to_string(),
            seeded_photo_base: "https://picsum.photos".to_string(),
            shape_base: "https://api.dicebear.com".to_string(),
        }
    }
}

/// How a link is synthesized when the user gives none.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LinkMode {
    /// A plain search-results URL.
    Search,
    /// The provider's "first result" variant of the search URL.
    FirstResult,
}

/// Link resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkSettings {
    pub mode: LinkMode,
    pub search_base: String,
    /// Open generated links in the system browser from the core itself.
    /// When false the URL is handed back to the UI shell instead.
    pub open_in_system_browser: bool,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            mode: LinkMode::Search,
            search_base: "https://www.google.com/search".to_string(),
            open_in_system_browser: false,
        }
    }
}

/// Voice capture settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoiceSettings {
    pub language: String,
    pub quick_search_delay_ms: u64,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            quick_search_delay_ms: 500,
        }
    }
}

/// Identity collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSettings {
    pub base_url: String,
    pub default_provider: super::session::OAuthProvider,
    pub redirect_to: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321/auth/v1".to_string(),
            default_provider: super::session::OAuthProvider::Google,
            redirect_to: "http://localhost:3000/dashboard".to_string(),
        }
    }
}
