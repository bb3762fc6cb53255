//! App Core for ottmarks.
//!
//! Central struct wiring the database, settings, session context, bookmark
//! store, enrichment pipeline, link opener, voice capture and dashboard state.

use std::sync::Arc;
use std::time::Duration;

use crate::database::connection::Database;
use crate::managers::bookmark_manager::BookmarkManager;
use crate::managers::dashboard::{AddOutcome, Dashboard};
use crate::managers::session_manager::{SessionManager, SessionManagerTrait, StoredIdentityProvider};
use crate::services::enrichment::{Enrichment, EnrichmentPipeline, EnrichmentRequest};
use crate::services::image_lookup::{HttpImageLookup, ImageLookup};
use crate::services::link_resolver::{HostDelegatedOpener, LinkOpener, SystemBrowserOpener};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::thumbnail_resolver::ThumbnailResolver;
use crate::services::voice_capture::{HostSpeechRecognizer, VoiceCapture};
use crate::types::errors::{DashboardError, VoiceError};
use crate::types::session::{OAuthProvider, Session, User};
use crate::types::settings::{AppSettings, ThumbnailSource};
use crate::types::view::EntryMode;
use crate::types::voice::{RecognitionResult, VoiceOutcome};

/// Link opener selected by `links.open_in_system_browser`.
pub enum AppLinkOpener {
    System(SystemBrowserOpener),
    Host(HostDelegatedOpener),
}

impl AppLinkOpener {
    pub fn from_settings(settings: &AppSettings) -> Self {
        if settings.links.open_in_system_browser {
            AppLinkOpener::System(SystemBrowserOpener)
        } else {
            AppLinkOpener::Host(HostDelegatedOpener::new())
        }
    }

    /// URLs the UI shell still has to open. Always empty for the system opener.
    pub fn take_pending(&mut self) -> Vec<String> {
        match self {
            AppLinkOpener::System(_) => Vec::new(),
            AppLinkOpener::Host(h) => h.take_pending(),
        }
    }
}

impl LinkOpener for AppLinkOpener {
    fn open(&mut self, url: &str) -> std::io::Result<()> {
        match self {
            AppLinkOpener::System(o) => o.open(url),
            AppLinkOpener::Host(o) => o.open(url),
        }
    }
}

/// An add that passed the dashboard gate and still needs enrichment.
///
/// Enrichment may call the image lookup, so it runs without borrowing the
/// `App`; [`App::finish_add`] then stores the result.
pub struct PendingAdd {
    request: EnrichmentRequest,
    user_id: String,
    pipeline: Arc<EnrichmentPipeline>,
}

impl PendingAdd {
    pub async fn enrich(&self) -> Enrichment {
        self.pipeline.enrich(&self.request).await
    }
}

/// Central application struct.
pub struct App {
    pub db: Arc<Database>,
    pub settings_engine: SettingsEngine,
    pub session_manager: SessionManager,
    pub bookmarks: BookmarkManager,
    pub pipeline: Arc<EnrichmentPipeline>,
    pub opener: AppLinkOpener,
    pub voice: VoiceCapture<HostSpeechRecognizer>,
    pub dashboard: Dashboard,
}

impl App {
    /// Creates an App with settings from the default location.
    pub fn new(db_path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_settings(db_path, SettingsEngine::new(None))
    }

    /// Creates an App from an explicit settings engine. Loads settings first.
    pub fn with_settings(
        db_path: &str,
        mut settings_engine: SettingsEngine,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let settings = settings_engine.load()?;
        let db = Arc::new(Database::open(db_path)?);

        let identity = StoredIdentityProvider::new(db.clone(), &settings.auth.base_url);
        let session_manager = SessionManager::new(Box::new(identity));
        let bookmarks = BookmarkManager::new(db.clone());
        let pipeline = Arc::new(Self::build_pipeline(&settings)?);
        let opener = AppLinkOpener::from_settings(&settings);
        let voice = VoiceCapture::new(HostSpeechRecognizer::new(false), &settings.voice);
        let dashboard = Dashboard::new(settings.general.default_tab);

        Ok(Self {
            db,
            settings_engine,
            session_manager,
            bookmarks,
            pipeline,
            opener,
            voice,
            dashboard,
        })
    }

    fn build_pipeline(settings: &AppSettings) -> Result<EnrichmentPipeline, Box<dyn std::error::Error>> {
        let lookup: Option<Arc<dyn ImageLookup>> = match settings.thumbnails.source {
            ThumbnailSource::SearchLookup => Some(Arc::new(HttpImageLookup::new(
                &settings.thumbnails.lookup_endpoint,
                settings.thumbnails.lookup_timeout_ms.map(Duration::from_millis),
            )?)),
            ThumbnailSource::PromptSynthesis => None,
        };
        let resolver = ThumbnailResolver::new(settings.thumbnails.clone(), lookup);
        Ok(EnrichmentPipeline::new(settings.links.clone(), resolver))
    }

    /// Rebuilds settings-derived components after a settings change.
    pub fn apply_settings(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let settings = self.settings_engine.get_settings().clone();
        self.pipeline = Arc::new(Self::build_pipeline(&settings)?);
        self.opener = AppLinkOpener::from_settings(&settings);
        self.voice.apply_settings(&settings.voice);
        Ok(())
    }

    /// Startup: restore the session and, if signed in, fetch bookmarks.
    pub fn startup(&mut self) -> Result<(), DashboardError> {
        let restored = self.session_manager.initialize()?.is_some();
        if restored {
            let session = self.session_manager.session()?;
            self.dashboard.refresh(&self.bookmarks, session)?;
        }
        Ok(())
    }

    pub fn session(&self) -> Result<&Session, DashboardError> {
        Ok(self.session_manager.session()?)
    }

    pub fn begin_sign_in(&mut self, provider: Option<OAuthProvider>) -> Result<String, DashboardError> {
        let settings = self.settings_engine.get_settings();
        let provider = provider.unwrap_or(settings.auth.default_provider);
        let redirect_to = settings.auth.redirect_to.clone();
        Ok(self.session_manager.begin_sign_in(provider, &redirect_to)?)
    }

    pub fn complete_sign_in(&mut self, user: User) -> Result<(), DashboardError> {
        self.dashboard.reset();
        let session = self.session_manager.complete_sign_in(user)?;
        self.dashboard.refresh(&self.bookmarks, session)
    }

    pub fn sign_out(&mut self) -> Result<(), DashboardError> {
        self.session_manager.sign_out()?;
        self.dashboard.reset();
        Ok(())
    }

    pub fn refresh(&mut self) -> Result<(), DashboardError> {
        let session = self.session_manager.session()?;
        self.dashboard.refresh(&self.bookmarks, session)
    }

    /// Fills the manual form drafts and builds the request from them.
    pub fn prepare_manual(&mut self, title: &str, url: Option<&str>) -> Result<EnrichmentRequest, DashboardError> {
        self.session_manager.session()?;
        self.dashboard.set_draft_title(title);
        self.dashboard.set_draft_url(url.unwrap_or(""));
        Ok(self.dashboard.manual_request())
    }

    /// Quick-search request from the draft; `title` replaces the draft title
    /// when given. `None` when there is nothing to search for.
    pub fn prepare_quick_search(&mut self, title: Option<&str>) -> Result<Option<EnrichmentRequest>, DashboardError> {
        self.session_manager.session()?;
        if let Some(t) = title {
            self.dashboard.set_draft_title(t);
        }
        Ok(self.dashboard.quick_search_request())
    }

    /// Passes the dashboard gate and raises `loading`.
    pub fn begin_add(&mut self, request: EnrichmentRequest) -> Result<PendingAdd, DashboardError> {
        let user_id = self.session_manager.session()?.user_id().to_string();
        self.dashboard.begin_add(&request)?;
        Ok(PendingAdd {
            request,
            user_id,
            pipeline: Arc::clone(&self.pipeline),
        })
    }

    /// Stores an enriched add. It is dropped when the session changed since
    /// [`App::begin_add`].
    pub fn finish_add(&mut self, pending: PendingAdd, enrichment: Enrichment) -> Result<AddOutcome, DashboardError> {
        let session = match self.session_manager.session() {
            Ok(s) if s.user_id() == pending.user_id => s,
            _ => {
                log::warn!("session changed while adding '{}', dropping it", enrichment.title);
                self.dashboard.cancel_add();
                return Err(DashboardError::Unauthenticated);
            }
        };
        self.dashboard
            .finish_add(&self.bookmarks, &mut self.opener, session, pending.request.mode, enrichment)
    }

    pub fn toggle_favorite(&mut self, id: &str) -> Result<(), DashboardError> {
        let session = self.session_manager.session()?;
        self.dashboard.toggle_favorite(&self.bookmarks, session, id)
    }

    pub fn delete_bookmark(&mut self, id: &str) -> Result<(), DashboardError> {
        let session = self.session_manager.session()?;
        self.dashboard.delete(&self.bookmarks, session, id)
    }

    /// Starts voice capture. `supported` is the shell's capability report;
    /// the result chains into quick search when that entry mode is active.
    pub fn start_voice(&mut self, supported: bool) -> Result<(), VoiceError> {
        self.voice.recognizer_mut().set_available(supported);
        let quick_search = self.dashboard.entry_mode() == EntryMode::QuickSearch;
        self.voice.start(quick_search)
    }

    /// Feeds recognition results. A captured transcript becomes the draft
    /// title; a `QuickSearch` outcome asks the caller to submit after its delay.
    pub fn on_voice_result(&mut self, results: &[RecognitionResult]) -> Option<VoiceOutcome> {
        let outcome = self.voice.on_result(results)?;
        self.dashboard.set_draft_title(outcome.title());
        Some(outcome)
    }

    /// Thumbnail to render for a bookmark with no stored one.
    pub fn display_thumbnail(&self, title: &str) -> String {
        self.pipeline.thumbnails().display_thumbnail(title)
    }
}
