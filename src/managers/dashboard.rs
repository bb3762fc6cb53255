//! Dashboard state for ottmarks.
//!
//! Holds the in-memory side of the bookmark grid: the last fetched
//! collection, the add-form drafts, search text, tab, entry mode and the
//! `loading` flag that gates add controls. Every mutation goes through the
//! store and is followed by a full re-fetch; fetches carry a [`FetchTicket`]
//! and results older than the last applied one are dropped.

use crate::managers::bookmark_manager::BookmarkManagerTrait;
use crate::services::enrichment::{Enrichment, EnrichmentPipeline, EnrichmentRequest};
use crate::services::link_resolver::LinkOpener;
use crate::services::view_derivation::derive;
use crate::types::bookmark::Bookmark;
use crate::types::errors::DashboardError;
use crate::types::session::Session;
use crate::types::view::{EntryMode, FetchTicket, ViewTab};

/// Result of a successful add.
#[derive(Debug, Clone, PartialEq)]
pub struct AddOutcome {
    pub id: String,
    pub enrichment: Enrichment,
    /// Set when the generated URL was handed to the link opener.
    pub opened_url: Option<String>,
}

pub struct Dashboard {
    bookmarks: Vec<Bookmark>,
    draft_title: String,
    draft_url: String,
    search_text: String,
    tab: ViewTab,
    mode: EntryMode,
    loading: bool,
    issued_fetch: u64,
    applied_fetch: u64,
}

impl Dashboard {
    pub fn new(default_tab: ViewTab) -> Self {
        Self {
            bookmarks: Vec::new(),
            draft_title: String::new(),
            draft_url: String::new(),
            search_text: String::new(),
            tab: default_tab,
            mode: EntryMode::Manual,
            loading: false,
            issued_fetch: 0,
            applied_fetch: 0,
        }
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn draft_title(&self) -> &str {
        &self.draft_title
    }

    pub fn draft_url(&self) -> &str {
        &self.draft_url
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn tab(&self) -> ViewTab {
        self.tab
    }

    pub fn entry_mode(&self) -> EntryMode {
        self.mode
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_search(&mut self, text: &str) {
        self.search_text = text.to_string();
    }

    pub fn set_tab(&mut self, tab: ViewTab) {
        self.tab = tab;
    }

    pub fn set_entry_mode(&mut self, mode: EntryMode) {
        self.mode = mode;
    }

    pub fn set_draft_title(&mut self, title: &str) {
        self.draft_title = title.to_string();
    }

    pub fn set_draft_url(&mut self, url: &str) {
        self.draft_url = url.to_string();
    }

    /// The sequence to render.
    pub fn visible(&self) -> Vec<Bookmark> {
        derive(&self.bookmarks, &self.search_text, self.tab)
    }

    /// Clears all per-user state. Called on sign-out.
    pub fn reset(&mut self) {
        let tab = self.tab;
        *self = Self::new(tab);
    }

    /// Issues a ticket for a fetch about to start.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued_fetch += 1;
        FetchTicket(self.issued_fetch)
    }

    /// Replaces the collection with a fetch result unless a newer fetch was
    /// already applied. Returns whether the result was applied.
    pub fn apply_fetch(&mut self, ticket: FetchTicket, items: Vec<Bookmark>) -> bool {
        if ticket.0 <= self.applied_fetch {
            log::debug!(
                "discarding stale fetch #{} (last applied #{})",
                ticket.0,
                self.applied_fetch
            );
            return false;
        }
        self.applied_fetch = ticket.0;
        self.bookmarks = items;
        true
    }

    /// Re-fetches the whole collection from the store.
    pub fn refresh(
        &mut self,
        store: &dyn BookmarkManagerTrait,
        session: &Session,
    ) -> Result<(), DashboardError> {
        let ticket = self.begin_fetch();
        let items = store.list_bookmarks(session).map_err(|e| {
            log::error!("Error fetching bookmarks: {}", e);
            DashboardError::from(e)
        })?;
        self.apply_fetch(ticket, items);
        Ok(())
    }

    /// Enriches, stores and re-fetches a new bookmark.
    pub async fn add_bookmark(
        &mut self,
        store: &dyn BookmarkManagerTrait,
        pipeline: &EnrichmentPipeline,
        opener: &mut dyn LinkOpener,
        session: &Session,
        request: EnrichmentRequest,
    ) -> Result<AddOutcome, DashboardError> {
        self.begin_add(&request)?;
        let enrichment = pipeline.enrich(&request).await;
        self.finish_add(store, opener, session, request.mode, enrichment)
    }

    /// First half of an add: rejects it while another is in flight or when
    /// the title is blank, otherwise raises `loading`.
    ///
    /// Every successful call must be paired with [`Dashboard::finish_add`]
    /// or [`Dashboard::cancel_add`].
    pub fn begin_add(&mut self, request: &EnrichmentRequest) -> Result<(), DashboardError> {
        if self.loading {
            return Err(DashboardError::Busy);
        }
        if request.title.trim().is_empty() {
            return Err(DashboardError::Validation("Please enter a title".to_string()));
        }
        self.loading = true;
        Ok(())
    }

    /// Second half of an add: opens a generated link, inserts, clears the
    /// drafts and re-fetches. `loading` is lowered whatever the outcome.
    pub fn finish_add(
        &mut self,
        store: &dyn BookmarkManagerTrait,
        opener: &mut dyn LinkOpener,
        session: &Session,
        mode: EntryMode,
        enrichment: Enrichment,
    ) -> Result<AddOutcome, DashboardError> {
        let result = self.store_enriched(store, opener, session, mode, enrichment);
        self.loading = false;
        result
    }

    /// Abandons an add started with [`Dashboard::begin_add`].
    pub fn cancel_add(&mut self) {
        self.loading = false;
    }

    fn store_enriched(
        &mut self,
        store: &dyn BookmarkManagerTrait,
        opener: &mut dyn LinkOpener,
        session: &Session,
        mode: EntryMode,
        enrichment: Enrichment,
    ) -> Result<AddOutcome, DashboardError> {
        let mut opened_url = None;
        if enrichment.generated_url {
            match opener.open(&enrichment.url) {
                Ok(()) => opened_url = Some(enrichment.url.clone()),
                Err(e) => log::warn!("could not open {}: {}", enrichment.url, e),
            }
        }

        let id = store
            .add_bookmark(session, &enrichment.to_new_bookmark())
            .map_err(|e| {
                log::error!("Error adding bookmark: {}", e);
                DashboardError::from(e)
            })?;

        self.draft_title.clear();
        if mode == EntryMode::Manual {
            self.draft_url.clear();
        }

        // The insert is committed; a failed re-fetch only leaves the view stale.
        if let Err(e) = self.refresh(store, session) {
            log::error!("re-fetch after add failed: {}", e);
        }

        Ok(AddOutcome {
            id,
            enrichment,
            opened_url,
        })
    }

    /// Request built from the manual form drafts.
    pub fn manual_request(&self) -> EnrichmentRequest {
        EnrichmentRequest::manual(&self.draft_title, Some(&self.draft_url))
    }

    /// Quick-search request from the draft title; `None` when it is blank.
    pub fn quick_search_request(&self) -> Option<EnrichmentRequest> {
        if self.draft_title.trim().is_empty() {
            return None;
        }
        Some(EnrichmentRequest::quick_search(&self.draft_title))
    }

    /// Submits the manual form using the draft title and url.
    pub async fn submit_manual(
        &mut self,
        store: &dyn BookmarkManagerTrait,
        pipeline: &EnrichmentPipeline,
        opener: &mut dyn LinkOpener,
        session: &Session,
    ) -> Result<AddOutcome, DashboardError> {
        let request = self.manual_request();
        self.add_bookmark(store, pipeline, opener, session, request).await
    }

    /// Submits quick search with the draft title. A blank draft does nothing.
    pub async fn submit_quick_search(
        &mut self,
        store: &dyn BookmarkManagerTrait,
        pipeline: &EnrichmentPipeline,
        opener: &mut dyn LinkOpener,
        session: &Session,
    ) -> Result<Option<AddOutcome>, DashboardError> {
        let Some(request) = self.quick_search_request() else {
            return Ok(None);
        };
        self.add_bookmark(store, pipeline, opener, session, request)
            .await
            .map(Some)
    }

    /// Flips the favorite flag of a bookmark from its in-memory value.
    pub fn toggle_favorite(
        &mut self,
        store: &dyn BookmarkManagerTrait,
        session: &Session,
        id: &str,
    ) -> Result<(), DashboardError> {
        let mutation = match self.bookmarks.iter().find(|b| b.id == id) {
            Some(b) => store.set_favorite(session, id, !b.favorite),
            None => {
                log::debug!("toggle_favorite: {} not in current view", id);
                Ok(())
            }
        };
        self.finish_mutation(store, session, mutation, "toggling favorite")
    }

    pub fn delete(
        &mut self,
        store: &dyn BookmarkManagerTrait,
        session: &Session,
        id: &str,
    ) -> Result<(), DashboardError> {
        let mutation = store.remove_bookmark(session, id);
        self.finish_mutation(store, session, mutation, "deleting bookmark")
    }

    /// Re-fetches after a mutation regardless of its outcome, then reports it.
    fn finish_mutation(
        &mut self,
        store: &dyn BookmarkManagerTrait,
        session: &Session,
        mutation: Result<(), crate::types::errors::BookmarkError>,
        action: &str,
    ) -> Result<(), DashboardError> {
        let refreshed = self.refresh(store, session);
        if let Err(e) = mutation {
            log::error!("Error {}: {}", action, e);
            return Err(DashboardError::from(e));
        }
        refreshed
    }
}
