//! Link Resolver for ottmarks.
//!
//! [`resolve_link`] is pure: it returns the user's URL or builds a search URL
//! from the title. Opening that URL is a separate presentation action behind
//! [`LinkOpener`]; callers decide when to compose the two.

use crate::types::settings::{LinkMode, LinkSettings};

/// Builds the search URL for a title in the configured mode.
pub fn search_url(title: &str, settings: &LinkSettings) -> String {
    let base = format!(
        "{}?q={}",
        settings.search_base,
        urlencoding::encode(title.trim())
    );
    match settings.mode {
        LinkMode::Search => base,
        LinkMode::FirstResult => format!("{}&btnI=1", base),
    }
}

/// Returns `explicit_url` when it is non-blank, otherwise a generated search URL.
pub fn resolve_link(title: &str, explicit_url: Option<&str>, settings: &LinkSettings) -> String {
    match explicit_url.map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => url.to_string(),
        None => search_url(title, settings),
    }
}

/// Opens a resolved link outside the app.
pub trait LinkOpener {
    fn open(&mut self, url: &str) -> std::io::Result<()>;
}

/// Opens links in the user's default browser.
#[derive(Debug, Default)]
pub struct SystemBrowserOpener;

impl LinkOpener for SystemBrowserOpener {
    fn open(&mut self, url: &str) -> std::io::Result<()> {
        log::info!("opening {} in system browser", url);
        webbrowser::open(url)
    }
}

/// Queues links for the UI shell, which opens them in a new browser context.
#[derive(Debug, Default)]
pub struct HostDelegatedOpener {
    pending: Vec<String>,
}

impl HostDelegatedOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains the URLs queued since the last call.
    pub fn take_pending(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending)
    }
}

impl LinkOpener for HostDelegatedOpener {
    fn open(&mut self, url: &str) -> std::io::Result<()> {
        self.pending.push(url.to_string());
        Ok(())
    }
}

/// Discards links. Used when the shell opens nothing.
#[derive(Debug, Default)]
pub struct NoopOpener;

impl LinkOpener for NoopOpener {
    fn open(&mut self, url: &str) -> std::io::Result<()> {
        log::debug!("not opening {}", url);
        Ok(())
    }
}
