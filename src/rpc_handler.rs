//! RPC method handler for the ottmarks JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be tested independently.
//! `handle_method` dispatches a method call to the `App` held behind an
//! async mutex. Adds release the lock while they are enriched, so other
//! calls are served meanwhile and see `loading` raised.

use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::app::App;
use crate::managers::bookmark_manager::BookmarkManagerTrait;
use crate::managers::dashboard::AddOutcome;
use crate::managers::session_manager::SessionManagerTrait;
use crate::services::enrichment::EnrichmentRequest;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::errors::DashboardError;
use crate::types::session::{OAuthProvider, User};
use crate::types::view::{EntryMode, ViewTab};
use crate::types::voice::{RecognitionResult, VoiceOutcome};

use serde_json::{json, Value};

/// Error answered to the shell.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcError {
    pub message: String,
    /// Generated link the shell still has to open although the call failed.
    pub open_url: Option<String>,
}

impl RpcError {
    /// Generic alert for a dashboard failure. The detail is logged only.
    fn alert(e: DashboardError) -> Self {
        Self::from_dashboard(e, DashboardError::alert_message, None)
    }

    fn add_alert(e: DashboardError, open_url: Option<String>) -> Self {
        Self::from_dashboard(e, DashboardError::add_alert_message, open_url)
    }

    fn from_dashboard(e: DashboardError, text: fn(&DashboardError) -> &str, open_url: Option<String>) -> Self {
        let message = match e {
            // Protocol signal; the shell answers it with its sign-in screen.
            DashboardError::Unauthenticated => e.to_string(),
            _ => {
                log::debug!("rpc call failed: {}", e);
                text(&e).to_string()
            }
        };
        Self { message, open_url }
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RpcError {}

impl From<String> for RpcError {
    fn from(message: String) -> Self {
        Self { message, open_url: None }
    }
}

impl From<&str> for RpcError {
    fn from(message: &str) -> Self {
        Self::from(message.to_string())
    }
}

fn str_param<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

fn required<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    str_param(params, key).ok_or_else(|| format!("missing {}", key))
}

/// Snapshot of the dashboard as the UI renders it.
pub fn view_state(app: &App) -> Value {
    let d = &app.dashboard;
    json!({
        "authenticated": app.session_manager.is_authenticated(),
        "bookmarks": d.visible(),
        "total": d.bookmarks().len(),
        "search": d.search_text(),
        "tab": d.tab().as_str(),
        "mode": d.entry_mode(),
        "loading": d.is_loading(),
        "draft_title": d.draft_title(),
        "draft_url": d.draft_url(),
    })
}

fn add_result(outcome: &AddOutcome, open_url: Option<String>) -> Value {
    json!({
        "id": outcome.id,
        "title": outcome.enrichment.title,
        "url": outcome.enrichment.url,
        "thumbnail": outcome.enrichment.thumbnail,
        "open_url": open_url,
    })
}

/// Runs an add through the dashboard gate, enriches it unlocked, then stores it.
///
/// The pending link queue is drained on success and on failure alike; the
/// newest queued URL is the one this add generated.
async fn run_add(app: &Mutex<App>, request: EnrichmentRequest) -> Result<Value, RpcError> {
    let pending = {
        let mut a = app.lock().await;
        a.begin_add(request).map_err(|e| RpcError::add_alert(e, None))?
    };
    let enrichment = pending.enrich().await;

    let mut a = app.lock().await;
    let result = a.finish_add(pending, enrichment);
    // Only the host-delegated opener leaves URLs for the shell.
    let open_url = a.opener.take_pending().pop();
    match result {
        Ok(outcome) => Ok(add_result(&outcome, open_url)),
        Err(e) => Err(RpcError::add_alert(e, open_url)),
    }
}

/// Dispatch a JSON-RPC method call.
///
/// Returns `Ok(Value)` on success or an [`RpcError`] carrying the message.
pub async fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, RpcError> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Session ───
        "session.current" => {
            let a = app.lock().await;
            match a.session_manager.session() {
                Ok(s) => Ok(json!({"user": s.user, "started_at": s.started_at})),
                Err(_) => Ok(json!({"user": null})),
            }
        }
        "session.sign_in" => {
            let provider = match str_param(params, "provider") {
                Some(p) => Some(OAuthProvider::parse(p).ok_or_else(|| format!("unknown provider: {}", p))?),
                None => None,
            };
            let mut a = app.lock().await;
            let url = a.begin_sign_in(provider).map_err(RpcError::alert)?;
            Ok(json!({"authorize_url": url}))
        }
        "session.complete" => {
            let user_id = required(params, "user_id")?;
            let mut a = app.lock().await;
            let provider = match str_param(params, "provider") {
                Some(p) => OAuthProvider::parse(p).ok_or_else(|| format!("unknown provider: {}", p))?,
                None => a.settings_engine.get_settings().auth.default_provider,
            };
            let user = User {
                id: user_id.to_string(),
                email: str_param(params, "email").map(str::to_string),
                provider,
            };
            a.complete_sign_in(user).map_err(RpcError::alert)?;
            Ok(view_state(&a))
        }
        "session.sign_out" => {
            let mut a = app.lock().await;
            a.sign_out().map_err(RpcError::alert)?;
            Ok(json!({"ok": true}))
        }

        // ─── Bookmarks ───
        "bookmark.list" => {
            let mut a = app.lock().await;
            a.refresh().map_err(RpcError::alert)?;
            Ok(view_state(&a))
        }
        "bookmark.get" => {
            let id = required(params, "id")?;
            let a = app.lock().await;
            let session = a.session().map_err(RpcError::alert)?;
            let bm = a.bookmarks
                .get_bookmark(session, id)
                .map_err(|e| RpcError::alert(e.into()))?;
            Ok(json!(bm))
        }
        "bookmark.add" => {
            let title = required(params, "title")?;
            let url = str_param(params, "url");
            let request = app
                .lock()
                .await
                .prepare_manual(title, url)
                .map_err(RpcError::alert)?;
            run_add(app, request).await
        }
        "bookmark.quick_search" => {
            let title = str_param(params, "title");
            let request = app
                .lock()
                .await
                .prepare_quick_search(title)
                .map_err(RpcError::alert)?;
            match request {
                Some(request) => run_add(app, request).await,
                None => Ok(Value::Null),
            }
        }
        "bookmark.toggle_favorite" => {
            let id = required(params, "id")?;
            let mut a = app.lock().await;
            a.toggle_favorite(id).map_err(RpcError::alert)?;
            Ok(view_state(&a))
        }
        "bookmark.delete" => {
            let id = required(params, "id")?;
            let mut a = app.lock().await;
            a.delete_bookmark(id).map_err(RpcError::alert)?;
            Ok(view_state(&a))
        }

        // ─── View ───
        "view.set_search" => {
            let text = str_param(params, "text").unwrap_or("");
            let mut a = app.lock().await;
            a.dashboard.set_search(text);
            Ok(view_state(&a))
        }
        "view.set_tab" => {
            let raw = required(params, "tab")?;
            let tab = ViewTab::parse(raw).ok_or_else(|| format!("unknown tab: {}", raw))?;
            let mut a = app.lock().await;
            a.dashboard.set_tab(tab);
            Ok(view_state(&a))
        }
        "view.set_mode" => {
            let mode: EntryMode = params
                .get("mode")
                .cloned()
                .ok_or("missing mode")
                .and_then(|v| serde_json::from_value(v).map_err(|_| "unknown mode"))?;
            let mut a = app.lock().await;
            a.dashboard.set_entry_mode(mode);
            Ok(view_state(&a))
        }
        "view.state" => {
            let a = app.lock().await;
            Ok(view_state(&a))
        }
        "draft.set" => {
            let mut a = app.lock().await;
            if let Some(t) = str_param(params, "title") {
                a.dashboard.set_draft_title(t);
            }
            if let Some(u) = str_param(params, "url") {
                a.dashboard.set_draft_url(u);
            }
            Ok(view_state(&a))
        }

        // ─── Thumbnails ───
        "thumbnail.resolve" => {
            let title = required(params, "title")?;
            let pipeline = Arc::clone(&app.lock().await.pipeline);
            let url = pipeline.thumbnails().resolve(title).await;
            Ok(json!({"url": url}))
        }
        "thumbnail.display" => {
            let title = required(params, "title")?;
            let a = app.lock().await;
            Ok(json!({"url": a.display_thumbnail(title)}))
        }
        "thumbnail.fallback" => {
            let title = required(params, "title")?;
            let failed = required(params, "failed")?;
            let a = app.lock().await;
            let resolver = a.pipeline.thumbnails();
            let primary = match str_param(params, "primary") {
                Some(p) => p.to_string(),
                None => resolver.display_thumbnail(title),
            };
            let chain = resolver.fallback_chain(&primary, title);
            Ok(json!({"url": chain.next_after(failed)}))
        }

        // ─── Voice ───
        "voice.start" => {
            let supported = params.get("supported").and_then(|v| v.as_bool()).unwrap_or(false);
            let mut a = app.lock().await;
            a.start_voice(supported).map_err(|e| e.to_string())?;
            let language = a.settings_engine.get_settings().voice.language.clone();
            Ok(json!({"listening": true, "language": language}))
        }
        "voice.result" => {
            let results: Vec<RecognitionResult> = params
                .get("results")
                .cloned()
                .map(serde_json::from_value::<Vec<RecognitionResult>>)
                .transpose()
                .map_err(|e| format!("invalid results: {}", e))?
                .unwrap_or_default();
            let outcome = app.lock().await.on_voice_result(&results);
            let added = match &outcome {
                Some(VoiceOutcome::QuickSearch { delay, .. }) => {
                    tokio::time::sleep(*delay).await;
                    let request = app
                        .lock()
                        .await
                        .prepare_quick_search(None)
                        .map_err(RpcError::alert)?;
                    match request {
                        Some(request) => run_add(app, request).await?,
                        None => Value::Null,
                    }
                }
                _ => Value::Null,
            };
            Ok(json!({
                "title": outcome.as_ref().map(|o| o.title().to_string()),
                "added": added,
            }))
        }
        "voice.error" => {
            let message = str_param(params, "message").unwrap_or("unknown");
            let mut a = app.lock().await;
            a.voice.on_error(message);
            Ok(json!({"listening": false}))
        }
        "voice.end" => {
            let mut a = app.lock().await;
            a.voice.on_end();
            Ok(json!({"listening": false}))
        }

        // ─── Settings ───
        "settings.get" => {
            let a = app.lock().await;
            serde_json::to_value(a.settings_engine.get_settings()).map_err(|e| RpcError::from(e.to_string()))
        }
        "settings.set" => {
            let key = required(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let mut a = app.lock().await;
            a.settings_engine.set_value(key, value).map_err(|e| e.to_string())?;
            a.apply_settings().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "settings.reset" => {
            let mut a = app.lock().await;
            a.settings_engine.reset().map_err(|e| e.to_string())?;
            a.apply_settings().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        _ => Err(format!("unknown method: {}", method).into()),
    }
}
