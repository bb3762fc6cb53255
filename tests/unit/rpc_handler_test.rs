//! Unit tests for the RPC handler: JSON-RPC methods dispatched by `handle_method`.
//!
//! These tests exercise the methods through the same code path used by the
//! real `ottmarks-rpc` binary, using a temporary on-disk SQLite database and
//! a temporary settings file.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::Mutex;
use tokio::time::timeout;

use ottmarks::app::App;
use ottmarks::rpc_handler::handle_method;
use ottmarks::services::enrichment::{EnrichmentPipeline, EnrichmentRequest};
use ottmarks::services::image_lookup::ImageLookup;
use ottmarks::services::settings_engine::SettingsEngine;
use ottmarks::services::thumbnail_resolver::ThumbnailResolver;
use ottmarks::types::errors::{DashboardError, ThumbnailError};
use ottmarks::types::session::{OAuthProvider, User};
use ottmarks::types::settings::{LinkSettings, ThumbnailSettings, ThumbnailSource};

/// Create a fresh App backed by a temp directory.
fn setup() -> (Mutex<App>, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let db_path = tmp.path().join("test.db");
    let settings_path = tmp.path().join("settings.json").to_string_lossy().to_string();
    let app = App::with_settings(
        db_path.to_str().unwrap(),
        SettingsEngine::new(Some(settings_path)),
    )
    .expect("Failed to init App");
    (Mutex::new(app), tmp)
}

async fn call(app: &Mutex<App>, method: &str, params: Value) -> Value {
    handle_method(app, method, &params)
        .await
        .unwrap_or_else(|e| panic!("{} failed: {}", method, e))
}

async fn sign_in(app: &Mutex<App>, user_id: &str) {
    call(app, "session.complete", json!({"user_id": user_id, "provider": "github"})).await;
}

/// Image lookup that answers after a pause.
struct SlowLookup;

#[async_trait]
impl ImageLookup for SlowLookup {
    async fn lookup(&self, _query: &str) -> Result<Option<String>, ThumbnailError> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(Some("https://img.example/slow.jpg".to_string()))
    }
}

fn slow_pipeline() -> Arc<EnrichmentPipeline> {
    let settings = ThumbnailSettings {
        source: ThumbnailSource::SearchLookup,
        ..ThumbnailSettings::default()
    };
    let resolver = ThumbnailResolver::new(settings, Some(Arc::new(SlowLookup)));
    Arc::new(EnrichmentPipeline::new(LinkSettings::default(), resolver))
}

// ─── Basics ───

#[tokio::test]
async fn test_ping() {
    let (app, _tmp) = setup();
    assert_eq!(call(&app, "ping", json!({})).await, json!({"pong": true}));
}

#[tokio::test]
async fn test_unknown_method_returns_error() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "nonexistent.method", &json!({})).await;
    assert!(res.unwrap_err().message.contains("unknown method"));
}

// ─── Session ───

#[tokio::test]
async fn test_store_calls_require_session() {
    let (app, _tmp) = setup();
    for method in ["bookmark.list", "bookmark.toggle_favorite", "bookmark.delete"] {
        let err = handle_method(&app, method, &json!({"id": "x"})).await.unwrap_err().message;
        assert_eq!(err, "unauthenticated", "{} should require a session", method);
    }
    let err = handle_method(&app, "bookmark.add", &json!({"title": "Dune"}))
        .await
        .unwrap_err().message;
    assert_eq!(err, "unauthenticated");
}

#[tokio::test]
async fn test_sign_in_flow() {
    let (app, _tmp) = setup();
    assert_eq!(call(&app, "session.current", json!({})).await["user"], Value::Null);

    let res = call(&app, "session.sign_in", json!({"provider": "github"})).await;
    let url = res["authorize_url"].as_str().unwrap();
    assert!(url.contains("/authorize?provider=github"));

    sign_in(&app, "alice").await;
    let current = call(&app, "session.current", json!({})).await;
    assert_eq!(current["user"]["id"], "alice");
    assert_eq!(current["user"]["provider"], "github");

    call(&app, "session.sign_out", json!({})).await;
    assert_eq!(call(&app, "session.current", json!({})).await["user"], Value::Null);
}

#[tokio::test]
async fn test_unknown_provider_is_rejected() {
    let (app, _tmp) = setup();
    let err = handle_method(&app, "session.sign_in", &json!({"provider": "myspace"}))
        .await
        .unwrap_err().message;
    assert!(err.contains("unknown provider"));
}

// ─── Bookmarks ───

#[tokio::test]
async fn test_bookmark_add_and_list() {
    let (app, _tmp) = setup();
    sign_in(&app, "alice").await;

    let res = call(&app, "bookmark.add", json!({"title": "The Office"})).await;
    assert_eq!(res["title"], "The Office");
    assert_eq!(res["url"], "https://www.google.com/search?q=The%20Office");
    assert_eq!(res["open_url"], res["url"], "generated links go back to the shell");
    assert!(res["thumbnail"].as_str().unwrap().starts_with("https://image.pollinations.ai/prompt/"));

    let state = call(&app, "bookmark.list", json!({})).await;
    assert_eq!(state["bookmarks"].as_array().unwrap().len(), 1);
    assert_eq!(state["bookmarks"][0]["id"], res["id"]);
    assert_eq!(state["loading"], false);
}

#[tokio::test]
async fn test_bookmark_add_with_url_does_not_open() {
    let (app, _tmp) = setup();
    sign_in(&app, "alice").await;

    let res = call(&app, "bookmark.add", json!({"title": "Dune", "url": "https://www.imdb.com/title/tt1160419/"})).await;
    assert_eq!(res["url"], "https://www.imdb.com/title/tt1160419/");
    assert_eq!(res["open_url"], Value::Null);
}

#[tokio::test]
async fn test_bookmark_add_blank_title_fails_validation() {
    let (app, _tmp) = setup();
    sign_in(&app, "alice").await;

    let err = handle_method(&app, "bookmark.add", &json!({"title": "  "})).await.unwrap_err().message;
    assert!(err.contains("Please enter a title"));

    let err = handle_method(&app, "bookmark.add", &json!({})).await.unwrap_err().message;
    assert_eq!(err, "missing title");
}

#[tokio::test]
async fn test_quick_search_uses_draft_and_capitalizes() {
    let (app, _tmp) = setup();
    sign_in(&app, "alice").await;

    assert_eq!(call(&app, "bookmark.quick_search", json!({})).await, Value::Null);

    call(&app, "draft.set", json!({"title": "stranger things"})).await;
    let res = call(&app, "bookmark.quick_search", json!({})).await;
    assert_eq!(res["title"], "Stranger things");

    let state = call(&app, "view.state", json!({})).await;
    assert_eq!(state["draft_title"], "");
    assert_eq!(state["total"], 1);
}

#[tokio::test]
async fn test_toggle_favorite_and_delete() {
    let (app, _tmp) = setup();
    sign_in(&app, "alice").await;
    let a = call(&app, "bookmark.add", json!({"title": "Dune"})).await["id"].clone();
    let b = call(&app, "bookmark.add", json!({"title": "Up"})).await["id"].clone();

    // Newest first until a favorite exists.
    let state = call(&app, "bookmark.list", json!({})).await;
    assert_eq!(state["bookmarks"][0]["id"], b);

    let state = call(&app, "bookmark.toggle_favorite", json!({"id": a})).await;
    assert_eq!(state["bookmarks"][0]["id"], a);
    assert_eq!(state["bookmarks"][0]["favorite"], true);

    let state = call(&app, "bookmark.delete", json!({"id": a})).await;
    assert_eq!(state["total"], 1);
    assert_eq!(state["bookmarks"][0]["id"], b);

    // Unknown ids are accepted silently.
    let state = call(&app, "bookmark.delete", json!({"id": "nope"})).await;
    assert_eq!(state["total"], 1);
}

#[tokio::test]
async fn test_bookmarks_are_scoped_per_user() {
    let (app, _tmp) = setup();
    sign_in(&app, "alice").await;
    call(&app, "bookmark.add", json!({"title": "Dune"})).await;
    call(&app, "session.sign_out", json!({})).await;

    let state = call(&app, "view.state", json!({})).await;
    assert_eq!(state["authenticated"], false);
    assert_eq!(state["total"], 0, "sign-out clears the dashboard");

    sign_in(&app, "bob").await;
    let state = call(&app, "bookmark.list", json!({})).await;
    assert_eq!(state["total"], 0);
}

#[tokio::test]
async fn test_failed_add_returns_its_link_and_a_generic_alert() {
    let (app, _tmp) = setup();
    sign_in(&app, "alice").await;
    let rename = |from: &str, to: &str| format!("ALTER TABLE {} RENAME TO {}", from, to);

    app.lock().await.db.connection().execute_batch(&rename("bookmarks", "bookmarks_away")).unwrap();
    let err = handle_method(&app, "bookmark.add", &json!({"title": "Dune"})).await.unwrap_err();
    assert_eq!(err.message, "Error adding bookmark");
    assert_eq!(err.open_url.as_deref(), Some("https://www.google.com/search?q=Dune"));
    assert_eq!(call(&app, "view.state", json!({})).await["loading"], false);

    app.lock().await.db.connection().execute_batch(&rename("bookmarks_away", "bookmarks")).unwrap();
    let res = call(&app, "bookmark.add", json!({"title": "Up"})).await;
    assert_eq!(res["url"], "https://www.google.com/search?q=Up");
    assert_eq!(res["open_url"], res["url"], "no link left over from the failed add");
}

#[tokio::test]
async fn test_failed_toggle_alert_hides_store_detail() {
    let (app, _tmp) = setup();
    sign_in(&app, "alice").await;
    let id = call(&app, "bookmark.add", json!({"title": "Dune"})).await["id"].clone();

    app.lock()
        .await
        .db
        .connection()
        .execute_batch("CREATE TRIGGER no_updates BEFORE UPDATE ON bookmarks BEGIN SELECT RAISE(ABORT, 'read only'); END;")
        .unwrap();
    let err = handle_method(&app, "bookmark.toggle_favorite", &json!({"id": id})).await.unwrap_err();

    assert_eq!(err.message, "Something went wrong, please try again");
    assert_eq!(err.open_url, None);
}

#[tokio::test]
async fn test_second_add_is_rejected_while_one_is_enriching() {
    let (app, _tmp) = setup();
    sign_in(&app, "alice").await;
    app.lock().await.pipeline = slow_pipeline();

    let first_params = json!({"title": "Dune"});
    let first = handle_method(&app, "bookmark.add", &first_params);
    let observer = async {
        loop {
            let state = call(&app, "view.state", json!({})).await;
            if state["loading"] == true {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(call(&app, "ping", json!({})).await, json!({"pong": true}));
        handle_method(&app, "bookmark.add", &json!({"title": "Up"})).await
    };
    let (first, second) = tokio::join!(first, timeout(Duration::from_secs(5), observer));

    let second = second.expect("add never reported loading");
    assert_eq!(second.unwrap_err().message, "Please wait for the current bookmark to finish");
    let first = first.unwrap();
    assert_eq!(first["title"], "Dune");
    assert_eq!(first["thumbnail"], "https://img.example/slow.jpg");

    let state = call(&app, "view.state", json!({})).await;
    assert_eq!(state["loading"], false);
    assert_eq!(state["total"], 1);
}

#[tokio::test]
async fn test_add_is_dropped_when_the_user_changes_mid_flight() {
    let (app, _tmp) = setup();
    sign_in(&app, "alice").await;

    let mut a = app.lock().await;
    let pending = a.begin_add(EnrichmentRequest::manual("Dune", None)).unwrap();
    let enrichment = pending.enrich().await;
    a.sign_out().unwrap();
    a.complete_sign_in(User {
        id: "bob".to_string(),
        email: None,
        provider: OAuthProvider::Github,
    })
    .unwrap();

    assert_eq!(a.finish_add(pending, enrichment), Err(DashboardError::Unauthenticated));
    assert!(!a.dashboard.is_loading());
    assert!(a.dashboard.bookmarks().is_empty());
}

// ─── View ───

#[tokio::test]
async fn test_view_filters() {
    let (app, _tmp) = setup();
    sign_in(&app, "alice").await;
    let dune = call(&app, "bookmark.add", json!({"title": "Dune"})).await["id"].clone();
    call(&app, "bookmark.add", json!({"title": "Dune Part Two"})).await;
    call(&app, "bookmark.add", json!({"title": "Up"})).await;
    call(&app, "bookmark.toggle_favorite", json!({"id": dune})).await;

    let state = call(&app, "view.set_search", json!({"text": "DUNE"})).await;
    assert_eq!(state["bookmarks"].as_array().unwrap().len(), 2);
    assert_eq!(state["total"], 3);

    let state = call(&app, "view.set_tab", json!({"tab": "fav"})).await;
    assert_eq!(state["tab"], "favorites");
    assert_eq!(state["bookmarks"].as_array().unwrap().len(), 1);

    let err = handle_method(&app, "view.set_tab", &json!({"tab": "recent"})).await.unwrap_err().message;
    assert!(err.contains("unknown tab"));

    let state = call(&app, "view.set_mode", json!({"mode": "quick_search"})).await;
    assert_eq!(state["mode"], "quick_search");
}

// ─── Thumbnails ───

#[tokio::test]
async fn test_thumbnail_methods() {
    let (app, _tmp) = setup();

    let resolved = call(&app, "thumbnail.resolve", json!({"title": "Horror Movie"})).await;
    assert!(resolved["url"].as_str().unwrap().contains("movie%20poster%20cinematic"));

    let display = call(&app, "thumbnail.display", json!({"title": "Horror Movie"})).await;
    assert_eq!(display["url"], resolved["url"]);

    let next = call(&app, "thumbnail.fallback", json!({"title": "Dune", "failed": "https://img/broken.jpg", "primary": "https://img/broken.jpg"})).await;
    assert!(next["url"].as_str().unwrap().starts_with("https://ui-avatars.com/api/?name=Dune"));

    let last = call(&app, "thumbnail.fallback", json!({"title": "Dune", "failed": "https://api.dicebear.com/7.x/shapes/svg?seed=Dune"})).await;
    assert_eq!(last["url"], Value::Null);
}

// ─── Voice ───

#[tokio::test]
async fn test_voice_requires_support() {
    let (app, _tmp) = setup();
    let err = handle_method(&app, "voice.start", &json!({"supported": false})).await.unwrap_err().message;
    assert_eq!(err, "Voice not supported");
}

#[tokio::test]
async fn test_voice_capture_sets_draft() {
    let (app, _tmp) = setup();
    sign_in(&app, "alice").await;

    let res = call(&app, "voice.start", json!({"supported": true})).await;
    assert_eq!(res["language"], "en-US");

    let err = handle_method(&app, "voice.start", &json!({"supported": true})).await.unwrap_err().message;
    assert!(err.contains("already listening"));

    let res = call(&app, "voice.result", json!({"results": [{"alternatives": [{"text": "dune", "confidence": 0.9}]}]})).await;
    assert_eq!(res["title"], "dune");
    assert_eq!(res["added"], Value::Null);
    assert_eq!(call(&app, "view.state", json!({})).await["draft_title"], "dune");
}

#[tokio::test]
async fn test_voice_quick_search_adds_bookmark() {
    let (app, _tmp) = setup();
    sign_in(&app, "alice").await;
    call(&app, "settings.set", json!({"key": "voice.quick_search_delay_ms", "value": 0})).await;

    call(&app, "view.set_mode", json!({"mode": "quick_search"})).await;

    call(&app, "voice.start", json!({"supported": true})).await;
    let res = call(&app, "voice.result", json!({"results": [{"alternatives": [{"text": "kgf song"}]}]})).await;

    assert_eq!(res["title"], "kgf song");
    assert_eq!(res["added"]["title"], "Kgf song");
    assert_eq!(res["added"]["open_url"], "https://www.google.com/search?q=Kgf%20song");
    let state = call(&app, "view.state", json!({})).await;
    assert_eq!(state["total"], 1);
    assert_eq!(state["draft_title"], "");
}

#[tokio::test]
async fn test_voice_in_manual_mode_only_fills_draft() {
    let (app, _tmp) = setup();
    sign_in(&app, "alice").await;
    call(&app, "settings.set", json!({"key": "voice.quick_search_delay_ms", "value": 0})).await;
    call(&app, "view.set_mode", json!({"mode": "quick_search"})).await;
    call(&app, "view.set_mode", json!({"mode": "manual"})).await;

    call(&app, "voice.start", json!({"supported": true})).await;
    let res = call(&app, "voice.result", json!({"results": [{"alternatives": [{"text": "kgf song"}]}]})).await;

    assert_eq!(res["added"], Value::Null);
    assert_eq!(call(&app, "view.state", json!({})).await["total"], 0);
}

#[tokio::test]
async fn test_settings_change_keeps_voice_listening() {
    let (app, _tmp) = setup();
    sign_in(&app, "alice").await;
    call(&app, "voice.start", json!({"supported": true})).await;

    call(&app, "settings.set", json!({"key": "links.mode", "value": "first_result"})).await;

    let res = call(&app, "voice.result", json!({"results": [{"alternatives": [{"text": "dune"}]}]})).await;
    assert_eq!(res["title"], "dune");
    assert_eq!(call(&app, "view.state", json!({})).await["draft_title"], "dune");
}

#[tokio::test]
async fn test_voice_end_and_error_stop_listening() {
    let (app, _tmp) = setup();
    call(&app, "voice.start", json!({"supported": true})).await;
    assert_eq!(call(&app, "voice.end", json!({})).await["listening"], false);

    call(&app, "voice.start", json!({"supported": true})).await;
    assert_eq!(call(&app, "voice.error", json!({"message": "no-speech"})).await["listening"], false);
}

// ─── Settings ───

#[tokio::test]
async fn test_settings_get_set_reset() {
    let (app, _tmp) = setup();
    let settings = call(&app, "settings.get", json!({})).await;
    assert_eq!(settings["links"]["mode"], "search");

    call(&app, "settings.set", json!({"key": "links.mode", "value": "first_result"})).await;
    assert_eq!(call(&app, "settings.get", json!({})).await["links"]["mode"], "first_result");

    sign_in(&app, "alice").await;
    let res = call(&app, "bookmark.add", json!({"title": "Dune"})).await;
    assert_eq!(res["url"], "https://www.google.com/search?q=Dune&btnI=1");

    let err = handle_method(&app, "settings.set", &json!({"key": "links.bogus", "value": 1})).await.unwrap_err().message;
    assert!(err.contains("Invalid settings key"));

    call(&app, "settings.reset", json!({})).await;
    assert_eq!(call(&app, "settings.get", json!({})).await["links"]["mode"], "search");
}
