//! ottmarks RPC Server — JSON-RPC over stdin/stdout for the UI shell.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"bookmark.add", "params":{"title":"...","url":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"...", "open_url":"..."?}
//!
//! Requests run as local tasks, so responses may come back out of order;
//! the shell matches them by id. Logs go to stderr; stdout carries only the
//! protocol.

use std::io::{self, Write};
use std::rc::Rc;
use std::str::FromStr;
use std::time::Instant;

use ottmarks::app::App;
use ottmarks::platform;
use ottmarks::rpc_handler::handle_method;
use ottmarks::services::settings_engine::{SettingsEngine, SettingsEngineTrait};

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tokio::task::{JoinSet, LocalSet};

const LOG_ENV: &str = "OTTMARKS_LOG";
const MAX_REQUESTS_PER_SECOND: u32 = 200;

/// Fixed one-second window request limiter.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn init_logging() {
    let level = std::env::var(LOG_ENV)
        .ok()
        .and_then(|v| log::LevelFilter::from_str(&v).ok())
        .unwrap_or(log::LevelFilter::Info);
    let mut clog = colog::default_builder();
    clog.filter(None, level);
    clog.init();
}

fn emit(value: &Value) {
    let mut out = io::stdout().lock();
    if writeln!(out, "{}", value).and_then(|_| out.flush()).is_err() {
        log::error!("failed to write response to stdout");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let mut settings_engine = SettingsEngine::new(None);
    let settings = settings_engine.load()?;
    let data_dir = platform::get_data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let db_path = data_dir.join(&settings.general.database_file);
    log::info!("database at {}", db_path.display());

    let mut app = App::with_settings(&db_path.to_string_lossy(), settings_engine)?;
    if let Err(e) = app.startup() {
        log::error!("startup failed: {}", e);
    }
    let app = Rc::new(Mutex::new(app));

    emit(&json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}));

    // `App` holds a SQLite connection and stays on this thread.
    LocalSet::new().run_until(serve(app)).await?;

    log::info!("stdin closed, shutting down");
    Ok(())
}

/// Reads requests until stdin closes, then waits for the ones in flight.
async fn serve(app: Rc<Mutex<App>>) -> io::Result<()> {
    let mut rate_limiter = RateLimiter::new(MAX_REQUESTS_PER_SECOND);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight = JoinSet::new();

    while let Some(line) = lines.next_line().await? {
        while in_flight.try_join_next().is_some() {}
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                emit(&json!({"id": null, "error": format!("parse error: {}", e)}));
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            log::warn!("rate limit exceeded");
            emit(&json!({"id": id, "error": "rate limit exceeded"}));
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("").to_string();
        let params = req.get("params").cloned().unwrap_or(json!({}));
        let app = Rc::clone(&app);

        in_flight.spawn_local(async move {
            log::debug!("rpc {}", method);
            let response = match handle_method(&app, &method, &params).await {
                Ok(val) => json!({"id": id, "result": val}),
                Err(err) => {
                    let mut response = json!({"id": id, "error": err.message});
                    if let Some(url) = err.open_url {
                        response["open_url"] = Value::String(url);
                    }
                    response
                }
            };
            emit(&response);
        });
    }

    while in_flight.join_next().await.is_some() {}
    Ok(())
}
