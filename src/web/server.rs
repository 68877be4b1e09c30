// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;
use std::time::Duration;

use axum::Router;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::routing::get;
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::time::sleep;

use crate::error::Fallible;
use crate::error::fail;
use crate::store::Database;
use crate::web::get as pages;
use crate::web::post as actions;
use crate::web::state::ServerState;

pub const DEFAULT_PORT: u16 = 8000;

pub async fn start_server(directory: PathBuf, port: u16) -> Fallible<()> {
    if !directory.exists() {
        return fail("directory does not exist.");
    }

    let db_path = directory.join("lexdrill.db");
    log::debug!("Opening database at {}", db_path.display());
    let db = Database::new(&db_path.display().to_string())?;

    let state = ServerState::new(db);
    let app = Router::new();
    let app = app.route("/", get(pages::home_handler));
    let app = app.route("/sets/{category}", get(pages::list_handler));
    let app = app.route("/sets/{category}/{id}", get(pages::detail_handler));
    let app = app.route("/session", get(pages::session_handler));
    let app = app.route("/session/start", post(actions::start_handler));
    let app = app.route("/session/answer", post(actions::answer_handler));
    let app = app.route("/session/action", post(actions::action_handler));
    let app = app.route("/admin", get(pages::admin_handler));
    let app = app.route("/admin/import", post(actions::import_handler));
    let app = app.route("/admin/delete", post(actions::delete_handler));
    let app = app.route("/script.js", get(script));
    let app = app.route("/style.css", get(stylesheet));
    let app = app.fallback(not_found_handler);
    let app = app.with_state(state);
    let bind = format!("0.0.0.0:{port}");

    // Start a separate task to open the browser.
    let url = format!("http://{bind}/");
    let probe = bind.clone();
    tokio::spawn(async move {
        loop {
            if let Ok(stream) = TcpStream::connect(&probe).await {
                drop(stream);
                break;
            }
            sleep(Duration::from_millis(1)).await;
        }
        let _ = open::that(url);
    });

    // Start the server.
    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(&bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn script() -> (StatusCode, [(HeaderName, &'static str); 1], &'static str) {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/javascript")],
        include_str!("script.js"),
    )
}

async fn stylesheet() -> (StatusCode, [(HeaderName, &'static str); 2], &'static [u8]) {
    let bytes = include_bytes!("style.css");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/css"),
            (CACHE_CONTROL, "public, max-age=604800, immutable"),
        ],
        bytes,
    )
}

async fn not_found_handler() -> (StatusCode, Html<String>) {
    pages::not_found()
}
