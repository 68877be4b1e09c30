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

use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use maud::Markup;
use maud::html;
use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::utf8_percent_encode;
use serde::Deserialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::session::defense::Difficulty;
use crate::session::variant::Variant;
use crate::types::category::Category;
use crate::types::content_set::ContentSet;
use crate::types::content_set::SetContent;
use crate::types::set_id::SetId;
use crate::web::state::ServerState;
use crate::web::template::page_template;
use crate::web::view;

#[derive(Deserialize)]
pub struct ListParams {
    tag: Option<String>,
}

pub async fn home_handler(State(state): State<ServerState>) -> (StatusCode, Html<String>) {
    match home_page(&state) {
        Ok(markup) => (StatusCode::OK, Html(markup.into_string())),
        Err(e) => error_page(e),
    }
}

pub async fn list_handler(
    State(state): State<ServerState>,
    Path(category): Path<String>,
    Query(params): Query<ListParams>,
) -> Response {
    let Ok(category) = Category::try_from(category) else {
        return not_found().into_response();
    };
    match list_page(&state, category, params.tag.as_deref()) {
        Ok(markup) => (StatusCode::OK, Html(markup.into_string())).into_response(),
        Err(e) => error_page(e).into_response(),
    }
}

pub async fn detail_handler(
    State(state): State<ServerState>,
    Path((category, id)): Path<(String, String)>,
) -> Response {
    let Ok(category) = Category::try_from(category) else {
        return not_found().into_response();
    };
    let Ok(id) = SetId::new(id) else {
        return not_found().into_response();
    };
    let set = match state.db.get_by_id(category, &id) {
        Ok(Some(set)) => set,
        Ok(None) => return not_found().into_response(),
        Err(e) => return error_page(e).into_response(),
    };
    let flash = state.mutable.lock().unwrap().flash.take();
    (
        StatusCode::OK,
        Html(detail_page(&set, flash.as_deref()).into_string()),
    )
        .into_response()
}

pub async fn session_handler(State(state): State<ServerState>) -> Response {
    let mutable = state.mutable.lock().unwrap();
    match &mutable.active {
        Some(handle) => {
            let markup = page_template(view::session_screen(handle));
            (StatusCode::OK, Html(markup.into_string())).into_response()
        }
        None => Redirect::to("/").into_response(),
    }
}

pub async fn admin_handler(State(state): State<ServerState>) -> (StatusCode, Html<String>) {
    let flash = state.mutable.lock().unwrap().flash.take();
    match admin_page(&state, flash.as_deref()) {
        Ok(markup) => (StatusCode::OK, Html(markup.into_string())),
        Err(e) => error_page(e),
    }
}

pub fn not_found() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html("Not Found".to_string()))
}

fn error_page(e: ErrorReport) -> (StatusCode, Html<String>) {
    log::error!("error: {}", e);
    let markup = page_template(html! {
        div.root {
            div.card {
                div.content {
                    h1 { "Something went wrong" }
                    p { (e.message()) }
                    a href="/" { "Back to home" }
                }
            }
        }
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Html(markup.into_string()))
}

fn home_page(state: &ServerState) -> Fallible<Markup> {
    let mut counts = Vec::new();
    for category in Category::ALL {
        counts.push((category, state.db.count(category)?));
    }
    Ok(page_template(html! {
        div.root {
            div.card {
                div.header {
                    div.context {
                        h1 { "lexdrill" }
                        div.mode { "Pick a category" }
                    }
                }
                div.tiles {
                    @for (category, count) in &counts {
                        a.tile href=(format!("/sets/{}", category.as_str())) {
                            div.title { (category.title()) }
                            div.meta { (count) " sets" }
                        }
                    }
                }
                div.footer {
                    a href="/admin" { "Manage sets" }
                }
            }
        }
    }))
}

fn list_page(state: &ServerState, category: Category, tag: Option<&str>) -> Fallible<Markup> {
    let sets = match tag {
        Some(tag) => state.db.get_by_tag(category, tag)?,
        None => state.db.get_all(category)?,
    };
    Ok(page_template(html! {
        div.root {
            div.card {
                div.header {
                    div.context {
                        h1 { (category.title()) }
                        @if let Some(tag) = tag {
                            div.mode { "Tagged " (tag) }
                        }
                    }
                }
                @if sets.is_empty() {
                    div.content {
                        p { "No sets here yet." }
                    }
                } @else {
                    div.set-list {
                        @for set in &sets {
                            a.set-row href=(set_href(set)) {
                                div.title { (set.title) }
                                @if let Some(subject) = &set.subject {
                                    div.subject { (subject) }
                                }
                                div.meta { (set_meta(set)) }
                            }
                        }
                    }
                    div.tag-row {
                        @for tag in collect_tags(&sets) {
                            a.tag href=(tag_href(category, &tag)) { (tag) }
                        }
                    }
                }
                div.footer {
                    a href="/" { "Home" }
                }
            }
        }
    }))
}

fn detail_page(set: &ContentSet, flash: Option<&str>) -> Markup {
    page_template(html! {
        div.root {
            div.card {
                div.header {
                    div.context {
                        h1 { (set.title) }
                        div.mode { (set.category().title()) }
                    }
                }
                @if let Some(flash) = flash {
                    div.flash { (flash) }
                }
                div.content {
                    @if let Some(description) = &set.description {
                        p.description { (description) }
                    }
                    @if let Some(subject) = &set.subject {
                        div.subject { (subject) }
                    }
                    @if !set.tags.is_empty() {
                        div.tag-row {
                            @for tag in &set.tags {
                                a.tag href=(tag_href(set.category(), tag)) { (tag) }
                            }
                        }
                    }
                    div.meta { (set_meta(set)) }
                    @match &set.content {
                        SetContent::Defense(config) => {
                            div.defense-info {
                                p {
                                    (config.enemy_count) " enemies, drawn from "
                                    a href=(format!(
                                        "/sets/{}/{}",
                                        config.source_type.as_str(),
                                        config.source_id,
                                    )) { (config.source_id) }
                                }
                            }
                            div.modes {
                                @for difficulty in Difficulty::ALL {
                                    form.inline action="/session/start" method="post" {
                                        input type="hidden" name="category"
                                            value=(set.category().as_str());
                                        input type="hidden" name="id" value=(set.id);
                                        input type="hidden" name="variant"
                                            value=(Variant::Defense.form_value());
                                        input type="hidden" name="difficulty"
                                            value=(difficulty.title());
                                        input type="submit" value=(difficulty.title());
                                    }
                                }
                            }
                        }
                        _ => {
                            div.modes {
                                @for variant in Variant::for_category(set.category()) {
                                    form.inline action="/session/start" method="post" {
                                        input type="hidden" name="category"
                                            value=(set.category().as_str());
                                        input type="hidden" name="id" value=(set.id);
                                        input type="hidden" name="variant"
                                            value=(variant.form_value());
                                        input type="submit" value=(variant.title());
                                    }
                                }
                            }
                        }
                    }
                }
                div.footer {
                    a href=(format!("/sets/{}", set.category().as_str())) { "Back" }
                }
            }
        }
    })
}

fn admin_page(state: &ServerState, flash: Option<&str>) -> Fallible<Markup> {
    let sets = state.db.all_sets()?;
    Ok(page_template(html! {
        div.root {
            div.card {
                div.header {
                    div.context {
                        h1 { "Manage sets" }
                    }
                }
                @if let Some(flash) = flash {
                    div.flash { (flash) }
                }
                div.content {
                    @if sets.is_empty() {
                        p { "No sets imported yet." }
                    } @else {
                        table.sets {
                            thead {
                                tr {
                                    th { "Category" }
                                    th { "ID" }
                                    th { "Title" }
                                    th { "Items" }
                                    th { "Imported" }
                                    th {}
                                }
                            }
                            tbody {
                                @for stored in &sets {
                                    tr {
                                        td { (stored.set.category().title()) }
                                        td { (stored.set.id) }
                                        td { (stored.set.title) }
                                        td { (stored.set.item_count()) }
                                        td { (stored.imported_at.local_date()) }
                                        td {
                                            form.inline action="/admin/delete" method="post" {
                                                input type="hidden" name="category"
                                                    value=(stored.set.category().as_str());
                                                input type="hidden" name="id"
                                                    value=(stored.set.id);
                                                input type="submit" value="Delete";
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                    form.import-form action="/admin/import" method="post" {
                        label for="category" { "Category" }
                        select id="category" name="category" {
                            @for category in Category::ALL {
                                option value=(category.as_str()) { (category.title()) }
                            }
                        }
                        label for="document" { "Set document (JSON)" }
                        textarea id="document" name="document" rows="12" {}
                        input type="submit" value="Import";
                    }
                }
                div.footer {
                    a href="/" { "Home" }
                }
            }
        }
    }))
}

fn set_href(set: &ContentSet) -> String {
    format!("/sets/{}/{}", set.category().as_str(), set.id)
}

fn set_meta(set: &ContentSet) -> String {
    match &set.content {
        SetContent::Defense(_) => "Tower defense".to_string(),
        _ => format!("{} questions", set.item_count()),
    }
}

fn tag_href(category: Category, tag: &str) -> String {
    format!(
        "/sets/{}?tag={}",
        category.as_str(),
        utf8_percent_encode(tag, NON_ALPHANUMERIC)
    )
}

/// Distinct tags across the listed sets, in first-seen order.
fn collect_tags(sets: &[ContentSet]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for set in sets {
        for tag in &set.tags {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
    }
    tags
}
