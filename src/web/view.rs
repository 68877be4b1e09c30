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

use maud::Markup;
use maud::html;

use crate::normalize::join_sentence;
use crate::session::browse::BrowseSession;
use crate::session::defense::DefenseSession;
use crate::session::defense::Outcome;
use crate::session::defense::TurnOutcome;
use crate::session::engine::Feedback;
use crate::session::engine::QueueEntry;
use crate::session::engine::Session;
use crate::session::matching::MatchingSession;
use crate::session::prepare::LISTEN_LIMIT;
use crate::session::prepare::Presentation;
use crate::session::prepare::SessionItem;
use crate::session::variant::Variant;
use crate::session::variant::autoplay_text;
use crate::session::variant::revealed_answer;
use crate::web::state::ActiveSession;
use crate::web::state::SessionHandle;

/// Render the whole screen of the running session.
pub fn session_screen(handle: &SessionHandle) -> Markup {
    match &handle.session {
        ActiveSession::Drill(session) => drill_screen(handle, session),
        ActiveSession::Browse(session) => browse_screen(handle, session),
        ActiveSession::Matching(session) => matching_screen(handle, session),
        ActiveSession::Defense(session) => defense_screen(handle, session),
    }
}

fn drill_screen(handle: &SessionHandle, session: &Session) -> Markup {
    let variant = session.variant();
    let body = match (session.feedback(), session.feedback_entry()) {
        (Some(feedback), Some((entry, item))) => feedback_panel(variant, feedback, entry, item),
        _ => {
            if session.finished() {
                completion_panel(&format!(
                    "Score: {} / {}",
                    session.score(),
                    session.item_count()
                ))
            } else {
                match session.current() {
                    Some((entry, item)) => entry_panel(variant, entry, item),
                    None => completion_panel(""),
                }
            }
        }
    };
    session_page(handle, Some(session.progress()), body)
}

fn browse_screen(handle: &SessionHandle, session: &BrowseSession) -> Markup {
    let card = session.current();
    let body = html! {
        div.content {
            @if session.flipped() {
                div.flashcard.back { (card.answer) }
            } @else {
                div.flashcard.front {
                    span { (card.question) }
                    (replay_button(card.spoken()))
                }
            }
            div.controls-row {
                form.inline action="/session/action" method="post" {
                    input type="submit" name="action" value="Prev";
                }
                form.inline action="/session/action" method="post" {
                    input type="submit" name="action" value="Flip";
                }
                form.inline action="/session/action" method="post" {
                    input type="submit" name="action" value="Next";
                }
            }
        }
    };
    session_page(handle, Some(session.progress()), body)
}

fn matching_screen(handle: &SessionHandle, session: &MatchingSession) -> Markup {
    let body = if session.finished() {
        completion_panel(&format!("{} pairs matched", session.item_count()))
    } else {
        let (matched, total) = session.section_progress();
        let wrong = session.last_wrong();
        html! {
            div.content {
                div.board {
                    @for card in session.cards() {
                        @if session.is_matched(card) {
                            div class="tile matched" { (card.content) }
                        } @else {
                            form.inline action="/session/answer" method="post" {
                                button
                                    class=(tile_class(
                                        session.selected() == Some(card.uid.as_str()),
                                        wrong.is_some_and(|(a, b)| a == card.uid || b == card.uid),
                                    ))
                                    type="submit" name="pick" value=(card.uid) {
                                    (card.content)
                                }
                            }
                        }
                    }
                }
                div.hint { (matched) " / " (total) " pairs" }
            }
        }
    };
    session_page(handle, Some(session.progress()), body)
}

fn defense_screen(handle: &SessionHandle, session: &DefenseSession) -> Markup {
    let body = match session.outcome() {
        Some(Outcome::Victory) => completion_panel(&format!(
            "Victory! All {} enemies defeated.",
            session.enemy_count()
        )),
        Some(Outcome::Defeat) => html! {
            div.content.finished {
                h1 { "Defeat" }
                p.score {
                    "The tower fell after " (session.kills()) " of "
                    (session.enemy_count()) " enemies."
                }
            }
        },
        None => {
            let question = session.current_question();
            html! {
                div.content {
                    div.difficulty { (session.difficulty().title()) }
                    div.battlefield {
                        div.tower {
                            span.sprite { "🏰" }
                            div.hearts {
                                @for _ in 0..session.tower_hp() {
                                    span.heart { "❤" }
                                }
                            }
                        }
                        div.enemies {
                            @for enemy in session.enemies() {
                                div class=(format!("enemy {}", enemy.skin.label())) {
                                    span.sprite { "👾" }
                                    div.hp {
                                        @for _ in 0..enemy.hp {
                                            span.pip { "●" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                    @if let Some(last) = session.last_turn() {
                        div.turn-note { (turn_note(last)) }
                    }
                    div.prompt { (question.prompt) }
                    div.options {
                        @for option in &question.options {
                            form.inline action="/session/answer" method="post" {
                                button type="submit" name="answer" value=(option) { (option) }
                            }
                        }
                    }
                }
            }
        }
    };
    session_page(handle, Some((session.kills(), session.enemy_count())), body)
}

fn session_page(handle: &SessionHandle, progress: Option<(usize, usize)>, body: Markup) -> Markup {
    html! {
        div.root {
            div.card {
                div.header {
                    div.context {
                        h1 { (handle.title) }
                        div.mode { (handle.variant.title()) }
                    }
                    @if let Some((done, total)) = progress {
                        div.progress { (done) " / " (total) }
                    }
                }
                (body)
                div.footer {
                    form.inline action="/session/action" method="post" {
                        input type="submit" name="action" value="Restart";
                    }
                    form.inline action="/session/action" method="post" {
                        input type="submit" name="action" value="Exit";
                    }
                }
            }
        }
    }
}

fn entry_panel(variant: Variant, entry: &QueueEntry, item: &SessionItem) -> Markup {
    let content = match (variant, item, &entry.presentation) {
        (Variant::TypingViEn, SessionItem::Flashcard(card), _) => html! {
            div.prompt { (card.answer) }
            (typed_answer_form(entry, "Type the English word", None))
        },
        (Variant::TypingEnVi, SessionItem::Flashcard(card), _) => html! {
            div.prompt {
                span { (card.question) }
                (replay_button(card.spoken()))
            }
            (typed_answer_form(entry, "Type the Vietnamese meaning", None))
        },
        (
            Variant::MissingLetter,
            SessionItem::Flashcard(card),
            Presentation::MaskedWord { positions },
        ) => html! {
            div.prompt.masked-word {
                @for (index, c) in card.spoken().chars().enumerate() {
                    @if positions.contains(&index) {
                        span.blank { "_" }
                    } @else {
                        span { (c) }
                    }
                }
            }
            div.hint { (card.answer) }
            (typed_answer_form(entry, "Missing letters", Some(positions.len())))
        },
        (Variant::Quiz, SessionItem::Quiz(quiz), Presentation::Choice { order }) => {
            let options: Vec<&String> = order.iter().filter_map(|&i| quiz.options.get(i)).collect();
            html! {
                div.prompt { (quiz.text) }
                (option_buttons(entry, &options))
            }
        }
        (
            Variant::Listening,
            SessionItem::Speak(speak),
            Presentation::Listening { order, target },
        ) => {
            let spoken = speak.options.get(*target).cloned().unwrap_or_default();
            let options: Vec<&String> =
                order.iter().filter_map(|&i| speak.options.get(i)).collect();
            html! {
                div.prompt {
                    span { "Which word do you hear?" }
                    (replay_button(&spoken))
                }
                (option_buttons(entry, &options))
            }
        }
        (Variant::Definition, SessionItem::Speak(speak), Presentation::Choice { order }) => {
            let options: Vec<&String> =
                order.iter().filter_map(|&i| speak.options.get(i)).collect();
            html! {
                div.prompt { (speak.answer.as_deref().unwrap_or(&speak.question)) }
                (option_buttons(entry, &options))
            }
        }
        (
            Variant::Spelling,
            SessionItem::Speak(speak),
            Presentation::Spelling { listens_used },
        ) => {
            let remaining = LISTEN_LIMIT.saturating_sub(*listens_used);
            html! {
                div.prompt { "Listen and type the word." }
                @if let Some(definition) = &speak.answer {
                    div.hint { (definition) }
                }
                div.controls-row {
                    form.inline action="/session/action" method="post" {
                        input type="hidden" name="entry" value=(entry.entry_id);
                        @if remaining == 0 {
                            input type="submit" name="action" value="Listen" disabled;
                        } @else {
                            input type="submit" name="action" value="Listen";
                        }
                    }
                    div.listens { (remaining) " replays left" }
                }
                (typed_answer_form(entry, "Spell the word", None))
            }
        }
        (
            Variant::Repair,
            SessionItem::Repair(repair),
            Presentation::Repair { order, composed },
        ) => {
            let tokens = repair.tokens();
            let sentence: Vec<String> = composed
                .iter()
                .filter_map(|&i| order.get(i).and_then(|&j| tokens.get(j)).cloned())
                .collect();
            html! {
                div.prompt { "Rebuild the sentence." }
                div.composed {
                    @if sentence.is_empty() {
                        span.placeholder { "…" }
                    } @else {
                        (join_sentence(&sentence))
                    }
                }
                div.options {
                    @for (position, &token_index) in order.iter().enumerate() {
                        @if !composed.contains(&position) {
                            @if let Some(token) = tokens.get(token_index) {
                                form.inline action="/session/answer" method="post" {
                                    input type="hidden" name="entry" value=(entry.entry_id);
                                    button type="submit" name="token" value=(position) { (token) }
                                }
                            }
                        }
                    }
                }
                div.controls-row {
                    form.inline action="/session/action" method="post" {
                        input type="hidden" name="entry" value=(entry.entry_id);
                        input type="submit" name="action" value="Undo";
                    }
                    form.inline action="/session/answer" method="post" {
                        input type="hidden" name="entry" value=(entry.entry_id);
                        input type="hidden" name="answer" value="";
                        input type="submit" value="Check";
                    }
                }
            }
        }
        (Variant::Phonetic, SessionItem::Phonetic(item), Presentation::Choice { order }) => html! {
            div.prompt { (item.instruction) }
            @if let Some(highlight) = &item.highlight {
                div.highlight { (highlight) }
            }
            div.options {
                @for &i in order {
                    @if let Some(option) = item.options.get(i) {
                        form.inline action="/session/answer" method="post" {
                            input type="hidden" name="entry" value=(entry.entry_id);
                            button type="submit" name="answer" value=(option.word) {
                                span.word {
                                    @for (index, c) in option.word.chars().enumerate() {
                                        @if option.highlight_indexes.contains(&index) {
                                            span.hl { (c) }
                                        } @else {
                                            (c)
                                        }
                                    }
                                }
                                span.ipa { (option.ipa) }
                            }
                        }
                    }
                }
            }
        },
        _ => html! {},
    };
    let spoken = autoplay_text(variant, item, &entry.presentation);
    html! {
        div.content data-speak=[spoken] { (content) }
    }
}

fn feedback_panel(
    variant: Variant,
    feedback: &Feedback,
    entry: &QueueEntry,
    item: &SessionItem,
) -> Markup {
    let answer = revealed_answer(variant, item, &entry.presentation);
    let auto = feedback.correct && variant.auto_advances_on_correct();
    let continue_form = html! {
        input type="hidden" name="entry" value=(entry.entry_id);
        input type="submit" name="action" value="Continue";
    };
    html! {
        div.content {
            @if feedback.correct {
                div.verdict.ok { "Correct!" }
            } @else {
                div.verdict.wrong { "Incorrect" }
            }
            @if !feedback.correct && !feedback.submitted.trim().is_empty() {
                div.submitted { "You answered: " (feedback.submitted) }
            }
            div.answer { "Answer: " (answer) }
            @if let Some(explanation) = explanation_text(item) {
                div.explanation { (explanation) }
            }
            @if auto {
                form.continue-form action="/session/action" method="post" data-advance="1" {
                    (continue_form)
                }
            } @else {
                form.continue-form action="/session/action" method="post" {
                    (continue_form)
                }
            }
        }
    }
}

fn completion_panel(score_line: &str) -> Markup {
    html! {
        div.content.finished {
            h1 { "Session Completed" }
            @if !score_line.is_empty() {
                p.score { (score_line) }
            }
        }
    }
}

/// Extra text revealed with the answer, where the item carries any.
fn explanation_text(item: &SessionItem) -> Option<&str> {
    match item {
        SessionItem::Quiz(item) => item.explanation.as_deref(),
        SessionItem::Phonetic(item) => item.explanation.as_deref(),
        SessionItem::Speak(item) => item.answer.as_deref(),
        _ => None,
    }
}

fn typed_answer_form(entry: &QueueEntry, label: &str, maxlength: Option<usize>) -> Markup {
    html! {
        form.answer-form action="/session/answer" method="post" {
            input type="hidden" name="entry" value=(entry.entry_id);
            input type="text" name="answer" placeholder=(label) autocomplete="off"
                autofocus maxlength=[maxlength];
            input type="submit" value="Check";
        }
    }
}

fn option_buttons(entry: &QueueEntry, options: &[&String]) -> Markup {
    html! {
        div.options {
            @for option in options {
                form.inline action="/session/answer" method="post" {
                    input type="hidden" name="entry" value=(entry.entry_id);
                    button type="submit" name="answer" value=(option) { (option) }
                }
            }
        }
    }
}

fn replay_button(text: &str) -> Markup {
    html! {
        button.speak type="button" data-speak-text=(text) { "🔊" }
    }
}

fn tile_class(selected: bool, missed: bool) -> &'static str {
    if selected {
        "tile selected"
    } else if missed {
        "tile wrong"
    } else {
        "tile"
    }
}

fn turn_note(last: TurnOutcome) -> &'static str {
    match last {
        TurnOutcome::Hit => "Hit! The front enemy took damage.",
        TurnOutcome::Kill => "Enemy down!",
        TurnOutcome::TowerHit => "Miss! The tower took a hit.",
    }
}
