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

use axum::Form;
use axum::extract::State;
use axum::response::Redirect;
use serde::Deserialize;
use serde_json::Value;

use crate::error::Fallible;
use crate::error::fail;
use crate::import::ImportOutcome;
use crate::import::import_document;
use crate::session::browse::BrowseSession;
use crate::session::defense::DefenseSession;
use crate::session::defense::Difficulty;
use crate::session::engine::Session;
use crate::session::matching::MatchingSession;
use crate::session::variant::Variant;
use crate::types::category::Category;
use crate::types::content_set::SetContent;
use crate::types::entry_id::EntryId;
use crate::types::set_id::SetId;
use crate::web::state::ActiveSession;
use crate::web::state::ServerState;
use crate::web::state::SessionHandle;

/// Session controls that are not answers.
#[derive(Debug, Deserialize)]
enum Action {
    Continue,
    Listen,
    Undo,
    Flip,
    Next,
    Prev,
    Restart,
    Exit,
}

#[derive(Debug, Deserialize)]
pub struct ActionForm {
    action: Action,
    #[serde(default)]
    entry: Option<u64>,
}

pub async fn action_handler(
    State(state): State<ServerState>,
    Form(form): Form<ActionForm>,
) -> Redirect {
    let exit = matches!(form.action, Action::Exit);
    match apply_action(&state, form) {
        Ok(_) => {}
        Err(e) => {
            log::error!("error: {e}");
        }
    }
    if exit {
        Redirect::to("/")
    } else {
        Redirect::to("/session")
    }
}

fn apply_action(state: &ServerState, form: ActionForm) -> Fallible<()> {
    let mut mutable = state.mutable.lock().unwrap();
    if matches!(form.action, Action::Exit) {
        mutable.active = None;
        return Ok(());
    }
    let Some(handle) = mutable.active.as_mut() else {
        return fail("No active session");
    };
    match (&mut handle.session, form.action) {
        (ActiveSession::Drill(session), Action::Continue) => {
            session.acknowledge(entry_id(form.entry)?);
        }
        (ActiveSession::Drill(session), Action::Listen) => {
            session.use_listen(entry_id(form.entry)?);
        }
        (ActiveSession::Drill(session), Action::Undo) => {
            session.repair_undo(entry_id(form.entry)?);
        }
        (ActiveSession::Drill(session), Action::Restart) => session.restart(),
        (ActiveSession::Browse(session), Action::Flip) => session.flip(),
        (ActiveSession::Browse(session), Action::Next) => session.next(),
        (ActiveSession::Browse(session), Action::Prev) => session.prev(),
        (ActiveSession::Browse(session), Action::Restart) => session.restart(),
        (ActiveSession::Matching(session), Action::Restart) => session.restart(),
        (ActiveSession::Defense(session), Action::Restart) => session.restart(),
        (_, action) => return fail(format!("Action {:?} does not apply here", action)),
    }
    Ok(())
}

fn entry_id(entry: Option<u64>) -> Fallible<EntryId> {
    match entry {
        Some(n) => Ok(EntryId::new(n)),
        None => fail("Missing entry"),
    }
}

#[derive(Debug, Deserialize)]
pub struct AnswerForm {
    #[serde(default)]
    entry: Option<u64>,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    pick: Option<String>,
    #[serde(default)]
    token: Option<usize>,
}

pub async fn answer_handler(
    State(state): State<ServerState>,
    Form(form): Form<AnswerForm>,
) -> Redirect {
    match apply_answer(&state, form) {
        Ok(_) => {}
        Err(e) => {
            log::error!("error: {e}");
        }
    }
    Redirect::to("/session")
}

fn apply_answer(state: &ServerState, form: AnswerForm) -> Fallible<()> {
    let mut mutable = state.mutable.lock().unwrap();
    let Some(handle) = mutable.active.as_mut() else {
        return fail("No active session");
    };
    match &mut handle.session {
        ActiveSession::Drill(session) => {
            let entry = entry_id(form.entry)?;
            match form.token {
                Some(index) => {
                    session.repair_pick(entry, index);
                    Ok(())
                }
                None => session.submit_answer(entry, form.answer.as_deref().unwrap_or("")),
            }
        }
        ActiveSession::Matching(session) => {
            let Some(pick) = form.pick else {
                return fail("Missing tile");
            };
            session.pick(&pick);
            Ok(())
        }
        ActiveSession::Defense(session) => {
            let Some(answer) = form.answer else {
                return fail("Missing answer");
            };
            session.turn(&answer);
            Ok(())
        }
        ActiveSession::Browse(_) => fail("Nothing to answer here"),
    }
}

#[derive(Debug, Deserialize)]
pub struct StartForm {
    category: String,
    id: String,
    variant: Variant,
    #[serde(default)]
    difficulty: Option<Difficulty>,
}

pub async fn start_handler(
    State(state): State<ServerState>,
    Form(form): Form<StartForm>,
) -> Redirect {
    let back = format!("/sets/{}/{}", form.category, form.id);
    match start_session(&state, form) {
        Ok(_) => Redirect::to("/session"),
        Err(e) => {
            log::error!("error: {e}");
            state.mutable.lock().unwrap().flash = Some(e.message().to_string());
            Redirect::to(&back)
        }
    }
}

fn start_session(state: &ServerState, form: StartForm) -> Fallible<()> {
    let category = Category::try_from(form.category)?;
    let id = SetId::new(form.id)?;
    let Some(set) = state.db.get_by_id(category, &id)? else {
        return fail(format!("Set not found: {}", id));
    };
    let session = match form.variant {
        Variant::Flashcards => {
            ActiveSession::Browse(BrowseSession::start(std::slice::from_ref(&set))?)
        }
        Variant::Matching => {
            ActiveSession::Matching(MatchingSession::start(std::slice::from_ref(&set))?)
        }
        Variant::Defense => {
            let SetContent::Defense(config) = &set.content else {
                return fail(format!("Not a defense set: {}", set.id));
            };
            let Some(difficulty) = form.difficulty else {
                return fail("Missing difficulty");
            };
            let Some(source) = state.db.get_by_id(config.source_type, &config.source_id)? else {
                return fail(format!("Source set not found: {}", config.source_id));
            };
            ActiveSession::Defense(DefenseSession::start(config, &source, difficulty)?)
        }
        variant => ActiveSession::Drill(Session::start(variant, std::slice::from_ref(&set))?),
    };
    let mut mutable = state.mutable.lock().unwrap();
    mutable.active = Some(SessionHandle {
        category,
        set_id: set.id.clone(),
        title: set.title.clone(),
        variant: form.variant,
        session,
    });
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct ImportForm {
    category: String,
    document: String,
}

pub async fn import_handler(
    State(state): State<ServerState>,
    Form(form): Form<ImportForm>,
) -> Redirect {
    let message = match import_pasted(&state, form) {
        Ok(message) => message,
        Err(e) => format!("Error: {}", e.message()),
    };
    state.mutable.lock().unwrap().flash = Some(message);
    Redirect::to("/admin")
}

fn import_pasted(state: &ServerState, form: ImportForm) -> Fallible<String> {
    let category = Category::try_from(form.category)?;
    let outcome = match serde_json::from_str::<Value>(&form.document) {
        Ok(document) => import_document(&state.db, category, &document),
        Err(e) => ImportOutcome::Failed {
            message: e.to_string(),
        },
    };
    Ok(outcome.describe("document"))
}

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    category: String,
    id: String,
}

pub async fn delete_handler(
    State(state): State<ServerState>,
    Form(form): Form<DeleteForm>,
) -> Redirect {
    let message = match delete_set(&state, form) {
        Ok(message) => message,
        Err(e) => format!("Error: {}", e.message()),
    };
    state.mutable.lock().unwrap().flash = Some(message);
    Redirect::to("/admin")
}

fn delete_set(state: &ServerState, form: DeleteForm) -> Fallible<String> {
    let category = Category::try_from(form.category)?;
    let id = SetId::new(form.id)?;
    if state.db.delete(category, &id)? {
        Ok(format!("Deleted {}.", id))
    } else {
        Ok(format!("Set not found: {}", id))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::store::Database;
    use crate::types::content_set::ContentSet;
    use crate::types::item::QuizItem;

    fn test_state() -> Fallible<ServerState> {
        let directory = tempdir()?;
        let path = directory.keep().join("lexdrill.db");
        Ok(ServerState::new(Database::new(&path.display().to_string())?))
    }

    fn quiz_set(id: &str) -> ContentSet {
        ContentSet {
            id: SetId::new(id).unwrap(),
            title: format!("Set {}", id),
            description: None,
            subject: None,
            tags: Vec::new(),
            content: SetContent::Quiz(vec![QuizItem {
                text: "Pick A".to_string(),
                options: vec!["A".to_string(), "B".to_string()],
                correct_answer: "A".to_string(),
                explanation: None,
            }]),
        }
    }

    fn start_quiz(state: &ServerState) -> Fallible<()> {
        start_session(
            state,
            StartForm {
                category: "quiz".to_string(),
                id: "q1".to_string(),
                variant: Variant::Quiz,
                difficulty: None,
            },
        )
    }

    fn current_entry(state: &ServerState) -> u64 {
        let mutable = state.mutable.lock().unwrap();
        let Some(SessionHandle {
            session: ActiveSession::Drill(session),
            ..
        }) = &mutable.active
        else {
            panic!("no drill session");
        };
        let (entry, _) = session.current().unwrap();
        entry.entry_id.value()
    }

    #[test]
    fn test_start_answer_continue() -> Fallible<()> {
        let state = test_state()?;
        state.db.save(&quiz_set("q1"))?;
        start_quiz(&state)?;
        let entry = current_entry(&state);
        apply_answer(
            &state,
            AnswerForm {
                entry: Some(entry),
                answer: Some("A".to_string()),
                pick: None,
                token: None,
            },
        )?;
        apply_action(
            &state,
            ActionForm {
                action: Action::Continue,
                entry: Some(entry),
            },
        )?;
        let mutable = state.mutable.lock().unwrap();
        let Some(SessionHandle {
            session: ActiveSession::Drill(session),
            ..
        }) = &mutable.active
        else {
            panic!("no drill session");
        };
        assert!(session.finished());
        assert_eq!(session.score(), 1);
        Ok(())
    }

    #[test]
    fn test_start_unknown_set() -> Fallible<()> {
        let state = test_state()?;
        let result = start_session(
            &state,
            StartForm {
                category: "quiz".to_string(),
                id: "missing".to_string(),
                variant: Variant::Quiz,
                difficulty: None,
            },
        );
        assert_eq!(
            result.unwrap_err().message(),
            "Set not found: missing".to_string()
        );
        Ok(())
    }

    #[test]
    fn test_start_replaces_running_session() -> Fallible<()> {
        let state = test_state()?;
        state.db.save(&quiz_set("q1"))?;
        state.db.save(&quiz_set("q2"))?;
        start_quiz(&state)?;
        start_session(
            &state,
            StartForm {
                category: "quiz".to_string(),
                id: "q2".to_string(),
                variant: Variant::Quiz,
                difficulty: None,
            },
        )?;
        let mutable = state.mutable.lock().unwrap();
        let handle = mutable.active.as_ref().unwrap();
        assert_eq!(handle.set_id.as_str(), "q2");
        Ok(())
    }

    #[test]
    fn test_exit_clears_session() -> Fallible<()> {
        let state = test_state()?;
        state.db.save(&quiz_set("q1"))?;
        start_quiz(&state)?;
        apply_action(
            &state,
            ActionForm {
                action: Action::Exit,
                entry: None,
            },
        )?;
        assert!(state.mutable.lock().unwrap().active.is_none());
        Ok(())
    }

    #[test]
    fn test_action_without_session() -> Fallible<()> {
        let state = test_state()?;
        let result = apply_action(
            &state,
            ActionForm {
                action: Action::Restart,
                entry: None,
            },
        );
        assert_eq!(result.unwrap_err().message(), "No active session");
        Ok(())
    }

    #[test]
    fn test_defense_requires_difficulty() -> Fallible<()> {
        let state = test_state()?;
        state.db.save(&quiz_set("q1"))?;
        state.db.save(&ContentSet {
            id: SetId::new("battle")?,
            title: "Battle".to_string(),
            description: None,
            subject: None,
            tags: Vec::new(),
            content: SetContent::Defense(crate::types::content_set::DefenseConfig {
                source_type: Category::Quiz,
                source_id: SetId::new("q1")?,
                enemy_count: 5,
                spawn_rate: 2000,
            }),
        })?;
        let result = start_session(
            &state,
            StartForm {
                category: "defense".to_string(),
                id: "battle".to_string(),
                variant: Variant::Defense,
                difficulty: None,
            },
        );
        assert_eq!(result.unwrap_err().message(), "Missing difficulty");
        Ok(())
    }

    #[test]
    fn test_import_pasted_document() -> Fallible<()> {
        let state = test_state()?;
        let document = r#"{
            "category": "quiz",
            "id": "pasted",
            "title": "Pasted",
            "questions": [
                {"text": "Pick A", "options": ["A", "B"], "correctAnswer": "A"}
            ]
        }"#;
        let message = import_pasted(
            &state,
            ImportForm {
                category: "quiz".to_string(),
                document: document.to_string(),
            },
        )?;
        assert_eq!(message, "Imported: Pasted");
        assert!(
            state
                .db
                .get_by_id(Category::Quiz, &SetId::new("pasted")?)?
                .is_some()
        );
        Ok(())
    }

    #[test]
    fn test_import_rejects_bad_json() -> Fallible<()> {
        let state = test_state()?;
        let message = import_pasted(
            &state,
            ImportForm {
                category: "quiz".to_string(),
                document: "not json".to_string(),
            },
        )?;
        assert!(message.starts_with("Error processing document:"));
        Ok(())
    }

    #[test]
    fn test_delete_set() -> Fallible<()> {
        let state = test_state()?;
        state.db.save(&quiz_set("q1"))?;
        let message = delete_set(
            &state,
            DeleteForm {
                category: "quiz".to_string(),
                id: "q1".to_string(),
            },
        )?;
        assert_eq!(message, "Deleted q1.");
        let message = delete_set(
            &state,
            DeleteForm {
                category: "quiz".to_string(),
                id: "q1".to_string(),
            },
        )?;
        assert_eq!(message, "Set not found: q1");
        Ok(())
    }
}
