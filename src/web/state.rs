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

use std::sync::Arc;
use std::sync::Mutex;

use crate::session::browse::BrowseSession;
use crate::session::defense::DefenseSession;
use crate::session::engine::Session;
use crate::session::matching::MatchingSession;
use crate::session::variant::Variant;
use crate::store::Database;
use crate::types::category::Category;
use crate::types::set_id::SetId;

#[derive(Clone)]
pub struct ServerState {
    pub db: Database,
    pub mutable: Arc<Mutex<MutableState>>,
}

impl ServerState {
    pub fn new(db: Database) -> Self {
        ServerState {
            db,
            mutable: Arc::new(Mutex::new(MutableState {
                active: None,
                flash: None,
            })),
        }
    }
}

pub struct MutableState {
    /// At most one session runs at a time; starting a new one replaces
    /// the old.
    pub active: Option<SessionHandle>,
    /// A one-shot notice consumed by the next page that renders it.
    pub flash: Option<String>,
}

/// The running session plus what it was started from, for the header
/// and the exit link.
pub struct SessionHandle {
    pub category: Category,
    pub set_id: SetId,
    pub title: String,
    pub variant: Variant,
    pub session: ActiveSession,
}

pub enum ActiveSession {
    Drill(Session),
    Browse(BrowseSession),
    Matching(MatchingSession),
    Defense(DefenseSession),
}
