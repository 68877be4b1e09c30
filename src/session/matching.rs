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

use std::collections::HashSet;

use crate::error::Fallible;
use crate::error::fail;
use crate::shuffle::shuffle;
use crate::shuffle::shuffled_indices;
use crate::types::content_set::ContentSet;
use crate::types::content_set::SetContent;
use crate::types::item::FlashcardItem;

/// Pairs drilled together in one board.
pub const SECTION_SIZE: usize = 5;

/// One face-up tile on the matching board. The uid encodes the side
/// and the pair index, so the client form can post it back verbatim.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MatchCard {
    pub uid: String,
    /// Index into the session's item arena.
    pub item: usize,
    pub answer_side: bool,
    pub content: String,
}

/// A pair-matching session over flashcard sets.
///
/// The items are shuffled once and split into sections of up to
/// [SECTION_SIZE] pairs. Clearing a section advances to the next;
/// clearing the last finishes the session. There is no retry queue:
/// a wrong pair just deselects.
pub struct MatchingSession {
    items: Vec<FlashcardItem>,
    sections: Vec<Vec<usize>>,
    current_section: usize,
    cards: Vec<MatchCard>,
    matched: HashSet<usize>,
    selected: Option<String>,
    last_wrong: Option<(String, String)>,
}

impl MatchingSession {
    pub fn start(sets: &[ContentSet]) -> Fallible<MatchingSession> {
        let mut items: Vec<FlashcardItem> = Vec::new();
        for set in sets {
            match &set.content {
                SetContent::Flashcard(cards) => items.extend(cards.iter().cloned()),
                other => {
                    return fail(format!(
                        "Invalid category for Matching: {}",
                        other.category()
                    ));
                }
            }
        }
        items.retain(|item| !item.question.trim().is_empty() && !item.answer.trim().is_empty());
        if items.is_empty() {
            return fail("No questions found");
        }
        let mut session = MatchingSession {
            items,
            sections: Vec::new(),
            current_section: 0,
            cards: Vec::new(),
            matched: HashSet::new(),
            selected: None,
            last_wrong: None,
        };
        session.build_sections();
        Ok(session)
    }

    pub fn cards(&self) -> &[MatchCard] {
        &self.cards
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The last mismatched pair, cleared by the next pick. The client
    /// flashes these tiles red.
    pub fn last_wrong(&self) -> Option<(&str, &str)> {
        self.last_wrong
            .as_ref()
            .map(|(a, b)| (a.as_str(), b.as_str()))
    }

    pub fn is_matched(&self, card: &MatchCard) -> bool {
        self.matched.contains(&card.item)
    }

    pub fn finished(&self) -> bool {
        self.current_section >= self.sections.len()
    }

    /// Sections cleared and the total number of sections.
    pub fn progress(&self) -> (usize, usize) {
        (self.current_section, self.sections.len())
    }

    /// Pairs matched so far on the current board.
    pub fn section_progress(&self) -> (usize, usize) {
        let total = self
            .sections
            .get(self.current_section)
            .map(Vec::len)
            .unwrap_or(0);
        (self.matched.len(), total)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Select a tile. Picking the selected tile again deselects it;
    /// picking its partner clears the pair; picking anything else
    /// records a miss and deselects. Picks of matched or unknown tiles
    /// are dropped.
    pub fn pick(&mut self, uid: &str) {
        self.last_wrong = None;
        if self.finished() {
            return;
        }
        let picked = match self.cards.iter().find(|card| card.uid == uid) {
            Some(card) => card.clone(),
            None => {
                log::debug!("Ignoring pick of unknown tile {}", uid);
                return;
            }
        };
        if self.matched.contains(&picked.item) {
            return;
        }
        let previous = match self.selected.take() {
            Some(uid) => uid,
            None => {
                self.selected = Some(picked.uid);
                return;
            }
        };
        if previous == picked.uid {
            return;
        }
        let first = match self.cards.iter().find(|card| card.uid == previous) {
            Some(card) => card.clone(),
            None => return,
        };
        if first.item == picked.item && first.answer_side != picked.answer_side {
            self.matched.insert(picked.item);
            if self.matched.len() == self.sections[self.current_section].len() {
                self.current_section += 1;
                self.enter_section();
            }
        } else {
            self.last_wrong = Some((first.uid, picked.uid));
        }
    }

    /// Start over with a fresh shuffle of the same items.
    pub fn restart(&mut self) {
        self.current_section = 0;
        self.build_sections();
    }

    fn build_sections(&mut self) {
        self.sections = shuffled_indices(self.items.len())
            .chunks(SECTION_SIZE)
            .map(|chunk| chunk.to_vec())
            .collect();
        self.enter_section();
    }

    fn enter_section(&mut self) {
        self.matched.clear();
        self.selected = None;
        self.last_wrong = None;
        self.cards.clear();
        let Some(section) = self.sections.get(self.current_section) else {
            return;
        };
        let mut cards = Vec::with_capacity(section.len() * 2);
        for &item in section {
            cards.push(MatchCard {
                uid: format!("q-{}", item),
                item,
                answer_side: false,
                content: self.items[item].spoken().to_string(),
            });
            cards.push(MatchCard {
                uid: format!("a-{}", item),
                item,
                answer_side: true,
                content: self.items[item].answer.clone(),
            });
        }
        self.cards = shuffle(cards);
    }
}
