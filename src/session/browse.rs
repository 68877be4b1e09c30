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

use crate::error::Fallible;
use crate::error::fail;
use crate::shuffle::shuffle;
use crate::types::content_set::ContentSet;
use crate::types::content_set::SetContent;
use crate::types::item::FlashcardItem;

/// Free-paced flashcard review. Cards are shuffled once, the learner
/// flips and steps through them at will, and nothing is judged or
/// scored.
pub struct BrowseSession {
    items: Vec<FlashcardItem>,
    position: usize,
    flipped: bool,
}

impl BrowseSession {
    pub fn start(sets: &[ContentSet]) -> Fallible<BrowseSession> {
        let mut items: Vec<FlashcardItem> = Vec::new();
        for set in sets {
            match &set.content {
                SetContent::Flashcard(cards) => items.extend(cards.iter().cloned()),
                other => {
                    return fail(format!(
                        "Invalid category for Flashcards: {}",
                        other.category()
                    ));
                }
            }
        }
        if items.is_empty() {
            return fail("No questions found");
        }
        Ok(BrowseSession {
            items: shuffle(items),
            position: 0,
            flipped: false,
        })
    }

    pub fn current(&self) -> &FlashcardItem {
        &self.items[self.position]
    }

    pub fn flipped(&self) -> bool {
        self.flipped
    }

    /// Card number (1-based) and the deck size.
    pub fn progress(&self) -> (usize, usize) {
        (self.position + 1, self.items.len())
    }

    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }

    /// Step forward. The last card is a wall, not a wrap.
    pub fn next(&mut self) {
        if self.position + 1 < self.items.len() {
            self.position += 1;
            self.flipped = false;
        }
    }

    /// Step backward, stopping at the first card.
    pub fn prev(&mut self) {
        if self.position > 0 {
            self.position -= 1;
            self.flipped = false;
        }
    }

    /// Reshuffle the deck and jump back to the first card.
    pub fn restart(&mut self) {
        let items = std::mem::take(&mut self.items);
        self.items = shuffle(items);
        self.position = 0;
        self.flipped = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::set_id::SetId;

    fn deck(pairs: &[(&str, &str)]) -> ContentSet {
        ContentSet {
            id: SetId::new("s1").unwrap(),
            title: "Test".to_string(),
            description: None,
            subject: None,
            tags: Vec::new(),
            content: SetContent::Flashcard(
                pairs
                    .iter()
                    .map(|(question, answer)| FlashcardItem {
                        question: question.to_string(),
                        answer: answer.to_string(),
                        speak: None,
                    })
                    .collect(),
            ),
        }
    }

    #[test]
    fn test_stepping_stays_in_bounds() -> Fallible<()> {
        let mut session = BrowseSession::start(&[deck(&[("cat", "mèo"), ("dog", "chó")])])?;
        assert_eq!(session.progress(), (1, 2));
        session.prev();
        assert_eq!(session.progress(), (1, 2));
        session.next();
        assert_eq!(session.progress(), (2, 2));
        session.next();
        assert_eq!(session.progress(), (2, 2));
        session.prev();
        assert_eq!(session.progress(), (1, 2));
        Ok(())
    }

    #[test]
    fn test_moving_unflips_the_card() -> Fallible<()> {
        let mut session = BrowseSession::start(&[deck(&[("cat", "mèo"), ("dog", "chó")])])?;
        session.flip();
        assert!(session.flipped());
        session.flip();
        assert!(!session.flipped());
        session.flip();
        session.next();
        assert!(!session.flipped());
        session.flip();
        session.prev();
        assert!(!session.flipped());
        Ok(())
    }

    #[test]
    fn test_restart_rewinds() -> Fallible<()> {
        let mut session = BrowseSession::start(&[deck(&[("cat", "mèo"), ("dog", "chó")])])?;
        session.next();
        session.flip();
        session.restart();
        assert_eq!(session.progress(), (1, 2));
        assert!(!session.flipped());
        Ok(())
    }

    #[test]
    fn test_empty_deck_is_an_error() {
        let result = BrowseSession::start(&[deck(&[])]);
        assert_eq!(
            result.err().map(|e| e.message().to_string()),
            Some("No questions found".to_string())
        );
    }
}
