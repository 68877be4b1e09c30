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
use crate::session::variant::Variant;
use crate::shuffle::pick_index;
use crate::shuffle::sample_sorted;
use crate::shuffle::shuffled_indices;
use crate::types::content_set::ContentSet;
use crate::types::content_set::SetContent;
use crate::types::item::FlashcardItem;
use crate::types::item::PhoneticItem;
use crate::types::item::QuizItem;
use crate::types::item::RepairItem;
use crate::types::item::SpeakItem;

/// The most times one occurrence of a spelling entry may be played,
/// counting the automatic play on arrival.
pub const LISTEN_LIMIT: u32 = 4;

/// One item in a session's arena. Queue entries reference items by
/// index; the arena itself never changes during a session.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SessionItem {
    Flashcard(FlashcardItem),
    Quiz(QuizItem),
    Repair(RepairItem),
    Speak(SpeakItem),
    Phonetic(PhoneticItem),
}

/// Per-occurrence presentation state. Rebuilt from scratch for every
/// queue entry, including retry copies.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Presentation {
    Plain,
    /// A permutation of the item's option indices.
    Choice { order: Vec<usize> },
    /// As [Presentation::Choice], plus the option index spoken aloud.
    Listening { order: Vec<usize>, target: usize },
    /// Char positions of the target word hidden from the learner.
    MaskedWord { positions: Vec<usize> },
    Spelling { listens_used: u32 },
    /// A permutation of the item's token indices, and the presented
    /// positions picked so far.
    Repair { order: Vec<usize>, composed: Vec<usize> },
}

/// Flatten one or more sets into a session arena. Sets must belong to
/// the variant's source category; items the variant cannot drill (a
/// listening item with no options, a word with no letters to mask) are
/// left out.
pub fn flatten(variant: Variant, sets: &[ContentSet]) -> Fallible<Vec<SessionItem>> {
    let mut items = Vec::new();
    for set in sets {
        if set.category() != variant.source_category() {
            return fail(format!(
                "Invalid category for {}: {}",
                variant.title(),
                set.category()
            ));
        }
        match &set.content {
            SetContent::Flashcard(list) => {
                items.extend(list.iter().cloned().map(SessionItem::Flashcard));
            }
            SetContent::Quiz(list) => {
                items.extend(list.iter().cloned().map(SessionItem::Quiz));
            }
            SetContent::Repair(list) => {
                items.extend(list.iter().cloned().map(SessionItem::Repair));
            }
            SetContent::Speak(list) => {
                items.extend(list.iter().cloned().map(SessionItem::Speak));
            }
            SetContent::Phonetic(list) => {
                items.extend(list.iter().cloned().map(SessionItem::Phonetic));
            }
            SetContent::Defense(_) => {
                return fail("Defense configs have no items to drill");
            }
        }
    }
    items.retain(|item| answerable(variant, item));
    Ok(items)
}

fn answerable(variant: Variant, item: &SessionItem) -> bool {
    match (variant, item) {
        (Variant::TypingViEn, SessionItem::Flashcard(item)) => !item.question.trim().is_empty(),
        (Variant::TypingEnVi, SessionItem::Flashcard(item)) => !item.answer.trim().is_empty(),
        (Variant::MissingLetter, SessionItem::Flashcard(item)) => {
            !mask_positions(item.spoken()).is_empty()
        }
        (Variant::Listening, SessionItem::Speak(item))
        | (Variant::Definition, SessionItem::Speak(item)) => !item.options.is_empty(),
        (Variant::Spelling, SessionItem::Speak(item)) => !item.word().trim().is_empty(),
        (Variant::Repair, SessionItem::Repair(item)) => !item.tokens().is_empty(),
        _ => true,
    }
}

/// Fresh per-occurrence state for one entry.
pub fn build_presentation(variant: Variant, item: &SessionItem) -> Presentation {
    match (variant, item) {
        (Variant::Quiz, SessionItem::Quiz(item)) => Presentation::Choice {
            order: shuffled_indices(item.options.len()),
        },
        (Variant::MissingLetter, SessionItem::Flashcard(item)) => Presentation::MaskedWord {
            positions: mask_positions(item.spoken()),
        },
        (Variant::Listening, SessionItem::Speak(item)) => Presentation::Listening {
            order: shuffled_indices(item.options.len()),
            target: pick_index(item.options.len()).unwrap_or(0),
        },
        (Variant::Definition, SessionItem::Speak(item)) => Presentation::Choice {
            order: shuffled_indices(item.options.len()),
        },
        (Variant::Spelling, SessionItem::Speak(_)) => Presentation::Spelling { listens_used: 1 },
        (Variant::Repair, SessionItem::Repair(item)) => Presentation::Repair {
            order: shuffled_indices(item.tokens().len()),
            composed: Vec::new(),
        },
        (Variant::Phonetic, SessionItem::Phonetic(item)) => Presentation::Choice {
            order: shuffled_indices(item.options.len()),
        },
        _ => Presentation::Plain,
    }
}

/// The char positions of `word` hidden in a missing-letter entry:
/// uniformly sampled alphabetic positions, one for short words, two up
/// to seven letters, three beyond.
pub fn mask_positions(word: &str) -> Vec<usize> {
    let alphabetic: Vec<usize> = word
        .chars()
        .enumerate()
        .filter(|(_, c)| c.is_alphabetic())
        .map(|(index, _)| index)
        .collect();
    let count = match alphabetic.len() {
        0 => 0,
        1..=4 => 1,
        5..=7 => 2,
        _ => 3,
    };
    sample_sorted(&alphabetic, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::set_id::SetId;

    fn flashcard_set(pairs: &[(&str, &str)]) -> ContentSet {
        ContentSet {
            id: SetId::new("f1").unwrap(),
            title: "Words".to_string(),
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
    fn test_mask_count_thresholds() {
        assert_eq!(mask_positions("cat").len(), 1);
        assert_eq!(mask_positions("wild").len(), 1);
        assert_eq!(mask_positions("kitchen").len(), 2);
        assert_eq!(mask_positions("beautiful").len(), 3);
        assert_eq!(mask_positions("").len(), 0);
    }

    #[test]
    fn test_mask_positions_skip_non_letters() {
        // "ice cream": the space at index 3 is never masked.
        for _ in 0..50 {
            let positions = mask_positions("ice cream");
            assert_eq!(positions.len(), 3);
            assert!(positions.iter().all(|&i| i != 3));
        }
    }

    #[test]
    fn test_flatten_merges_sets() -> Fallible<()> {
        let sets = [
            flashcard_set(&[("a", "1"), ("b", "2")]),
            flashcard_set(&[("c", "3")]),
        ];
        let items = flatten(Variant::TypingViEn, &sets)?;
        assert_eq!(items.len(), 3);
        Ok(())
    }

    #[test]
    fn test_flatten_rejects_wrong_category() {
        let sets = [flashcard_set(&[("a", "1")])];
        assert!(flatten(Variant::Quiz, &sets).is_err());
    }

    #[test]
    fn test_flatten_skips_unanswerable_items() -> Fallible<()> {
        let sets = [flashcard_set(&[("hello", "xin chào"), ("?!", "huh")])];
        // "?!" has no letters to mask.
        let items = flatten(Variant::MissingLetter, &sets)?;
        assert_eq!(items.len(), 1);
        Ok(())
    }

    #[test]
    fn test_choice_presentation_is_permutation() {
        let item = SessionItem::Quiz(QuizItem {
            text: "Pick".to_string(),
            options: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            correct_answer: "A".to_string(),
            explanation: None,
        });
        match build_presentation(Variant::Quiz, &item) {
            Presentation::Choice { mut order } => {
                order.sort_unstable();
                assert_eq!(order, vec![0, 1, 2]);
            }
            _ => panic!("Expected a choice presentation"),
        }
    }

    #[test]
    fn test_listening_target_in_range() {
        let item = SessionItem::Speak(SpeakItem {
            question: String::new(),
            options: vec!["cat".to_string(), "cut".to_string()],
            correct_answer: None,
            answer: None,
        });
        for _ in 0..20 {
            match build_presentation(Variant::Listening, &item) {
                Presentation::Listening { target, .. } => assert!(target < 2),
                _ => panic!("Expected a listening presentation"),
            }
        }
    }
}
