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

use std::fmt::Display;

use serde::Deserialize;

use crate::normalize::fold;
use crate::normalize::join_sentence;
use crate::normalize::matches_alternative;
use crate::normalize::matches_alternative_tones;
use crate::session::prepare::Presentation;
use crate::session::prepare::SessionItem;
use crate::types::category::Category;

/// One way of practicing a content set. Every category offers at least
/// one variant; flashcard sets offer several.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
pub enum Variant {
    Flashcards,
    TypingViEn,
    TypingEnVi,
    MissingLetter,
    Matching,
    Quiz,
    Listening,
    Definition,
    Spelling,
    Repair,
    Phonetic,
    Defense,
}

impl Variant {
    pub fn title(&self) -> &'static str {
        match self {
            Variant::Flashcards => "Flashcards",
            Variant::TypingViEn => "Typing VI → EN",
            Variant::TypingEnVi => "Typing EN → VI",
            Variant::MissingLetter => "Missing Letters",
            Variant::Matching => "Matching",
            Variant::Quiz => "Quiz",
            Variant::Listening => "Listening",
            Variant::Definition => "Definitions",
            Variant::Spelling => "Spelling Bee",
            Variant::Repair => "Sentence Repair",
            Variant::Phonetic => "Phonetics",
            Variant::Defense => "Tower Defense",
        }
    }

    /// The form value that starts this variant. Matches the serde
    /// spelling used by the session start form.
    pub fn form_value(&self) -> &'static str {
        match self {
            Variant::Flashcards => "Flashcards",
            Variant::TypingViEn => "TypingViEn",
            Variant::TypingEnVi => "TypingEnVi",
            Variant::MissingLetter => "MissingLetter",
            Variant::Matching => "Matching",
            Variant::Quiz => "Quiz",
            Variant::Listening => "Listening",
            Variant::Definition => "Definition",
            Variant::Spelling => "Spelling",
            Variant::Repair => "Repair",
            Variant::Phonetic => "Phonetic",
            Variant::Defense => "Defense",
        }
    }

    /// The category of the sets this variant drills.
    pub fn source_category(&self) -> Category {
        match self {
            Variant::Flashcards
            | Variant::TypingViEn
            | Variant::TypingEnVi
            | Variant::MissingLetter
            | Variant::Matching => Category::Flashcard,
            Variant::Quiz => Category::Quiz,
            Variant::Listening | Variant::Definition | Variant::Spelling => Category::Speak,
            Variant::Repair => Category::Repair,
            Variant::Phonetic => Category::Phonetic,
            Variant::Defense => Category::Defense,
        }
    }

    /// The variants offered on a set's detail page.
    pub fn for_category(category: Category) -> &'static [Variant] {
        match category {
            Category::Flashcard => &[
                Variant::Flashcards,
                Variant::TypingViEn,
                Variant::TypingEnVi,
                Variant::MissingLetter,
                Variant::Matching,
            ],
            Category::Quiz => &[Variant::Quiz],
            Category::Repair => &[Variant::Repair],
            Category::Speak => &[Variant::Listening, Variant::Definition, Variant::Spelling],
            Category::Phonetic => &[Variant::Phonetic],
            Category::Defense => &[Variant::Defense],
        }
    }

    /// Whether a correct answer advances on a client timer instead of
    /// an explicit button. Failures always advance explicitly.
    pub fn auto_advances_on_correct(&self) -> bool {
        match self {
            Variant::Repair | Variant::Phonetic => false,
            _ => true,
        }
    }
}

impl Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Decide whether a submitted candidate answers the entry. Any
/// candidate the variant does not recognize is simply incorrect.
pub fn judge(
    variant: Variant,
    item: &SessionItem,
    presentation: &Presentation,
    candidate: &str,
) -> bool {
    match (variant, item, presentation) {
        (Variant::Quiz, SessionItem::Quiz(item), _) => candidate == item.correct_answer,
        (Variant::TypingViEn, SessionItem::Flashcard(item), _) => {
            matches_alternative(&item.question, candidate)
        }
        (Variant::TypingEnVi, SessionItem::Flashcard(item), _) => {
            matches_alternative_tones(&item.answer, candidate)
        }
        (
            Variant::MissingLetter,
            SessionItem::Flashcard(item),
            Presentation::MaskedWord { positions },
        ) => {
            let target = item.spoken();
            match reconstruct(target, positions, candidate) {
                Some(reconstructed) => fold(&reconstructed) == fold(target),
                None => false,
            }
        }
        (
            Variant::Listening,
            SessionItem::Speak(item),
            Presentation::Listening { target, .. },
        ) => match item.options.get(*target) {
            Some(option) => candidate.trim() == option.trim(),
            None => false,
        },
        (Variant::Definition, SessionItem::Speak(item), _) => candidate == item.word(),
        (Variant::Spelling, SessionItem::Speak(item), _) => fold(candidate) == fold(item.word()),
        (
            Variant::Repair,
            SessionItem::Repair(item),
            Presentation::Repair { order, composed },
        ) => {
            let tokens = item.tokens();
            let words: Vec<String> = composed
                .iter()
                .filter_map(|&i| order.get(i).and_then(|&j| tokens.get(j)).cloned())
                .collect();
            join_sentence(&words) == item.answer.trim()
        }
        (Variant::Phonetic, SessionItem::Phonetic(item), _) => candidate == item.correct_answer,
        _ => false,
    }
}

/// The answer text revealed after a failure (or, for manual variants,
/// after any submission).
pub fn revealed_answer(variant: Variant, item: &SessionItem, presentation: &Presentation) -> String {
    match (variant, item, presentation) {
        (Variant::Quiz, SessionItem::Quiz(item), _) => item.correct_answer.clone(),
        (Variant::TypingViEn, SessionItem::Flashcard(item), _) => item.question.clone(),
        (Variant::TypingEnVi, SessionItem::Flashcard(item), _) => item.answer.clone(),
        (Variant::MissingLetter, SessionItem::Flashcard(item), _) => item.spoken().to_string(),
        (
            Variant::Listening,
            SessionItem::Speak(item),
            Presentation::Listening { target, .. },
        ) => item.options.get(*target).cloned().unwrap_or_default(),
        (Variant::Definition, SessionItem::Speak(item), _)
        | (Variant::Spelling, SessionItem::Speak(item), _) => item.word().to_string(),
        (Variant::Repair, SessionItem::Repair(item), _) => item.answer.trim().to_string(),
        (Variant::Phonetic, SessionItem::Phonetic(item), _) => item.correct_answer.clone(),
        _ => String::new(),
    }
}

/// The text a variant speaks aloud when an entry arrives, if any.
pub fn autoplay_text(variant: Variant, item: &SessionItem, presentation: &Presentation) -> Option<String> {
    match (variant, item, presentation) {
        (
            Variant::Listening,
            SessionItem::Speak(item),
            Presentation::Listening { target, .. },
        ) => item.options.get(*target).cloned(),
        (Variant::Spelling, SessionItem::Speak(item), _) => Some(item.word().to_string()),
        _ => None,
    }
}

/// Fill the masked positions of `target` with the typed letters, in
/// order. None when the letter count does not match.
fn reconstruct(target: &str, positions: &[usize], candidate: &str) -> Option<String> {
    let mut typed = candidate.trim().chars();
    let mut reconstructed = String::new();
    for (index, c) in target.chars().enumerate() {
        if positions.contains(&index) {
            reconstructed.push(typed.next()?);
        } else {
            reconstructed.push(c);
        }
    }
    if typed.next().is_some() {
        return None;
    }
    Some(reconstructed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::item::FlashcardItem;
    use crate::types::item::QuizItem;
    use crate::types::item::RepairItem;
    use crate::types::item::RepairSource;
    use crate::types::item::SpeakItem;

    fn flashcard(question: &str, answer: &str) -> SessionItem {
        SessionItem::Flashcard(FlashcardItem {
            question: question.to_string(),
            answer: answer.to_string(),
            speak: None,
        })
    }

    #[test]
    fn test_quiz_judge_exact() {
        let item = SessionItem::Quiz(QuizItem {
            text: "Pick A".to_string(),
            options: vec!["A".to_string(), "B".to_string()],
            correct_answer: "A".to_string(),
            explanation: None,
        });
        assert!(judge(Variant::Quiz, &item, &Presentation::Plain, "A"));
        assert!(!judge(Variant::Quiz, &item, &Presentation::Plain, "B"));
        assert!(!judge(Variant::Quiz, &item, &Presentation::Plain, "bogus"));
    }

    #[test]
    fn test_typing_vi_en_case_insensitive() {
        let item = flashcard("Hello", "Xin chào");
        assert!(judge(Variant::TypingViEn, &item, &Presentation::Plain, "  hello "));
        assert!(!judge(Variant::TypingViEn, &item, &Presentation::Plain, "hullo"));
    }

    #[test]
    fn test_typing_en_vi_tone_stripped() {
        let item = flashcard("Hello", "Xin chào/Chào");
        assert!(judge(Variant::TypingEnVi, &item, &Presentation::Plain, "chao"));
        assert!(judge(Variant::TypingEnVi, &item, &Presentation::Plain, "xin chao"));
        assert!(!judge(Variant::TypingEnVi, &item, &Presentation::Plain, "hello"));
    }

    #[test]
    fn test_missing_letter_reconstruction() {
        let item = flashcard("cat", "mèo");
        let presentation = Presentation::MaskedWord { positions: vec![1] };
        assert!(judge(Variant::MissingLetter, &item, &presentation, "a"));
        assert!(judge(Variant::MissingLetter, &item, &presentation, "A"));
        assert!(!judge(Variant::MissingLetter, &item, &presentation, "o"));
        // Letter count must match the mask.
        assert!(!judge(Variant::MissingLetter, &item, &presentation, "at"));
        assert!(!judge(Variant::MissingLetter, &item, &presentation, ""));
    }

    #[test]
    fn test_listening_judges_against_target() {
        let item = SessionItem::Speak(SpeakItem {
            question: String::new(),
            options: vec!["cat".to_string(), "cut".to_string()],
            correct_answer: None,
            answer: None,
        });
        let presentation = Presentation::Listening {
            order: vec![0, 1],
            target: 1,
        };
        assert!(judge(Variant::Listening, &item, &presentation, "cut"));
        assert!(!judge(Variant::Listening, &item, &presentation, "cat"));
    }

    #[test]
    fn test_spelling_folds() {
        let item = SessionItem::Speak(SpeakItem {
            question: "Apple".to_string(),
            options: Vec::new(),
            correct_answer: None,
            answer: Some("A fruit.".to_string()),
        });
        let presentation = Presentation::Spelling { listens_used: 1 };
        assert!(judge(Variant::Spelling, &item, &presentation, " apple "));
        assert!(!judge(Variant::Spelling, &item, &presentation, "appel"));
    }

    #[test]
    fn test_repair_composed_sentence() {
        let item = SessionItem::Repair(RepairItem {
            question: RepairSource::Text("world / ! / Hello / ,".to_string()),
            answer: "Hello, world!".to_string(),
        });
        // Tokens presented in authored order: world, !, Hello, ","
        let presentation = Presentation::Repair {
            order: vec![0, 1, 2, 3],
            composed: vec![2, 3, 0, 1],
        };
        assert!(judge(Variant::Repair, &item, &presentation, ""));
        let partial = Presentation::Repair {
            order: vec![0, 1, 2, 3],
            composed: vec![2, 3],
        };
        assert!(!judge(Variant::Repair, &item, &partial, ""));
    }

    #[test]
    fn test_revealed_answer() {
        let item = flashcard("Hello", "Xin chào");
        assert_eq!(
            revealed_answer(Variant::TypingEnVi, &item, &Presentation::Plain),
            "Xin chào"
        );
        assert_eq!(
            revealed_answer(Variant::TypingViEn, &item, &Presentation::Plain),
            "Hello"
        );
    }

    #[test]
    fn test_for_category_round_trip() {
        for category in Category::ALL {
            for variant in Variant::for_category(category) {
                assert_eq!(variant.source_category(), category);
            }
        }
    }
}
