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

use serde::Deserialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::shuffle::roll;
use crate::shuffle::shuffle;
use crate::types::content_set::ContentSet;
use crate::types::content_set::DefenseConfig;
use crate::types::content_set::SetContent;

/// Hits the tower can take before the battle is lost.
pub const TOWER_HP_MAX: u32 = 5;

/// Enemy toughness mix. Form values are the variant names.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
pub enum Difficulty {
    Noob,
    Beginner,
    Master,
    Hell,
    Legend,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Noob,
        Difficulty::Beginner,
        Difficulty::Master,
        Difficulty::Hell,
        Difficulty::Legend,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Difficulty::Noob => "Noob",
            Difficulty::Beginner => "Beginner",
            Difficulty::Master => "Master",
            Difficulty::Hell => "Hell",
            Difficulty::Legend => "Legend",
        }
    }

    /// Spawn probabilities for weak, normal, and strong enemies.
    fn weights(&self) -> (f64, f64, f64) {
        match self {
            Difficulty::Noob => (0.8, 0.2, 0.0),
            Difficulty::Beginner => (0.6, 0.4, 0.0),
            Difficulty::Master => (0.5, 0.4, 0.1),
            Difficulty::Hell => (0.2, 0.6, 0.2),
            Difficulty::Legend => (0.0, 0.5, 0.5),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Skin {
    Weak,
    Normal,
    Strong,
}

impl Skin {
    pub fn hp(&self) -> u32 {
        match self {
            Skin::Weak => 1,
            Skin::Normal => 2,
            Skin::Strong => 3,
        }
    }

    /// The style class the battlefield view renders the enemy with.
    pub fn label(&self) -> &'static str {
        match self {
            Skin::Weak => "weak",
            Skin::Normal => "normal",
            Skin::Strong => "strong",
        }
    }
}

/// Map a uniform roll in [0, 1) to a skin by the difficulty's
/// cumulative weights.
pub fn skin_for_roll(difficulty: Difficulty, roll: f64) -> Skin {
    let (weak, normal, _) = difficulty.weights();
    if roll < weak {
        Skin::Weak
    } else if roll < weak + normal {
        Skin::Normal
    } else {
        Skin::Strong
    }
}

/// A multiple-choice question resolved from the source set.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DefenseQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct: String,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Enemy {
    pub skin: Skin,
    pub hp: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Victory,
    Defeat,
}

/// What the last turn did, for the battlefield view.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TurnOutcome {
    Hit,
    Kill,
    TowerHit,
}

/// A turn-based tower defense battle.
///
/// The source set is resolved into multiple-choice questions up
/// front, and a roster of enemies is rolled from the difficulty's
/// skin weights. One enemy is on the field at the start; each turn
/// judges one answer, a correct answer damages the oldest enemy and a
/// wrong one damages the tower, and then the next roster enemy
/// arrives. The battle is won when every roster enemy is dead and
/// lost when the tower's hit points run out.
pub struct DefenseSession {
    difficulty: Difficulty,
    questions: Vec<DefenseQuestion>,
    q_index: usize,
    roster_size: usize,
    roster: Vec<Skin>,
    spawned: usize,
    enemies: Vec<Enemy>,
    kills: usize,
    tower_hp: u32,
    last_turn: Option<TurnOutcome>,
}

impl DefenseSession {
    pub fn start(
        config: &DefenseConfig,
        source: &ContentSet,
        difficulty: Difficulty,
    ) -> Fallible<DefenseSession> {
        let questions = resolve_questions(source)?;
        if questions.is_empty() {
            return fail("No questions found");
        }
        let mut session = DefenseSession {
            difficulty,
            questions,
            q_index: 0,
            roster_size: config.enemy_count as usize,
            roster: Vec::new(),
            spawned: 0,
            enemies: Vec::new(),
            kills: 0,
            tower_hp: TOWER_HP_MAX,
            last_turn: None,
        };
        session.deploy();
        Ok(session)
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn current_question(&self) -> &DefenseQuestion {
        &self.questions[self.q_index]
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn tower_hp(&self) -> u32 {
        self.tower_hp
    }

    pub fn kills(&self) -> usize {
        self.kills
    }

    pub fn enemy_count(&self) -> usize {
        self.roster_size
    }

    pub fn last_turn(&self) -> Option<TurnOutcome> {
        self.last_turn
    }

    pub fn outcome(&self) -> Option<Outcome> {
        if self.tower_hp == 0 {
            Some(Outcome::Defeat)
        } else if self.kills == self.roster_size {
            Some(Outcome::Victory)
        } else {
            None
        }
    }

    /// Judge one answer against the current question. A correct
    /// answer strikes the oldest enemy on the field, a wrong one
    /// costs the tower a hit point, and the next roster enemy arrives
    /// afterwards. Turns after the battle has ended are dropped.
    pub fn turn(&mut self, candidate: &str) {
        if self.outcome().is_some() {
            log::debug!("Ignoring turn after the battle ended");
            return;
        }
        if candidate == self.current_question().correct {
            if let Some(front) = self.enemies.first_mut() {
                front.hp -= 1;
                if front.hp == 0 {
                    self.enemies.remove(0);
                    self.kills += 1;
                    self.last_turn = Some(TurnOutcome::Kill);
                } else {
                    self.last_turn = Some(TurnOutcome::Hit);
                }
            }
        } else {
            self.tower_hp -= 1;
            self.last_turn = Some(TurnOutcome::TowerHit);
        }
        self.q_index = (self.q_index + 1) % self.questions.len();
        if self.outcome().is_none() && self.spawned < self.roster.len() {
            let skin = self.roster[self.spawned];
            self.spawned += 1;
            self.enemies.push(Enemy { skin, hp: skin.hp() });
        }
    }

    /// Fight the same battle again with a freshly rolled roster.
    pub fn restart(&mut self) {
        self.q_index = 0;
        self.kills = 0;
        self.tower_hp = TOWER_HP_MAX;
        self.last_turn = None;
        self.deploy();
    }

    fn deploy(&mut self) {
        self.roster = (0..self.roster_size)
            .map(|_| skin_for_roll(self.difficulty, roll()))
            .collect();
        self.enemies.clear();
        self.spawned = 0;
        if let Some(&skin) = self.roster.first() {
            self.spawned = 1;
            self.enemies.push(Enemy { skin, hp: skin.hp() });
        }
    }
}

/// Turn the source set's items into multiple-choice questions. Wrong
/// options for flashcard, speak, and repair sources are distinct
/// answers sampled from the rest of the set.
fn resolve_questions(source: &ContentSet) -> Fallible<Vec<DefenseQuestion>> {
    let mut questions = Vec::new();
    match &source.content {
        SetContent::Quiz(items) => {
            for item in items {
                questions.push(DefenseQuestion {
                    prompt: item.text.clone(),
                    options: shuffle(item.options.clone()),
                    correct: item.correct_answer.clone(),
                });
            }
        }
        SetContent::Flashcard(items) => {
            let pool: Vec<String> = items.iter().map(|item| item.answer.clone()).collect();
            for item in items {
                if item.question.trim().is_empty() || item.answer.trim().is_empty() {
                    continue;
                }
                questions.push(choice_question(&item.question, &item.answer, &pool));
            }
        }
        SetContent::Speak(items) => {
            let pool: Vec<String> = items.iter().map(|item| item.word().to_string()).collect();
            for item in items {
                if item.question.trim().is_empty() || item.word().trim().is_empty() {
                    continue;
                }
                questions.push(choice_question(&item.question, item.word(), &pool));
            }
        }
        SetContent::Repair(items) => {
            let pool: Vec<String> = items.iter().map(|item| item.answer.trim().to_string()).collect();
            for item in items {
                let tokens = item.tokens();
                if tokens.is_empty() || item.answer.trim().is_empty() {
                    continue;
                }
                questions.push(choice_question(
                    &tokens.join(" / "),
                    item.answer.trim(),
                    &pool,
                ));
            }
        }
        other => {
            return fail(format!("Invalid source category: {}", other.category()));
        }
    }
    Ok(questions)
}

fn choice_question(prompt: &str, correct: &str, pool: &[String]) -> DefenseQuestion {
    let mut seen = HashSet::new();
    let mut distractors: Vec<String> = Vec::new();
    for answer in pool {
        if answer != correct && !answer.trim().is_empty() && seen.insert(answer.clone()) {
            distractors.push(answer.clone());
        }
    }
    let mut options: Vec<String> = shuffle(distractors).into_iter().take(3).collect();
    options.push(correct.to_string());
    DefenseQuestion {
        prompt: prompt.to_string(),
        options: shuffle(options),
        correct: correct.to_string(),
    }
}
