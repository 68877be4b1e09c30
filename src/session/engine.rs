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
use crate::session::prepare;
use crate::session::prepare::LISTEN_LIMIT;
use crate::session::prepare::Presentation;
use crate::session::prepare::SessionItem;
use crate::session::variant::Variant;
use crate::session::variant::judge;
use crate::shuffle::shuffled_indices;
use crate::types::content_set::ContentSet;
use crate::types::entry_id::EntryId;

/// One occurrence of an item in the session queue.
#[derive(Clone, Debug)]
pub struct QueueEntry {
    /// Index into the session's item arena.
    pub item: usize,
    /// Per-occurrence identity; a retry copy gets a fresh one.
    pub entry_id: EntryId,
    /// Whether this occurrence is a retry of a failed item.
    pub retry: bool,
    pub presentation: Presentation,
}

/// The revealed outcome of the last submission, shown until the
/// learner (or an auto-advance timer) continues.
#[derive(Clone, Debug)]
pub struct Feedback {
    pub entry: EntryId,
    /// Queue index of the judged entry. On a correct answer the
    /// session has already advanced past it.
    pub entry_index: usize,
    pub correct: bool,
    pub submitted: String,
}

/// A retry-queue drill session.
///
/// The queue starts as a shuffled pass over the arena and grows by at
/// most one retry copy per item: the first failure of an item's
/// original occurrence appends a fresh-presentation copy to the back.
/// Only first-attempt correct answers score. The session is finished
/// when the position has moved past the end of the grown queue.
pub struct Session {
    variant: Variant,
    items: Vec<SessionItem>,
    queue: Vec<QueueEntry>,
    position: usize,
    first_attempt_failed: bool,
    score: usize,
    next_entry_id: u64,
    feedback: Option<Feedback>,
}

impl Session {
    pub fn start(variant: Variant, sets: &[ContentSet]) -> Fallible<Session> {
        let items = prepare::flatten(variant, sets)?;
        if items.is_empty() {
            return fail("No questions found");
        }
        let mut session = Session {
            variant,
            items,
            queue: Vec::new(),
            position: 0,
            first_attempt_failed: false,
            score: 0,
            next_entry_id: 0,
            feedback: None,
        };
        session.build_queue();
        Ok(session)
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// The entry awaiting an answer, with its item. None once finished.
    pub fn current(&self) -> Option<(&QueueEntry, &SessionItem)> {
        let entry = self.queue.get(self.position)?;
        Some((entry, &self.items[entry.item]))
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    /// The entry the pending feedback refers to, with its item.
    pub fn feedback_entry(&self) -> Option<(&QueueEntry, &SessionItem)> {
        let feedback = self.feedback.as_ref()?;
        let entry = self.queue.get(feedback.entry_index)?;
        Some((entry, &self.items[entry.item]))
    }

    pub fn finished(&self) -> bool {
        self.position >= self.queue.len()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    /// The number of distinct items drilled, the score's denominator.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Entries completed and the live queue length, for the progress
    /// bar. The total grows as retries are appended.
    pub fn progress(&self) -> (usize, usize) {
        (self.position, self.queue.len())
    }

    /// Judge a candidate for the current entry.
    ///
    /// A correct answer advances immediately, scoring only if this
    /// occurrence never failed and is not a retry. The first failure
    /// of an original occurrence appends one retry copy; no other
    /// failure grows the queue. A submission for anything but the
    /// current entry is dropped, so a doubled form post cannot judge
    /// the wrong entry.
    pub fn submit_answer(&mut self, entry: EntryId, candidate: &str) -> Fallible<()> {
        if self.finished() {
            return fail("No active question");
        }
        let (entry_id, retry, item) = {
            let current = &self.queue[self.position];
            (current.entry_id, current.retry, current.item)
        };
        if entry_id != entry {
            log::debug!("Ignoring answer for stale entry {}", entry);
            return Ok(());
        }
        let correct = judge(
            self.variant,
            &self.items[item],
            &self.queue[self.position].presentation,
            candidate,
        );
        let entry_index = self.position;
        if correct {
            if !self.first_attempt_failed && !retry {
                self.score += 1;
            }
            self.position += 1;
            self.first_attempt_failed = false;
        } else if !self.first_attempt_failed {
            self.first_attempt_failed = true;
            if !retry {
                let retry_entry = self.fresh_entry(item, true);
                self.queue.push(retry_entry);
            }
        }
        self.feedback = Some(Feedback {
            entry,
            entry_index,
            correct,
            submitted: candidate.to_string(),
        });
        Ok(())
    }

    /// Continue past the revealed feedback. Advances only when a
    /// failure is pending; repeated or stale calls change nothing.
    pub fn acknowledge(&mut self, entry: EntryId) {
        match &self.feedback {
            Some(feedback) if feedback.entry == entry => {
                if !feedback.correct {
                    self.position += 1;
                    self.first_attempt_failed = false;
                }
                self.feedback = None;
            }
            _ => {
                log::debug!("Ignoring stale acknowledge for entry {}", entry);
            }
        }
    }

    /// Append one token to the current repair composition.
    pub fn repair_pick(&mut self, entry: EntryId, index: usize) {
        if self.feedback.is_some() {
            return;
        }
        if let Some(Presentation::Repair { order, composed }) = self.current_presentation(entry) {
            if index < order.len() && !composed.contains(&index) {
                composed.push(index);
            }
        }
    }

    /// Remove the last token of the current repair composition.
    pub fn repair_undo(&mut self, entry: EntryId) {
        if self.feedback.is_some() {
            return;
        }
        if let Some(Presentation::Repair { composed, .. }) = self.current_presentation(entry) {
            composed.pop();
        }
    }

    /// Spend one listen of the current spelling entry's budget.
    pub fn use_listen(&mut self, entry: EntryId) {
        if let Some(Presentation::Spelling { listens_used }) = self.current_presentation(entry) {
            if *listens_used < LISTEN_LIMIT {
                *listens_used += 1;
            }
        }
    }

    /// Start over: a fresh shuffle of the same items, nothing carried
    /// over.
    pub fn restart(&mut self) {
        self.position = 0;
        self.first_attempt_failed = false;
        self.score = 0;
        self.feedback = None;
        self.build_queue();
    }

    fn build_queue(&mut self) {
        let order = shuffled_indices(self.items.len());
        self.queue = Vec::with_capacity(order.len());
        for item in order {
            let entry = self.fresh_entry(item, false);
            self.queue.push(entry);
        }
    }

    fn fresh_entry(&mut self, item: usize, retry: bool) -> QueueEntry {
        let entry_id = EntryId::new(self.next_entry_id);
        self.next_entry_id += 1;
        QueueEntry {
            item,
            entry_id,
            retry,
            presentation: prepare::build_presentation(self.variant, &self.items[item]),
        }
    }

    fn current_presentation(&mut self, entry: EntryId) -> Option<&mut Presentation> {
        let current = self.queue.get_mut(self.position)?;
        if current.entry_id != entry {
            return None;
        }
        Some(&mut current.presentation)
    }
}
