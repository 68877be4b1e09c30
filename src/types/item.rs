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

use serde::Deserialize;
use serde::Serialize;

/// A word pair. `question` is the English side, `answer` the Vietnamese
/// side (possibly `/`-delimited alternatives), `speak` an optional
/// spoken form.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardItem {
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speak: Option<String>,
}

impl FlashcardItem {
    /// The text spoken aloud and used as the missing-letter target.
    pub fn spoken(&self) -> &str {
        self.speak.as_deref().unwrap_or(&self.question)
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizItem {
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// The scrambled-word source of a repair item: either an explicit word
/// list or a single string to split.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepairSource {
    Words(Vec<String>),
    Text(String),
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairItem {
    pub question: RepairSource,
    pub answer: String,
}

impl RepairItem {
    /// The tokens to present, in authored order. A string source is
    /// split on `/` when it contains one, otherwise on spaces.
    pub fn tokens(&self) -> Vec<String> {
        match &self.question {
            RepairSource::Words(words) => words.clone(),
            RepairSource::Text(text) => {
                if text.contains('/') {
                    text.split('/').map(|w| w.trim().to_string()).collect()
                } else {
                    text.split(' ').map(|w| w.to_string()).collect()
                }
            }
        }
    }
}

/// A listening/definition/spelling item. `question` is the prompt text
/// (absent in listening sets, which only carry `options`),
/// `correct_answer` the canonical word (defaulting to `question`),
/// `answer` an optional definition to reveal.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakItem {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub question: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl SpeakItem {
    pub fn word(&self) -> &str {
        self.correct_answer.as_deref().unwrap_or(&self.question)
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneticOption {
    pub word: String,
    pub ipa: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlight_indexes: Vec<usize>,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneticItem {
    pub instruction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    pub options: Vec<PhoneticOption>,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}
