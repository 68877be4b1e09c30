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

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::fail;

/// The kind of study material a content set holds.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Flashcard,
    Quiz,
    Repair,
    Speak,
    Phonetic,
    Defense,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Flashcard,
        Category::Quiz,
        Category::Repair,
        Category::Speak,
        Category::Phonetic,
        Category::Defense,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Flashcard => "flashcard",
            Category::Quiz => "quiz",
            Category::Repair => "repair",
            Category::Speak => "speak",
            Category::Phonetic => "phonetic",
            Category::Defense => "defense",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Category::Flashcard => "Flashcards",
            Category::Quiz => "Quizzes",
            Category::Repair => "Sentence Repair",
            Category::Speak => "Listening & Speaking",
            Category::Phonetic => "Phonetics",
            Category::Defense => "Tower Defense",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for Category {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "flashcard" => Ok(Category::Flashcard),
            "quiz" => Ok(Category::Quiz),
            "repair" => Ok(Category::Repair),
            "speak" => Ok(Category::Speak),
            "phonetic" => Ok(Category::Phonetic),
            "defense" => Ok(Category::Defense),
            _ => fail(format!("Invalid category: {}", value)),
        }
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        Category::try_from(string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
