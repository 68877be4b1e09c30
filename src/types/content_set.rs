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
use serde_json::Value;
use serde_json::json;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::category::Category;
use crate::types::item::FlashcardItem;
use crate::types::item::PhoneticItem;
use crate::types::item::QuizItem;
use crate::types::item::RepairItem;
use crate::types::item::SpeakItem;
use crate::types::set_id::SetId;

/// A defense level: a reference to another set's questions plus wave
/// tuning.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefenseConfig {
    #[serde(rename = "type")]
    pub source_type: Category,
    pub source_id: SetId,
    pub enemy_count: u32,
    pub spawn_rate: u32,
}

/// The typed payload of a content set, one variant per category.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SetContent {
    Flashcard(Vec<FlashcardItem>),
    Quiz(Vec<QuizItem>),
    Repair(Vec<RepairItem>),
    Speak(Vec<SpeakItem>),
    Phonetic(Vec<PhoneticItem>),
    Defense(DefenseConfig),
}

impl SetContent {
    pub fn category(&self) -> Category {
        match self {
            SetContent::Flashcard(_) => Category::Flashcard,
            SetContent::Quiz(_) => Category::Quiz,
            SetContent::Repair(_) => Category::Repair,
            SetContent::Speak(_) => Category::Speak,
            SetContent::Phonetic(_) => Category::Phonetic,
            SetContent::Defense(_) => Category::Defense,
        }
    }

    /// The number of items. A defense config has none of its own.
    pub fn item_count(&self) -> usize {
        match self {
            SetContent::Flashcard(items) => items.len(),
            SetContent::Quiz(items) => items.len(),
            SetContent::Repair(items) => items.len(),
            SetContent::Speak(items) => items.len(),
            SetContent::Phonetic(items) => items.len(),
            SetContent::Defense(_) => 0,
        }
    }
}

/// A named bundle of study items belonging to one category.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ContentSet {
    pub id: SetId,
    pub title: String,
    pub description: Option<String>,
    pub subject: Option<String>,
    pub tags: Vec<String>,
    pub content: SetContent,
}

impl ContentSet {
    pub fn category(&self) -> Category {
        self.content.category()
    }

    pub fn item_count(&self) -> usize {
        self.content.item_count()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// The JSON document stored for this set, in the import format.
    pub fn to_document(&self) -> Value {
        let mut doc = json!({
            "id": self.id,
            "category": self.category(),
            "title": self.title,
            "tags": self.tags,
        });
        let obj = doc.as_object_mut().unwrap();
        if let Some(description) = &self.description {
            obj.insert("description".to_string(), json!(description));
        }
        if let Some(subject) = &self.subject {
            obj.insert("subject".to_string(), json!(subject));
        }
        match &self.content {
            SetContent::Flashcard(items) => {
                obj.insert("questions".to_string(), json!(items));
            }
            SetContent::Quiz(items) => {
                obj.insert("questions".to_string(), json!(items));
            }
            SetContent::Repair(items) => {
                obj.insert("questions".to_string(), json!(items));
            }
            SetContent::Speak(items) => {
                obj.insert("questions".to_string(), json!(items));
            }
            SetContent::Phonetic(items) => {
                obj.insert("questions".to_string(), json!(items));
            }
            SetContent::Defense(config) => {
                obj.insert("type".to_string(), json!(config.source_type));
                obj.insert("sourceId".to_string(), json!(config.source_id));
                obj.insert("enemyCount".to_string(), json!(config.enemy_count));
                obj.insert("spawnRate".to_string(), json!(config.spawn_rate));
            }
        }
        doc
    }

    /// Parse and validate an import-format document against a category.
    /// The document's own `category` field, when present, must agree.
    pub fn from_document(category: Category, document: &Value) -> Fallible<ContentSet> {
        let object = match document.as_object() {
            Some(object) => object,
            None => return fail("Invalid document: not a JSON object"),
        };
        if let Some(declared) = object.get("category") {
            let declared: Category = serde_json::from_value(declared.clone())?;
            if declared != category {
                return fail(format!(
                    "Category mismatch: expected {}, found {}",
                    category, declared
                ));
            }
        }
        let id = match object.get("id").and_then(|v| v.as_str()) {
            Some(id) if !id.trim().is_empty() => SetId::new(id)?,
            _ => return fail("Missing ID"),
        };
        let title = match object.get("title").and_then(|v| v.as_str()) {
            Some(title) => title.to_string(),
            None => return fail("Missing title"),
        };
        let description = object
            .get("description")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        let subject = object
            .get("subject")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        let tags = match object.get("tags") {
            Some(tags) => serde_json::from_value(tags.clone())?,
            None => Vec::new(),
        };
        let content = parse_content(category, document)?;
        Ok(ContentSet {
            id,
            title,
            description,
            subject,
            tags,
            content,
        })
    }
}

fn questions_of(document: &Value) -> Fallible<Value> {
    match document.get("questions") {
        Some(questions) => Ok(questions.clone()),
        None => fail("Missing questions"),
    }
}

fn parse_content(category: Category, document: &Value) -> Fallible<SetContent> {
    match category {
        Category::Flashcard => {
            let items: Vec<FlashcardItem> = serde_json::from_value(questions_of(document)?)?;
            Ok(SetContent::Flashcard(items))
        }
        Category::Quiz => {
            let items: Vec<QuizItem> = serde_json::from_value(questions_of(document)?)?;
            for item in &items {
                if !item.options.contains(&item.correct_answer) {
                    return fail(format!("Correct answer not in options: {}", item.text));
                }
            }
            Ok(SetContent::Quiz(items))
        }
        Category::Repair => {
            let items: Vec<RepairItem> = serde_json::from_value(questions_of(document)?)?;
            Ok(SetContent::Repair(items))
        }
        Category::Speak => {
            let items: Vec<SpeakItem> = serde_json::from_value(questions_of(document)?)?;
            for item in &items {
                if let Some(correct) = &item.correct_answer {
                    if !item.options.is_empty() && !item.options.contains(correct) {
                        return fail(format!("Correct answer not in options: {}", correct));
                    }
                }
            }
            Ok(SetContent::Speak(items))
        }
        Category::Phonetic => {
            let items: Vec<PhoneticItem> = serde_json::from_value(questions_of(document)?)?;
            for item in &items {
                if !item.options.iter().any(|o| o.word == item.correct_answer) {
                    return fail(format!(
                        "Correct answer not in options: {}",
                        item.correct_answer
                    ));
                }
            }
            Ok(SetContent::Phonetic(items))
        }
        Category::Defense => {
            let config: DefenseConfig = serde_json::from_value(document.clone())?;
            match config.source_type {
                Category::Flashcard | Category::Quiz | Category::Repair | Category::Speak => {}
                _ => return fail(format!("Invalid source category: {}", config.source_type)),
            }
            if !(5..=100).contains(&config.enemy_count) {
                return fail(format!("Enemy count out of range: {}", config.enemy_count));
            }
            if !(500..=10000).contains(&config.spawn_rate) {
                return fail(format!("Spawn rate out of range: {}", config.spawn_rate));
            }
            Ok(SetContent::Defense(config))
        }
    }
}
