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

use std::path::Path;
use std::path::PathBuf;

use serde_json::Value;
use walkdir::WalkDir;

use crate::error::Fallible;
use crate::error::fail;
use crate::store::Database;
use crate::types::category::Category;
use crate::types::content_set::ContentSet;

/// What happened to one imported document.
pub enum ImportOutcome {
    Imported { title: String },
    Skipped { message: String },
    Failed { message: String },
}

impl ImportOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ImportOutcome::Failed { .. })
    }

    /// One report line. `name` identifies the source: a file path, or
    /// "document" for pasted input.
    pub fn describe(&self, name: &str) -> String {
        match self {
            ImportOutcome::Imported { title } => format!("Imported: {}", title),
            ImportOutcome::Skipped { message } => format!("Skipped {}: {}", name, message),
            ImportOutcome::Failed { message } => {
                format!("Error processing {}: {}", name, message)
            }
        }
    }
}

/// Read and validate a single JSON content file. The file must carry a
/// `category` field naming its category.
pub fn parse_file(path: &Path) -> Fallible<ContentSet> {
    let contents = std::fs::read_to_string(path)?;
    let document: Value = serde_json::from_str(&contents)?;
    let category = declared_category(&document)?;
    ContentSet::from_document(category, &document)
}

fn declared_category(document: &Value) -> Fallible<Category> {
    match document.get("category").and_then(|v| v.as_str()) {
        Some(name) => Category::try_from(name.to_string()),
        None => fail("Missing category"),
    }
}

/// Expand paths into the JSON files they denote. Directories are
/// scanned recursively for `*.json`.
pub fn collect_json_files(paths: &[PathBuf]) -> Fallible<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        for entry in WalkDir::new(path) {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                files.push(path.to_path_buf());
            }
        }
    }
    Ok(files)
}

/// Validate and save one document. Duplicate ids are skipped, not
/// overwritten; a bad document never aborts the caller's batch.
pub fn import_document(db: &Database, category: Category, document: &Value) -> ImportOutcome {
    match ContentSet::from_document(category, document) {
        Ok(set) => save_set(db, &set),
        Err(e) => ImportOutcome::Failed {
            message: e.message().to_string(),
        },
    }
}

pub fn import_file(db: &Database, path: &Path) -> ImportOutcome {
    match parse_file(path) {
        Ok(set) => save_set(db, &set),
        Err(e) => ImportOutcome::Failed {
            message: e.message().to_string(),
        },
    }
}

fn save_set(db: &Database, set: &ContentSet) -> ImportOutcome {
    match db.save(set) {
        Ok(outcome) => {
            if outcome.success {
                ImportOutcome::Imported {
                    title: set.title.clone(),
                }
            } else {
                ImportOutcome::Skipped {
                    message: outcome.message,
                }
            }
        }
        Err(e) => ImportOutcome::Failed {
            message: e.message().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::fs::create_dir_all;

    use serde_json::json;
    use tempfile::tempdir;

    use super::*;

    fn write_json(directory: &Path, name: &str, value: &Value) -> Fallible<PathBuf> {
        let path = directory.join(name);
        std::fs::write(&path, serde_json::to_string_pretty(value)?)?;
        Ok(path)
    }

    fn quiz_document(id: &str) -> Value {
        json!({
            "id": id,
            "category": "quiz",
            "title": "Basics",
            "questions": [
                {"text": "Pick A", "options": ["A", "B"], "correctAnswer": "A"}
            ]
        })
    }

    #[test]
    fn test_parse_file() -> Fallible<()> {
        let directory = tempdir()?;
        let path = write_json(directory.path(), "quiz.json", &quiz_document("q1"))?;
        let set = parse_file(&path)?;
        assert_eq!(set.id.as_str(), "q1");
        assert_eq!(set.category(), Category::Quiz);
        Ok(())
    }

    #[test]
    fn test_parse_file_without_category() -> Fallible<()> {
        let directory = tempdir()?;
        let document = json!({"id": "q1", "title": "Basics", "questions": []});
        let path = write_json(directory.path(), "quiz.json", &document)?;
        let result = parse_file(&path);
        assert_eq!(result.unwrap_err().message(), "Missing category");
        Ok(())
    }

    #[test]
    fn test_collect_json_files_recurses() -> Fallible<()> {
        let directory = tempdir()?;
        write_json(directory.path(), "a.json", &quiz_document("a"))?;
        let nested = directory.path().join("nested");
        create_dir_all(&nested)?;
        write_json(&nested, "b.json", &quiz_document("b"))?;
        std::fs::write(directory.path().join("notes.txt"), "skip me")?;
        let files = collect_json_files(&[directory.path().to_path_buf()])?;
        assert_eq!(files.len(), 2);
        Ok(())
    }

    #[test]
    fn test_collect_json_files_missing_path() {
        let result = collect_json_files(&[PathBuf::from("./derpherp")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_import_file_outcomes() -> Fallible<()> {
        let directory = tempdir()?;
        let db_path = directory.path().join("lexdrill.db");
        let db = Database::new(&db_path.display().to_string())?;
        let good = write_json(directory.path(), "good.json", &quiz_document("q1"))?;
        let bad = write_json(
            directory.path(),
            "bad.json",
            &json!({"category": "quiz", "title": "No id"}),
        )?;
        assert!(matches!(
            import_file(&db, &good),
            ImportOutcome::Imported { .. }
        ));
        assert!(matches!(
            import_file(&db, &good),
            ImportOutcome::Skipped { .. }
        ));
        assert!(import_file(&db, &bad).is_failure());
        Ok(())
    }

    #[test]
    fn test_describe() {
        let outcome = ImportOutcome::Skipped {
            message: "ID already exists".to_string(),
        };
        assert_eq!(outcome.describe("a.json"), "Skipped a.json: ID already exists");
    }
}
