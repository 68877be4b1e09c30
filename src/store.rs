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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::Transaction;
use serde_json::Value;

use crate::error::Fallible;
use crate::types::category::Category;
use crate::types::content_set::ContentSet;
use crate::types::set_id::SetId;
use crate::types::timestamp::Timestamp;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

/// The result of trying to save a set. Saving an id that already
/// exists is an outcome, not an error: the stored row is untouched.
pub struct SaveOutcome {
    pub success: bool,
    pub message: String,
}

/// A stored set plus the metadata the store records about it.
pub struct StoredSet {
    pub set: ContentSet,
    pub imported_at: Timestamp,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    /// All sets in a category, ordered by title.
    pub fn get_all(&self, category: Category) -> Fallible<Vec<ContentSet>> {
        let mut sets = Vec::new();
        let conn = self.acquire();
        let mut stmt =
            conn.prepare("select document from content_sets where category = ? order by title;")?;
        let mut rows = stmt.query([category])?;
        while let Some(row) = rows.next()? {
            let document: String = row.get(0)?;
            sets.push(load_document(category, &document)?);
        }
        Ok(sets)
    }

    /// The sets in a category carrying a given tag.
    pub fn get_by_tag(&self, category: Category, tag: &str) -> Fallible<Vec<ContentSet>> {
        let mut sets = self.get_all(category)?;
        sets.retain(|set| set.has_tag(tag));
        Ok(sets)
    }

    pub fn get_by_id(&self, category: Category, id: &SetId) -> Fallible<Option<ContentSet>> {
        let conn = self.acquire();
        let mut stmt =
            conn.prepare("select document from content_sets where category = ? and id = ?;")?;
        let mut rows = stmt.query((category, id))?;
        if let Some(row) = rows.next()? {
            let document: String = row.get(0)?;
            Ok(Some(load_document(category, &document)?))
        } else {
            Ok(None)
        }
    }

    /// Every stored set across all categories, with import metadata,
    /// ordered by category then title.
    pub fn all_sets(&self) -> Fallible<Vec<StoredSet>> {
        let mut sets = Vec::new();
        let conn = self.acquire();
        let sql = "select category, document, imported_at from content_sets order by category, title;";
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let category: Category = row.get(0)?;
            let document: String = row.get(1)?;
            let imported_at: Timestamp = row.get(2)?;
            sets.push(StoredSet {
                set: load_document(category, &document)?,
                imported_at,
            });
        }
        Ok(sets)
    }

    /// The number of sets in a category.
    pub fn count(&self, category: Category) -> Fallible<usize> {
        let conn = self.acquire();
        let sql = "select count(*) from content_sets where category = ?;";
        let count: i64 = conn.query_row(sql, [category], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Insert a whole set. An existing (category, id) row is never
    /// overwritten: the save is rejected with an outcome message.
    pub fn save(&self, set: &ContentSet) -> Fallible<SaveOutcome> {
        log::debug!("Saving set: {}/{}", set.category(), set.id);
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        if probe_set_exists(&tx, set.category(), &set.id)? {
            return Ok(SaveOutcome {
                success: false,
                message: "ID already exists".to_string(),
            });
        }
        insert_set(&tx, set, Timestamp::now())?;
        tx.commit()?;
        Ok(SaveOutcome {
            success: true,
            message: "Saved successfully".to_string(),
        })
    }

    /// Delete a set by id. Returns whether a row was removed.
    pub fn delete(&self, category: Category, id: &SetId) -> Fallible<bool> {
        log::debug!("Deleting set: {}/{}", category, id);
        let conn = self.acquire();
        let sql = "delete from content_sets where category = ? and id = ?;";
        let deleted = conn.execute(sql, (category, id))?;
        Ok(deleted > 0)
    }

    fn acquire(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

fn load_document(category: Category, document: &str) -> Fallible<ContentSet> {
    let value: Value = serde_json::from_str(document)?;
    ContentSet::from_document(category, &value)
}

fn insert_set(tx: &Transaction, set: &ContentSet, imported_at: Timestamp) -> Fallible<()> {
    let sql = "insert into content_sets (category, id, title, description, subject, tags, document, imported_at) values (?, ?, ?, ?, ?, ?, ?, ?);";
    tx.execute(
        sql,
        (
            set.category(),
            &set.id,
            &set.title,
            &set.description,
            &set.subject,
            serde_json::to_string(&set.tags)?,
            serde_json::to_string(&set.to_document())?,
            imported_at,
        ),
    )?;
    Ok(())
}

fn probe_set_exists(tx: &Transaction, category: Category, id: &SetId) -> Fallible<bool> {
    let sql = "select count(*) from content_sets where category = ? and id = ?;";
    let count: i64 = tx.query_row(sql, (category, id), |row| row.get(0))?;
    Ok(count > 0)
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["content_sets"], |row| row.get(0))?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::types::content_set::SetContent;
    use crate::types::item::QuizItem;

    fn test_database() -> Fallible<Database> {
        let directory = tempdir()?;
        let path = directory.keep().join("lexdrill.db");
        Database::new(&path.display().to_string())
    }

    fn quiz_set(id: &str, tags: &[&str]) -> ContentSet {
        ContentSet {
            id: SetId::new(id).unwrap(),
            title: format!("Set {}", id),
            description: None,
            subject: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            content: SetContent::Quiz(vec![QuizItem {
                text: "Pick A".to_string(),
                options: vec!["A".to_string(), "B".to_string()],
                correct_answer: "A".to_string(),
                explanation: None,
            }]),
        }
    }

    #[test]
    fn test_save_and_get() -> Fallible<()> {
        let db = test_database()?;
        let outcome = db.save(&quiz_set("q1", &[]))?;
        assert!(outcome.success);
        let found = db.get_by_id(Category::Quiz, &SetId::new("q1")?)?;
        assert_eq!(found.map(|s| s.title), Some("Set q1".to_string()));
        let missing = db.get_by_id(Category::Quiz, &SetId::new("nope")?)?;
        assert!(missing.is_none());
        Ok(())
    }

    #[test]
    fn test_save_rejects_duplicate_id() -> Fallible<()> {
        let db = test_database()?;
        let mut set = quiz_set("q1", &[]);
        assert!(db.save(&set)?.success);
        set.title = "Replacement".to_string();
        let outcome = db.save(&set)?;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "ID already exists");
        // The original row is intact.
        let found = db.get_by_id(Category::Quiz, &set.id)?.unwrap();
        assert_eq!(found.title, "Set q1");
        Ok(())
    }

    #[test]
    fn test_get_all_ordered_by_title() -> Fallible<()> {
        let db = test_database()?;
        db.save(&quiz_set("b", &[]))?;
        db.save(&quiz_set("a", &[]))?;
        let titles: Vec<String> = db
            .get_all(Category::Quiz)?
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["Set a", "Set b"]);
        assert!(db.get_all(Category::Flashcard)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_get_by_tag() -> Fallible<()> {
        let db = test_database()?;
        db.save(&quiz_set("q1", &["unit-1"]))?;
        db.save(&quiz_set("q2", &["unit-2"]))?;
        let sets = db.get_by_tag(Category::Quiz, "unit-1")?;
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].id.as_str(), "q1");
        Ok(())
    }

    #[test]
    fn test_delete() -> Fallible<()> {
        let db = test_database()?;
        db.save(&quiz_set("q1", &[]))?;
        assert!(db.delete(Category::Quiz, &SetId::new("q1")?)?);
        assert!(!db.delete(Category::Quiz, &SetId::new("q1")?)?);
        assert!(db.get_by_id(Category::Quiz, &SetId::new("q1")?)?.is_none());
        Ok(())
    }

    #[test]
    fn test_count() -> Fallible<()> {
        let db = test_database()?;
        assert_eq!(db.count(Category::Quiz)?, 0);
        db.save(&quiz_set("q1", &[]))?;
        db.save(&quiz_set("q2", &[]))?;
        assert_eq!(db.count(Category::Quiz)?, 2);
        assert_eq!(db.count(Category::Flashcard)?, 0);
        Ok(())
    }

    #[test]
    fn test_all_sets() -> Fallible<()> {
        let db = test_database()?;
        db.save(&quiz_set("q1", &[]))?;
        let all = db.all_sets()?;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].set.category(), Category::Quiz);
        Ok(())
    }

    #[test]
    fn test_schema_survives_reopen() -> Fallible<()> {
        let directory = tempdir()?;
        let path = directory.keep().join("lexdrill.db");
        let path = path.display().to_string();
        {
            let db = Database::new(&path)?;
            db.save(&quiz_set("q1", &[]))?;
        }
        let db = Database::new(&path)?;
        assert_eq!(db.count(Category::Quiz)?, 1);
        Ok(())
    }
}
