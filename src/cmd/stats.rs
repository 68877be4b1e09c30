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
use std::fmt::Formatter;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::store::Database;
use crate::types::category::Category;

#[derive(ValueEnum, Clone)]
pub enum StatsFormat {
    /// Plain text output.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

pub fn print_stats(directory: &PathBuf, format: StatsFormat) -> Fallible<()> {
    if !directory.exists() {
        return fail("directory does not exist.");
    }
    let db_path = directory.join("lexdrill.db");
    let db = Database::new(&db_path.display().to_string())?;
    let stats = gather_stats(&db)?;

    match format {
        StatsFormat::Text => {
            for category in &stats.categories {
                println!(
                    "{}: {} sets, {} items",
                    category.category, category.set_count, category.item_count
                );
            }
            println!("total: {} sets, {} items", stats.set_count, stats.item_count);
        }
        StatsFormat::Json => {
            let stats_json = serde_json::to_string_pretty(&stats)?;
            println!("{}", stats_json);
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    set_count: usize,
    item_count: usize,
    categories: Vec<CategoryStats>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryStats {
    category: String,
    set_count: usize,
    item_count: usize,
}

fn gather_stats(db: &Database) -> Fallible<Stats> {
    let sets = db.all_sets()?;
    let mut categories = Vec::new();
    for category in Category::ALL {
        let of_category: Vec<_> = sets
            .iter()
            .filter(|stored| stored.set.category() == category)
            .collect();
        categories.push(CategoryStats {
            category: category.as_str().to_string(),
            set_count: of_category.len(),
            item_count: of_category.iter().map(|stored| stored.set.item_count()).sum(),
        });
    }
    Ok(Stats {
        set_count: sets.len(),
        item_count: sets.iter().map(|stored| stored.set.item_count()).sum(),
        categories,
    })
}
