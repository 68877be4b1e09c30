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

use std::path::PathBuf;

use crate::error::Fallible;
use crate::error::fail;
use crate::import::collect_json_files;
use crate::import::import_file;
use crate::store::Database;

/// Import every JSON file under `paths` into the database in
/// `directory`. A bad file never aborts the batch; it is reported and
/// counted.
pub fn import_files(directory: &PathBuf, paths: &[PathBuf]) -> Fallible<()> {
    if !directory.exists() {
        return fail("directory does not exist.");
    }
    let db_path = directory.join("lexdrill.db");
    let db = Database::new(&db_path.display().to_string())?;

    let files = collect_json_files(paths)?;
    if files.is_empty() {
        return fail("No JSON files found.");
    }

    let mut failures = 0;
    for file in &files {
        let outcome = import_file(&db, file);
        if outcome.is_failure() {
            failures += 1;
        }
        println!("{}", outcome.describe(&file.display().to_string()));
    }
    if failures > 0 {
        return fail(format!("{} file(s) could not be imported.", failures));
    }
    Ok(())
}
