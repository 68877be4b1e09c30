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
use crate::import::parse_file;

/// Validate JSON set files without touching a database.
pub fn check_files(paths: &[PathBuf]) -> Fallible<()> {
    let files = collect_json_files(paths)?;
    if files.is_empty() {
        return fail("No JSON files found.");
    }
    let mut failures = 0;
    for file in &files {
        match parse_file(file) {
            Ok(set) => {
                println!(
                    "ok: {} ({}, {} items)",
                    file.display(),
                    set.category(),
                    set.item_count()
                );
            }
            Err(e) => {
                failures += 1;
                println!("error: {}: {}", file.display(), e.message());
            }
        }
    }
    if failures > 0 {
        return fail(format!("{} file(s) failed the check.", failures));
    }
    Ok(())
}
