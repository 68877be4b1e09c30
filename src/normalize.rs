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

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Case-insensitive comparison form: trimmed and lowercased.
pub fn fold(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Vietnamese comparison form: tone and diacritic marks stripped via
/// NFD, `đ` mapped to `d`, then trimmed and lowercased.
pub fn fold_tones(s: &str) -> String {
    let stripped: String = s
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            'đ' => 'd',
            'Đ' => 'D',
            _ => c,
        })
        .collect();
    fold(&stripped)
}

/// Does the candidate match any `/`-delimited alternative of the
/// accepted answer, case-insensitively?
pub fn matches_alternative(accepted: &str, candidate: &str) -> bool {
    let candidate = fold(candidate);
    accepted.split('/').any(|alt| fold(alt) == candidate)
}

/// As [matches_alternative], with tone marks stripped on both sides.
pub fn matches_alternative_tones(accepted: &str, candidate: &str) -> bool {
    let candidate = fold_tones(candidate);
    accepted.split('/').any(|alt| fold_tones(alt) == candidate)
}

/// Join composed tokens into a sentence: single spaces between words,
/// with any whitespace run before `, ! . ? ; :` removed.
pub fn join_sentence(words: &[String]) -> String {
    let joined = words.join(" ");
    let mut out = String::with_capacity(joined.len());
    for c in joined.chars() {
        if matches!(c, ',' | '!' | '.' | '?' | ';' | ':') {
            while out.chars().last().is_some_and(char::is_whitespace) {
                out.pop();
            }
        }
        out.push(c);
    }
    out.trim().to_string()
}
