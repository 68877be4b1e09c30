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

/// The error type: a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    message: String,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "error: {}", self.message)
    }
}

impl std::error::Error for ErrorReport {}

/// The result type used throughout.
pub type Fallible<T> = Result<T, ErrorReport>;

/// Shorthand to construct a failure.
pub fn fail<T>(message: impl Into<String>) -> Fallible<T> {
    Err(ErrorReport::new(message))
}

impl From<std::io::Error> for ErrorReport {
    fn from(err: std::io::Error) -> Self {
        ErrorReport::new(format!("I/O error: {err}"))
    }
}

impl From<rusqlite::Error> for ErrorReport {
    fn from(err: rusqlite::Error) -> Self {
        ErrorReport::new(format!("database error: {err}"))
    }
}

impl From<serde_json::Error> for ErrorReport {
    fn from(err: serde_json::Error) -> Self {
        ErrorReport::new(format!("JSON error: {err}"))
    }
}

impl From<walkdir::Error> for ErrorReport {
    fn from(err: walkdir::Error) -> Self {
        ErrorReport::new(format!("directory walk error: {err}"))
    }
}

#[cfg(test)]
impl From<reqwest::Error> for ErrorReport {
    fn from(err: reqwest::Error) -> Self {
        ErrorReport::new(format!("request error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err: ErrorReport = ErrorReport::new("no questions found.");
        assert_eq!(err.to_string(), "error: no questions found.");
    }

    #[test]
    fn test_fail() {
        let result: Fallible<()> = fail("directory does not exist.");
        assert_eq!(
            result.unwrap_err().to_string(),
            "error: directory does not exist."
        );
    }
}
