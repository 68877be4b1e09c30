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

mod get;
mod post;
pub mod server;
mod state;
mod template;
mod view;

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use reqwest::StatusCode;
    use tempfile::tempdir;
    use tokio::net::TcpStream;
    use tokio::spawn;
    use tokio::time::sleep;

    use crate::error::Fallible;
    use crate::store::Database;
    use crate::types::content_set::ContentSet;
    use crate::types::content_set::SetContent;
    use crate::types::item::QuizItem;
    use crate::types::set_id::SetId;
    use crate::web::server::start_server;

    fn quiz_set(id: &str) -> ContentSet {
        ContentSet {
            id: SetId::new(id).unwrap(),
            title: format!("Set {}", id),
            description: None,
            subject: None,
            tags: Vec::new(),
            content: SetContent::Quiz(vec![QuizItem {
                text: "Pick A".to_string(),
                options: vec!["A".to_string(), "B".to_string()],
                correct_answer: "A".to_string(),
                explanation: None,
            }]),
        }
    }

    /// Seed a database in a fresh directory, then serve it. Returns the
    /// base URL.
    async fn spawn_server(sets: &[ContentSet]) -> Fallible<String> {
        let directory = tempdir()?.keep();
        {
            let db = Database::new(&directory.join("lexdrill.db").display().to_string())?;
            for set in sets {
                db.save(set)?;
            }
        }
        let port = portpicker::pick_unused_port().unwrap();
        spawn(async move { start_server(directory, port).await });
        let address = format!("0.0.0.0:{port}");
        loop {
            if let Ok(stream) = TcpStream::connect(address.as_str()).await {
                drop(stream);
                break;
            }
            sleep(Duration::from_millis(1)).await;
        }
        Ok(format!("http://{address}"))
    }

    /// Pull the current entry id out of a rendered session page.
    fn extract_entry(html: &str) -> String {
        let marker = "name=\"entry\" value=\"";
        let start = html.find(marker).expect("no entry field") + marker.len();
        let end = html[start..].find('"').unwrap();
        html[start..start + end].to_string()
    }

    #[tokio::test]
    async fn test_start_server_on_non_existent_directory() -> Fallible<()> {
        let directory = PathBuf::from("./derpherp");
        let result = start_server(directory, 8000).await;
        assert!(result.is_err());
        let err = result.err().unwrap();
        assert_eq!(err.to_string(), "error: directory does not exist.");
        Ok(())
    }

    #[tokio::test]
    async fn test_e2e() -> Fallible<()> {
        let base = spawn_server(&[quiz_set("q1")]).await?;

        // Hit the `style.css` endpoint.
        let response = reqwest::get(format!("{base}/style.css")).await?;
        assert!(response.status().is_success());
        assert_eq!(response.headers().get("content-type").unwrap(), "text/css");

        // Hit the `script.js` endpoint.
        let response = reqwest::get(format!("{base}/script.js")).await?;
        assert!(response.status().is_success());
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/javascript"
        );

        // Hit the not found endpoint.
        let response = reqwest::get(format!("{base}/herp-derp")).await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Hit the home page.
        let response = reqwest::get(format!("{base}/")).await?;
        assert!(response.status().is_success());
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/html; charset=utf-8"
        );
        let html = response.text().await?;
        assert!(html.contains("Quizzes"));
        assert!(html.contains("Tower Defense"));

        // Hit the quiz listing.
        let response = reqwest::get(format!("{base}/sets/quiz")).await?;
        assert!(response.status().is_success());
        let html = response.text().await?;
        assert!(html.contains("Set q1"));

        // An unknown category is not found.
        let response = reqwest::get(format!("{base}/sets/nonsense")).await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Hit the set page.
        let response = reqwest::get(format!("{base}/sets/quiz/q1")).await?;
        assert!(response.status().is_success());
        let html = response.text().await?;
        assert!(html.contains("1 questions"));
        assert!(html.contains("Quiz"));

        // Without a session, the session page bounces home.
        let response = reqwest::get(format!("{base}/session")).await?;
        let html = response.text().await?;
        assert!(html.contains("Pick a category"));

        // Start a quiz session.
        let response = reqwest::Client::new()
            .post(format!("{base}/session/start"))
            .form(&[("category", "quiz"), ("id", "q1"), ("variant", "Quiz")])
            .send()
            .await?;
        assert!(response.status().is_success());
        let html = response.text().await?;
        assert!(html.contains("Pick A"));
        let entry = extract_entry(&html);

        // Answer correctly.
        let response = reqwest::Client::new()
            .post(format!("{base}/session/answer"))
            .form(&[("entry", entry.as_str()), ("answer", "A")])
            .send()
            .await?;
        assert!(response.status().is_success());
        let html = response.text().await?;
        assert!(html.contains("Correct!"));

        // Continue past the feedback.
        let response = reqwest::Client::new()
            .post(format!("{base}/session/action"))
            .form(&[("action", "Continue"), ("entry", entry.as_str())])
            .send()
            .await?;
        assert!(response.status().is_success());
        let html = response.text().await?;
        assert!(html.contains("Session Completed"));
        assert!(html.contains("Score: 1 / 1"));

        // Exit back to the home page.
        let response = reqwest::Client::new()
            .post(format!("{base}/session/action"))
            .form(&[("action", "Exit")])
            .send()
            .await?;
        assert!(response.status().is_success());
        let html = response.text().await?;
        assert!(html.contains("Pick a category"));

        Ok(())
    }

    #[tokio::test]
    async fn test_failed_answer_repeats_the_question() -> Fallible<()> {
        let base = spawn_server(&[quiz_set("q1")]).await?;

        let response = reqwest::Client::new()
            .post(format!("{base}/session/start"))
            .form(&[("category", "quiz"), ("id", "q1"), ("variant", "Quiz")])
            .send()
            .await?;
        let html = response.text().await?;
        let entry = extract_entry(&html);

        // Answer wrong: the answer is revealed.
        let response = reqwest::Client::new()
            .post(format!("{base}/session/answer"))
            .form(&[("entry", entry.as_str()), ("answer", "B")])
            .send()
            .await?;
        let html = response.text().await?;
        assert!(html.contains("Incorrect"));
        assert!(html.contains("Answer: A"));

        // Continue: the question comes back as a retry.
        let response = reqwest::Client::new()
            .post(format!("{base}/session/action"))
            .form(&[("action", "Continue"), ("entry", entry.as_str())])
            .send()
            .await?;
        let html = response.text().await?;
        assert!(html.contains("Pick A"));
        let retry = extract_entry(&html);
        assert_ne!(retry, entry);

        // Answer the retry correctly: the session ends with no points.
        let response = reqwest::Client::new()
            .post(format!("{base}/session/answer"))
            .form(&[("entry", retry.as_str()), ("answer", "A")])
            .send()
            .await?;
        let html = response.text().await?;
        assert!(html.contains("Correct!"));
        let response = reqwest::Client::new()
            .post(format!("{base}/session/action"))
            .form(&[("action", "Continue"), ("entry", retry.as_str())])
            .send()
            .await?;
        let html = response.text().await?;
        assert!(html.contains("Session Completed"));
        assert!(html.contains("Score: 0 / 1"));

        Ok(())
    }

    #[tokio::test]
    async fn test_admin_import_and_delete() -> Fallible<()> {
        let base = spawn_server(&[]).await?;

        // The admin page starts empty.
        let response = reqwest::get(format!("{base}/admin")).await?;
        assert!(response.status().is_success());
        let html = response.text().await?;
        assert!(html.contains("No sets imported yet."));

        // Paste a set.
        let document = r#"{
            "category": "quiz",
            "id": "pasted",
            "title": "Pasted",
            "questions": [
                {"text": "Pick A", "options": ["A", "B"], "correctAnswer": "A"}
            ]
        }"#;
        let response = reqwest::Client::new()
            .post(format!("{base}/admin/import"))
            .form(&[("category", "quiz"), ("document", document)])
            .send()
            .await?;
        assert!(response.status().is_success());
        let html = response.text().await?;
        assert!(html.contains("Imported: Pasted"));
        assert!(html.contains("pasted"));

        // Importing the same id again is rejected.
        let response = reqwest::Client::new()
            .post(format!("{base}/admin/import"))
            .form(&[("category", "quiz"), ("document", document)])
            .send()
            .await?;
        let html = response.text().await?;
        assert!(html.contains("ID already exists"));

        // Delete it.
        let response = reqwest::Client::new()
            .post(format!("{base}/admin/delete"))
            .form(&[("category", "quiz"), ("id", "pasted")])
            .send()
            .await?;
        let html = response.text().await?;
        assert!(html.contains("Deleted pasted."));
        assert!(html.contains("No sets imported yet."));

        Ok(())
    }
}
