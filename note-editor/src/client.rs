use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{editor::NoteSink, Error, Result};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActionResult {
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct NotesBody {
    results: Vec<Note>,
}

#[derive(Serialize)]
struct AskBody<'a> {
    questions: &'a [String],
    responses: &'a [String],
}

/// HTTP client for the notes service. Keeps the session cookie between calls.
#[derive(Debug, Clone)]
pub struct NotesClient {
    client: Client,
    base_url: String,
}

impl NotesClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().cookie_store(true).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    #[instrument(skip(self))]
    pub async fn login(&self, email: &str) -> Result<User> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email }))
            .send()
            .await?;

        Ok(success(response).await?.json().await?)
    }

    pub async fn logout(&self) -> Result<()> {
        let response = self.client.post(self.url("/auth/logout")).send().await?;
        success(response).await.map(|_| ())
    }

    pub async fn list_notes(&self) -> Result<Vec<Note>> {
        let response = self.client.get(self.url("/api/notes")).send().await?;
        let body: NotesBody = success(response).await?.json().await?;
        Ok(body.results)
    }

    pub async fn get_note(&self, note_id: Uuid) -> Result<Note> {
        let response = self.client.get(self.url(&format!("/api/notes/{note_id}"))).send().await?;
        Ok(success(response).await?.json().await?)
    }

    /// Creates an empty note with a fresh id and returns the id.
    pub async fn new_note(&self) -> Result<Uuid> {
        let note_id = Uuid::now_v7();
        self.create_note(note_id).await?;
        Ok(note_id)
    }

    #[instrument(skip(self))]
    pub async fn create_note(&self, note_id: Uuid) -> Result<()> {
        let response = self
            .client
            .post(self.url("/api/notes"))
            .json(&json!({ "noteId": note_id }))
            .send()
            .await?;

        action_result(response).await
    }

    #[instrument(skip(self))]
    pub async fn delete_note(&self, note_id: Uuid) -> Result<()> {
        let response = self.client.delete(self.url(&format!("/api/notes/{note_id}"))).send().await?;
        action_result(response).await
    }

    /// Asks about the signed-in user's notes. `questions` ends with the new
    /// question; `responses` holds the answers to the earlier ones.
    #[instrument(skip_all, fields(questions = questions.len()))]
    pub async fn ask(&self, questions: &[String], responses: &[String]) -> Result<String> {
        let response = self
            .client
            .post(self.url("/api/ask"))
            .json(&AskBody { questions, responses })
            .send()
            .await?;

        Ok(success(response).await?.text().await?)
    }
}

#[async_trait]
impl NoteSink for NotesClient {
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn update_note(&self, note_id: Uuid, text: String) -> Result<()> {
        let response = self
            .client
            .patch(self.url(&format!("/api/notes/{note_id}")))
            .json(&json!({ "text": text }))
            .send()
            .await?;

        action_result(response).await
    }
}

async fn success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match response.json::<ErrorBody>().await {
        Ok(ErrorBody { message: Some(message) }) => Err(Error::Action(message)),
        _ => Err(Error::Status(status)),
    }
}

async fn action_result(response: Response) -> Result<()> {
    let status = response.status();
    match response.json::<ActionResult>().await {
        Ok(ActionResult { error_message: None }) if status.is_success() => Ok(()),
        Ok(ActionResult {
            error_message: Some(message),
        }) => {
            debug!(%status, "action failed: {message}");
            Err(Error::Action(message))
        }
        _ => Err(Error::Status(status)),
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    const NOTE_ID: &str = "018f6138-5b4f-722d-97c5-29b927cedbd4";

    fn note_id() -> Uuid {
        NOTE_ID.parse().unwrap()
    }

    async fn signed_in(server: &MockServer) -> NotesClient {
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({ "email": "student@mail.com" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "id=session-1; Path=/; HttpOnly")
                    .set_body_json(json!({ "id": NOTE_ID, "email": "student@mail.com" })),
            )
            .mount(server)
            .await;

        let client = NotesClient::new(server.uri()).unwrap();
        client.login("student@mail.com").await.unwrap();
        client
    }

    #[tokio::test]
    async fn session_cookie_is_sent_with_actions() {
        let server = MockServer::start().await;
        let client = signed_in(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/notes"))
            .and(header("cookie", "id=session-1"))
            .and(body_json(json!({ "noteId": NOTE_ID })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "errorMessage": null })))
            .expect(1)
            .mount(&server)
            .await;

        client.create_note(note_id()).await.unwrap();
    }

    #[tokio::test]
    async fn error_message_becomes_action_error() {
        let server = MockServer::start().await;
        let client = signed_in(&server).await;

        Mock::given(method("DELETE"))
            .and(path(format!("/api/notes/{NOTE_ID}")))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "errorMessage": "Note not found" })))
            .mount(&server)
            .await;

        let result = client.delete_note(note_id()).await;

        assert!(matches!(result, Err(Error::Action(message)) if message == "Note not found"));
    }

    #[tokio::test]
    async fn update_sends_full_text() {
        let server = MockServer::start().await;
        let client = signed_in(&server).await;

        Mock::given(method("PATCH"))
            .and(path(format!("/api/notes/{NOTE_ID}")))
            .and(body_json(json!({ "text": "Heading\n<p>Body</p>" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "errorMessage": null })))
            .expect(1)
            .mount(&server)
            .await;

        client.update_note(note_id(), "Heading\n<p>Body</p>".into()).await.unwrap();
    }

    #[tokio::test]
    async fn ask_returns_html() {
        let server = MockServer::start().await;
        let client = signed_in(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/ask"))
            .and(body_json(json!({ "questions": ["first", "second"], "responses": ["<p>one</p>"] })))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>two</p>"))
            .mount(&server)
            .await;

        let answer = client
            .ask(&["first".into(), "second".into()], &["<p>one</p>".into()])
            .await
            .unwrap();

        assert_eq!(answer, "<p>two</p>");
    }

    #[tokio::test]
    async fn unauthenticated_list_uses_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/notes"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "unauthenticated",
                "message": "You must be logged in to view notes",
                "status": 401
            })))
            .mount(&server)
            .await;

        let client = NotesClient::new(server.uri()).unwrap();

        let result = client.list_notes().await;
        assert!(matches!(result, Err(Error::Action(message)) if message == "You must be logged in to view notes"));
    }
}
