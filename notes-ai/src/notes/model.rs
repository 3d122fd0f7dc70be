use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::UserId;

pub type NoteId = Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub author_id: UserId,
    /// Heading and body joined by a newline.
    pub text: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNote {
    pub note_id: NoteId,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNote {
    pub text: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct AskQuestions {
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub responses: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FindNotesResponse {
    pub results: Vec<Note>,
}

/// Uniform outcome of a note action: `{"errorMessage": null}` on success.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub error_message: Option<String>,
    #[serde(skip, default = "ok_status")]
    pub status: StatusCode,
}

fn ok_status() -> StatusCode {
    StatusCode::OK
}

impl ActionResult {
    pub fn ok() -> Self {
        Self {
            error_message: None,
            status: StatusCode::OK,
        }
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            status,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error_message.is_none()
    }
}

impl IntoResponse for ActionResult {
    fn into_response(self) -> Response {
        (self.status, axum::Json(&self)).into_response()
    }
}
