//! Action boundary: every note action returns a plain value instead of an
//! error, so callers never branch on failure kinds.

use minijinja::HtmlEscape;

use crate::{
    ai::{
        self,
        prompt::{build_prompt, format_history, format_notes, sanitize_response},
        GenerationBackend,
    },
    ctx::BaseParams,
    Error,
};

use super::{handlers, ActionResult, AskQuestions, CreateNote, NoteId, UpdateNote};

pub const NO_NOTES_MESSAGE: &str = "<p>You don't have any notes yet.</p>";
pub const MISSING_API_KEY_MESSAGE: &str = "<p>Configuration error: API key not set. Please contact support.</p>";
pub const EMPTY_RESPONSE_MESSAGE: &str = "<p>The AI couldn't generate a response. Please try again.</p>";

/// Normalizes any error into the uniform action result.
pub fn handle_error(error: Error) -> ActionResult {
    let status = error.status();
    if status.is_server_error() {
        tracing::error!("{error:?}");
    }

    let message = match error {
        Error::DB(_) | Error::Session(_) => "An error occurred".to_string(),
        error => error.to_string(),
    };
    ActionResult::error(status, message)
}

fn into_action_result<T>(result: crate::Result<T>) -> ActionResult {
    result.map(|_| ActionResult::ok()).unwrap_or_else(handle_error)
}

pub async fn create_note_action(note_id: NoteId, base: BaseParams) -> ActionResult {
    into_action_result(handlers::create_note(CreateNote { note_id }, base).await)
}

pub async fn update_note_action(note_id: NoteId, text: String, base: BaseParams) -> ActionResult {
    into_action_result(handlers::update_note(note_id, UpdateNote { text }, base).await)
}

pub async fn delete_note_action(note_id: NoteId, base: BaseParams) -> ActionResult {
    into_action_result(handlers::delete_note(note_id, base).await)
}

/// Answers the latest question from the caller's notes. Always yields HTML.
pub async fn ask_ai_about_notes_action(
    AskQuestions { questions, responses }: AskQuestions,
    ai: &dyn GenerationBackend,
    base: BaseParams,
) -> String {
    ask(&questions, &responses, ai, base).await.unwrap_or_else(error_html)
}

fn error_html(error: Error) -> String {
    match error {
        Error::Ai(ai::Error::MissingApiKey) => {
            tracing::error!("GEMINI_API_KEY is not set");
            MISSING_API_KEY_MESSAGE.to_string()
        }
        Error::Ai(error) => {
            tracing::error!("generation failed: {error:?}");
            format!("<p>Error with AI service: {}</p>", HtmlEscape(&error.to_string()))
        }
        error => {
            tracing::error!("ask failed: {error:?}");
            format!("<p>An error occurred: {}</p>", HtmlEscape(&error.to_string()))
        }
    }
}

fn prompt_error(error: minijinja::Error) -> Error {
    Error::Unexpected(format!("failed to render prompt: {error}"))
}

async fn ask(
    questions: &[String],
    responses: &[String],
    ai: &dyn GenerationBackend,
    BaseParams { db, ctx }: BaseParams,
) -> crate::Result<String> {
    let user = ctx.require_user("ask AI questions")?;
    let question = questions
        .last()
        .ok_or_else(|| Error::Validation("A question is required".into()))?;

    let notes = handlers::find_notes_by_author(db, user.id).await?;
    if notes.is_empty() {
        return Ok(NO_NOTES_MESSAGE.to_string());
    }

    tracing::info!(notes = notes.len(), history = responses.len(), model = ai.model_name(), "answering question about notes");

    let history = format_history(questions, responses);
    let prompt = build_prompt(&history, &format_notes(&notes), question).map_err(prompt_error)?;

    let answer = sanitize_response(&ai.generate(&prompt).await?);
    if answer.is_empty() {
        return Ok(EMPTY_RESPONSE_MESSAGE.to_string());
    }

    Ok(answer)
}
