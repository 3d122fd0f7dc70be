use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    response::Html,
    routing::{get, post},
    Json, Router,
};

use crate::{ai::Ai, ctx::BaseParams, state::AppState, Error, Result};

use super::{actions, handlers, ActionResult, AskQuestions, CreateNote, FindNotesResponse, Note, NoteId, UpdateNote};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/notes", get(find_notes).post(create_note))
        .route(
            "/api/notes/{note_id}",
            get(get_note).patch(update_note).delete(delete_note),
        )
        .route("/api/ask", post(ask))
        .with_state(state)
}

async fn find_notes(base: BaseParams) -> Result<Json<FindNotesResponse>> {
    handlers::find_notes(base).await.map(Json)
}

async fn get_note(path: std::result::Result<Path<NoteId>, PathRejection>, base: BaseParams) -> Result<Json<Note>> {
    let Path(note_id) = path?;
    handlers::get_note(note_id, base).await.map(Json)
}

async fn create_note(base: BaseParams, args: std::result::Result<Json<CreateNote>, JsonRejection>) -> ActionResult {
    match args {
        Ok(Json(CreateNote { note_id })) => actions::create_note_action(note_id, base).await,
        Err(rejection) => actions::handle_error(rejection.into()),
    }
}

async fn update_note(
    path: std::result::Result<Path<NoteId>, PathRejection>,
    base: BaseParams,
    args: std::result::Result<Json<UpdateNote>, JsonRejection>,
) -> ActionResult {
    match (path, args) {
        (Ok(Path(note_id)), Ok(Json(UpdateNote { text }))) => actions::update_note_action(note_id, text, base).await,
        (Err(rejection), _) => actions::handle_error(rejection.into()),
        (_, Err(rejection)) => actions::handle_error(rejection.into()),
    }
}

async fn delete_note(path: std::result::Result<Path<NoteId>, PathRejection>, base: BaseParams) -> ActionResult {
    match path {
        Ok(Path(note_id)) => actions::delete_note_action(note_id, base).await,
        Err(rejection) => actions::handle_error(rejection.into()),
    }
}

async fn ask(
    State(ai): State<Ai>,
    base: BaseParams,
    args: std::result::Result<Json<AskQuestions>, JsonRejection>,
) -> Html<String> {
    let args = match args {
        Ok(Json(args)) => args,
        Err(rejection) => {
            let error = Error::from(rejection);
            return Html(format!("<p>An error occurred: {}</p>", minijinja::HtmlEscape(&error.to_string())));
        }
    };

    Html(actions::ask_ai_about_notes_action(args, ai.as_ref(), base).await)
}
