use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
    ctx::{Ctx, User, USER_ID_KEY},
    db::DB,
    state::AppState,
    users::auth::{login as login_user, LoginUserParameters},
    Error, Result,
};

#[derive(Debug, Deserialize)]
pub struct Login {
    pub email: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .with_state(state)
}

async fn login(
    State(db): State<DB>,
    session: Session,
    args: std::result::Result<Json<Login>, JsonRejection>,
) -> Result<Json<User>> {
    let Json(Login { email }) = args?;
    if !email.contains('@') {
        return Err(Error::Validation("A valid email is required".into()));
    }

    let user = login_user(db, LoginUserParameters { user_email: email }).await?;

    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user.id).await?;

    tracing::info!(user_id = %user.id, "{} logged in", user.email);

    Ok(Json(User {
        id: user.id,
        email: user.email,
    }))
}

async fn logout(session: Session) -> Result<StatusCode> {
    session.flush().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn me(ctx: Ctx) -> Result<Json<User>> {
    ctx.require_user("view your account").cloned().map(Json)
}
