use axum_macros::FromRef;

use crate::{ai::Ai, db::DB};

#[derive(FromRef, Clone)]
pub struct AppState {
    pub conn: DB,
    pub ai: Ai,
}
