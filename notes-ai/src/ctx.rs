use axum::{
    extract::{Extension, FromRequestParts},
    http::request::Parts,
    response::Response,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::{
    db::DB,
    users::{
        auth::{find_one_by_id, GetUserByIdParameters},
        UserId,
    },
    Error,
};

/// Session key holding the signed-in user's id.
pub const USER_ID_KEY: &str = "auth.user_id";

#[derive(Clone, Debug, FromRequestParts)]
pub struct BaseParams {
    pub ctx: Ctx,
    #[from_request(via(Extension))]
    pub db: DB,
}

impl BaseParams {
    pub fn new(db: DB, ctx: Ctx) -> Self {
        Self { db, ctx }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: String,
}

#[derive(Clone, Debug)]
pub struct Ctx {
    pub user: Option<User>,
}

impl Ctx {
    pub fn new(user: Option<User>) -> Self {
        Self { user }
    }

    pub fn get_user_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|u| u.id)
    }

    /// The signed-in user, or `Unauthenticated` for the given action.
    pub fn require_user(&self, action: &str) -> crate::Result<&User> {
        self.user.as_ref().ok_or_else(|| Error::unauthenticated(action))
    }
}

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(session) = Session::from_request_parts(parts, state).await else {
            return Ok(Self::new(None));
        };

        let user_id = match session.get::<UserId>(USER_ID_KEY).await {
            Ok(Some(user_id)) => user_id,
            Ok(None) => return Ok(Self::new(None)),
            Err(err) => {
                tracing::warn!("failed to read session: {err:?}");
                return Ok(Self::new(None));
            }
        };

        let Ok(Extension(db)) = Extension::<DB>::from_request_parts(parts, state).await else {
            return Ok(Self::new(None));
        };

        let user = find_one_by_id(db, GetUserByIdParameters { user_id })
            .await
            .map_err(|err| tracing::debug!("session user {user_id} not resolved: {err:?}"))
            .ok()
            .map(|u| User {
                id: u.id,
                email: u.email,
            });

        Ok(Self { user })
    }
}
