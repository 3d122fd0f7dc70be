use std::sync::{Arc, OnceLock};

use crate::error_responses;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Request,
    },
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;

pub use response::ErrorResponse;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),

    // auth
    #[error("{0}")]
    Unauthenticated(String),

    // validation
    #[error("{0}")]
    Validation(String),
    #[error("{}", .0.body_text())]
    JsonValidation(#[from] JsonRejection),
    #[error("{}", .0.body_text())]
    PathValidation(#[from] PathRejection),

    #[error(transparent)]
    DB(crate::db::Error),
    #[error(transparent)]
    Ai(#[from] crate::ai::Error),
    #[error(transparent)]
    Session(#[from] tower_sessions::session::Error),

    #[error("{0}")]
    Unexpected(String),
}

impl Error {
    /// The error raised when an action runs without a signed-in user.
    /// `action` completes the sentence "You must be logged in to ...".
    pub fn unauthenticated(action: &str) -> Self {
        Self::Unauthenticated(format!("You must be logged in to {action}"))
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(ErrorResponse::from(self).status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<crate::db::Error> for Error {
    fn from(error: crate::db::Error) -> Self {
        match error {
            crate::db::Error::NotFound(msg) => Self::NotFound(msg),
            crate::db::Error::Conflict(msg) => Self::Conflict(msg),
            error => Self::DB(error),
        }
    }
}

// Response

error_responses! {
    not_found: 404,
    conflict: 409,
    unauthenticated: 401,
    validation: 400,
    path_validation: 400,
    json_validation: 400,
    ai_unavailable: 502,
    unexpected: 500
}

impl From<&Error> for ErrorResponse {
    fn from(error: &Error) -> Self {
        let errors = errors();
        match error {
            Error::NotFound(message) => errors.not_found.with_message(message),
            Error::Conflict(message) => errors.conflict.with_message(message),
            Error::Unauthenticated(message) => errors.unauthenticated.with_message(message),
            Error::Validation(message) => errors.validation.with_message(message),
            Error::JsonValidation(error) => errors.json_validation.with_message(error.body_text()),
            Error::PathValidation(error) => errors.path_validation.with_message(error.body_text()),
            Error::Ai(error) => errors.ai_unavailable.with_message(error.to_string()),
            Error::Unexpected(message) => errors.unexpected.with_message(message),
            _ => errors.unexpected.with_message("Unexpected"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let error = Arc::new(self);

        let error_res = ErrorResponse::from(error.clone().as_ref());
        let status = error_res.status;

        let mut res = axum::Json(error_res).into_response();
        res.extensions_mut().insert(error);

        *res.status_mut() = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        res
    }
}

pub async fn on_error(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let error = response.extensions().get::<Arc<Error>>().map(Arc::as_ref);
    if let Some(error) = error {
        if response.status().is_server_error() {
            tracing::error!("{:?}", error);
        } else {
            tracing::debug!("{:?}", error);
        }
    }

    response
}

mod response {
    use super::*;

    #[derive(Debug, Serialize, Clone, Default)]
    pub struct ErrorResponse {
        pub error: String,
        pub message: Option<String>,
        pub status: u16,
    }

    impl ErrorResponse {
        pub fn new(error: impl Into<String>, status: u16) -> Self {
            Self {
                error: error.into(),
                status,
                ..Default::default()
            }
        }

        pub fn with_message(&self, message: impl Into<String>) -> Self {
            let mut res = self.clone();
            res.message = Some(message.into());
            res
        }
    }

    /// Typed error responses keyed by name
    /// ```rust
    /// error_responses! {
    ///     not_found: 404,
    ///     unexpected: 500
    /// }
    ///
    /// impl From<&Error> for ErrorResponse {
    ///     fn from(error: &Error) -> Self {
    ///     let errors = errors(); // <- from macro
    ///     match error {
    ///         Error::NotFound(message) => errors.not_found.with_message(message),
    ///         Error::Unexpected(message) => errors.unexpected.with_message(message),
    ///     }
    /// }
    /// ```
    #[macro_export]
    macro_rules! error_responses {
        (
            $($name:ident: $code:expr),* $(,)?
        ) => {
            #[derive(Debug, Clone, Serialize)]
            struct Responses {
                $(
                    $name: ErrorResponse,
                )*
            }

            static ERRORS: OnceLock<Responses> = OnceLock::new();

            fn errors() -> &'static Responses {
                ERRORS.get_or_init(|| Responses {
                    $(
                        $name: ErrorResponse::new(stringify!($name), $code),
                    )*
                })
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(Error::unauthenticated("create a note").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::NotFound("Note not found".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(Error::Conflict("exists".into()).status(), StatusCode::CONFLICT);
        assert_eq!(Error::Unexpected("boom".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unauthenticated_message() {
        let error = Error::unauthenticated("delete a note");
        assert_eq!(error.to_string(), "You must be logged in to delete a note");

        let response = ErrorResponse::from(&error);
        assert_eq!(response.error, "unauthenticated");
        assert_eq!(response.message.as_deref(), Some("You must be logged in to delete a note"));
    }
}
