//! Session sign-in. Identity proofing is left to whatever fronts the service;
//! this module only binds a user id to the session cookie.

mod routes;

use axum::Router;
use tower_sessions::{
    cookie::{time::Duration, SameSite},
    Expiry, MemoryStore, SessionManagerLayer,
};

pub use routes::router;

pub fn add_session_layer(app: Router) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)));

    app.layer(session_layer)
}
