mod config;

mod ai;
mod app;
mod auth;
mod ctx;
mod db;
mod errors;
mod notes;
mod shared;
mod state;
mod users;

use std::net::SocketAddr;

use app::AppParams;
pub use config::config;
pub use db::{init_db, DB};
pub use errors::{Error, Result};
use shared::tracing::{add_tracing_layer, setup_tracing};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> errors::Result<()> {
    let config = config();

    setup_tracing(config.log_json);

    let conn = init_db().await?;
    let ai = ai::from_config(config)?;

    let app = app::create(AppParams {
        db: conn,
        ai,
        router: notes::router,
    })
    .await?;

    let app = add_tracing_layer(app);

    let port = config.port;
    let listener = TcpListener::bind(format!("127.0.0.1:{port}"))
        .await
        .map_err(|e| Error::Unexpected(format!("failed to bind port {port}: {e}")))?;

    if let Ok(addr) = listener.local_addr() {
        tracing::info!("listening on http://{addr}");
    }

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|e| Error::Unexpected(e.to_string()))?;

    Ok(())
}
