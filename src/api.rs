use anyhow::Context;
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub(crate) async fn start_api_server(cancel: CancellationToken) -> anyhow::Result<()> {
    let addr = crate::config::config().listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {}", addr))?;
    log::info!("Api: server started on {}", addr);

    tokio::spawn(async move {
        let app = router();
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(cancel))
            .await
        {
            log::error!("Api: server error: {}", e);
        }
    });
    Ok(())
}

pub(crate) fn router() -> Router {
    Router::new()
        .route("/", get(index))
        .nest("/gif", crate::handler::gif::gif_router())
}

async fn shutdown_signal(cancel: CancellationToken) {
    tokio::select! {
        _ = cancel.cancelled() => {
            log::info!("Api: shutting down server...");
        }
    }
}

async fn index() -> &'static str {
    "vid2gif: GET /gif?video=<url>"
}

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;
