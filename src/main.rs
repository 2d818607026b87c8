use tokio_util::sync::CancellationToken;

mod api;
mod bridge;
mod config;
mod handler;

fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}

#[tokio::main]
async fn main() -> ! {
    init_logging();
    let config = config::config();
    log::info!(
        "vid2gif: transcoder binary {}, listening on {}",
        config.ffmpeg_path(),
        config.listen_addr()
    );

    let cancel = CancellationToken::new();

    let cancel_clone = cancel.clone();
    api::start_api_server(cancel_clone)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error starting API server: {}", e);
            std::process::exit(1);
        });

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                break;
            },
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
            },
        }
    }

    std::process::exit(0);
}
