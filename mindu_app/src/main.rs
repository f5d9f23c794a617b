use std::process::ExitCode;
use tracing::error;

mod app;
mod config;
mod error;
mod game;
mod sdl;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match app::App::new(std::env::args().nth(1)).and_then(|mut app| app.run()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("The app failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
