pub mod app;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod navigation;
pub mod selection;
pub mod session;
pub mod settings;
pub mod store;

use anyhow::{Context, Result};
use log::info;
use tokio_util::sync::CancellationToken;

use app::{annotation_loop, spawn_stdin_reader, AppController, AppState, StdoutSink};
use settings::AnnotatorSettings;

async fn start(settings: AnnotatorSettings) -> Result<()> {
    let uid = session::resolve_uid(&settings)?;
    let session = session::open_session(&settings, uid).await?;
    let state = AppState::from_dataset(session.dataset, &settings)?;
    info!(
        "Session {} ready: {} trajectories, {} segments, {} frames",
        session.uid,
        state.trajectories.len(),
        state.segments.len(),
        state.navigation.total_frames()
    );

    let controller = AppController::new(
        state,
        session.db,
        settings,
        session.uid,
        Box::new(StdoutSink),
    );

    let cancel_token = CancellationToken::new();
    {
        let token = cancel_token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received");
                token.cancel();
            }
        });
    }

    let commands = spawn_stdin_reader(cancel_token.clone());
    let controller = annotation_loop(controller, commands, cancel_token.clone()).await?;
    cancel_token.cancel();

    info!("Session {} closed", controller.uid());
    Ok(())
}

pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Trajectory annotator starting up...");

    let settings = AnnotatorSettings::from_env()?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let result = runtime.block_on(start(settings));
    // A pending stdin read would otherwise hold up runtime shutdown.
    runtime.shutdown_background();
    result
}
