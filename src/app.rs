use tokio::net::TcpListener;

use crate::api::{self, AppState};
use crate::config::ServerConfig;
use crate::driver::{BroadcastPublisher, TickDriver};
use crate::pet::{PetEngine, SharedPet};

/// Load config, start the tick driver and serve HTTP until Ctrl-C.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    log::info!(
        "Canvas {}x{}, sprites under {}",
        config.canvas_width,
        config.canvas_height,
        config.sprite_root
    );

    let pet = SharedPet::new(PetEngine::new(config.canvas_width, config.canvas_height));
    let updates = BroadcastPublisher::new();
    let driver = TickDriver::spawn(pet.clone(), updates.clone());

    let state = AppState::new(pet, updates, &config.sprite_root);
    let app = api::router(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    driver.shutdown();
    log::info!("Pet simulation stopped");
    served?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {e}");
        // Without a signal handler, run until killed.
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown requested");
}
