mod api;
mod app;
mod config;
mod driver;
mod pet;
mod systems;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Pet simulation starting up");

    if let Err(e) = app::run().await {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
