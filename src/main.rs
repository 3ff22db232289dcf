// src/main.rs
use actix_web::{web, App, HttpServer};
use clap::Parser;
use log::info;
use n_pendulum_viewer::{
    server, AnimationLoop, FrameRenderer, LoopSettings, SimulationClient, UreqTransport,
    ViewerConfig,
};
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize logging
    env_logger::init();

    let config = ViewerConfig::parse();
    config.validate().map_err(io::Error::other)?;
    info!(
        "Starting n-pendulum-viewer {} (solver: {})",
        env!("CARGO_PKG_VERSION"),
        config.solver_url
    );

    let transport = Arc::new(UreqTransport::new(config.request_timeout()));
    let client = SimulationClient::new(config.solver_url.clone(), transport);
    let settings = LoopSettings {
        tick: config.tick_interval(),
        policy: config.run_policy,
        chain_length: config.chain_length,
        container_width: config.width,
    };
    let (handle, _animation) = AnimationLoop::spawn(settings, client, FrameRenderer::default())
        .map_err(io::Error::other)?;

    info!("Control surface listening on http://{}", config.bind);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(handle.clone()))
            .configure(server::configure)
    })
    .bind(&config.bind)?
    .run()
    .await
}
