//! # Applitude Sample
//!
//! A small application built on [`applitude`]:
//! 1.  Loads settings from the TOML file given as the first argument, if any.
//! 2.  Waits on a simulated host bootstrap ([`BootDelay`]).
//! 3.  Registers the demo [`modules`](applitude_sample::modules) and waits
//!     for the render gate.
//!
//! ```bash
//! RUST_LOG=info cargo run -p applitude-sample -- demo.toml
//! ```

use applitude::runtime::setup_tracing;
use applitude::{AppConfig, Applitude, HostReady};
use applitude_sample::error::SampleError;
use applitude_sample::host::BootDelay;
use applitude_sample::modules;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), SampleError> {
    setup_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::from_path(path)?,
        None => AppConfig::default(),
    };
    info!(app = %config.app_namespace, "Starting application");

    let options = config
        .app_options()
        .host_ready(HostReady::Signal(Arc::new(BootDelay::new(Duration::from_millis(10)))));
    let app = Applitude::init(config.app_namespace.clone(), config.environment.clone(), options);

    app.on("widgets.rendered", |event| {
        info!(payload = %event.payload, "Widget rendered");
    });

    let span = tracing::info_span!("module_registration");
    async {
        info!("Registering modules");
        modules::register_all(&app);
    }
    .instrument(span)
    .await;

    let span = tracing::info_span!("render");
    let ready = async {
        info!("Waiting for render gate");
        app.when_render_ready().await
    }
    .instrument(span)
    .await;

    match &ready {
        Ok(()) => info!(modules = ?app.modules(), "Render gate open"),
        Err(e) => warn!(error = %e, "Render gate rejected"),
    }
    // Let the queued renders run before shutting down.
    tokio::time::sleep(Duration::from_millis(50)).await;

    for line in app.debug_log() {
        info!(line = %line, "Debug log");
    }

    let aborted = app.shutdown().await;
    info!(aborted, "Application completed");
    ready.map_err(SampleError::from)
}
