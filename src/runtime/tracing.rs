/// Initializes the tracing/logging infrastructure for the application.
///
/// Installs a compact `tracing-subscriber` formatter without targets, filtered
/// by `RUST_LOG`:
/// - `RUST_LOG=info` - Registrations, load failures, shutdown
/// - `RUST_LOG=debug` - Barrier growth, render gating, mixin lookups
/// - `RUST_LOG=applitude=trace` - Event dispatch and buffered log lines
///
/// Lines written through [`Applitude::log`](crate::Applitude::log) reach this
/// subscriber only when the environment has `debug` set.
///
/// # Example
///
/// ```ignore
/// setup_tracing();
/// tracing::info!("Application started");
/// ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
