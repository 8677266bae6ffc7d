use tracing_subscriber::EnvFilter;

/// Console logging filtered by `RUST_LOG`, `info` when unset.
pub fn setup_console_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
