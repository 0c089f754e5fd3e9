// Logging - tracing subscriber shared by the CLI and the server

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. RUST_LOG wins over `default_level`.
/// A second call is a no-op, so tests and binaries can both call it.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
