use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "FEED_ACTIONS_LOG";

/// Installs the stderr subscriber for the binary. `FEED_ACTIONS_LOG` wins
/// over `RUST_LOG`; without either only warnings are shown.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
