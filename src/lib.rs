pub mod client;
pub mod commands;
pub mod config;
pub mod models;
pub mod workflow;

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. Output goes to stderr so command
/// output on stdout stays clean.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();
}
