pub mod config;
pub mod error;
pub mod message;
pub mod routes;
pub mod security;
pub mod services;
pub mod state;

/// Install the global `tracing` subscriber. `RUST_LOG` wins over the debug flag.
pub fn init_tracing(debug: bool) {
    use tracing_subscriber::EnvFilter;

    let fallback = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    // Integration tests may call this more than once per process; the first subscriber stays.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
