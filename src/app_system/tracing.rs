use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` (from `logging.level`)
/// is used. Safe to call more than once: later calls are ignored.
///
/// ```bash
/// RUST_LOG=debug cargo run                          # everything at debug
/// RUST_LOG=bakery_orders::clients=debug cargo run   # only the clients
/// ```
pub fn setup_tracing(default_level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .compact()
        .try_init();
}
