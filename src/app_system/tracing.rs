/// Installs the global subscriber: `RUST_LOG` filtering (default `info`), uptime
/// timestamps, compact lines with targets. Call once, at startup.
pub fn setup_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_target(true)
        .compact()
        .init();
}
