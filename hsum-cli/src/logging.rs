//! Logging init: structured events to stderr, stdout stays clean for output.

use tracing_subscriber::EnvFilter;

/// `-v` flags win over `HSUM_LOG`, which wins over `RUST_LOG`. Default: warn.
pub fn init(verbosity: u8) {
    let env_filter = match verbosity {
        0 => EnvFilter::try_from_env("HSUM_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}
