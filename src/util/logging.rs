use tracing_subscriber::{fmt, EnvFilter};

/// Initializes tracing. `RUST_LOG` selects the filter; the default is
/// `info` so request and query logs show up out of the box.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(env_filter).with_target(true).init();
}
