use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LogFormat;

/// Initialize the tracing subscriber for the embedding process.
/// Uses RUST_LOG env var for filtering (defaults to info).
pub fn init_tracing() {
    init_tracing_with(LogFormat::Text);
}

/// Like [`init_tracing`], with the output format taken from configuration.
pub fn init_tracing_with(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(fmt::layer().with_ansi(true)).init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
}
