use std::io::IsTerminal;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when neither `EXAM_LOG` nor `RUST_LOG` is set.
const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_env("EXAM_LOG") {
        return filter;
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the stderr subscriber. Later calls are ignored.
pub fn init_logging() {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal());

    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .try_init();
}
