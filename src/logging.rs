// Logging setup for the CLI
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Install the global subscriber. Output goes to stderr so it never mixes
/// with what the console view prints.
pub fn init_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter(cfg!(debug_assertions)).to_string());

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log_level))?;

    let fmt_layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        // JSON for log aggregation
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::debug!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Log level: {}", log_level);

    Ok(())
}

/// Filter used when `RUST_LOG` is unset; debug builds log more.
fn default_filter(debug_build: bool) -> &'static str {
    if debug_build {
        "info,product_studio=debug,reqwest=info,hyper=info"
    } else {
        "info,product_studio=info,reqwest=warn,hyper=warn"
    }
}
