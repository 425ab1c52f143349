use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log to stderr so output does not fight the terminal UI on stdout.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hyper=warn,reqwest=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
