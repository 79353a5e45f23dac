use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Logs go to stderr so command output on stdout stays clean. `RUST_LOG`
/// takes precedence; otherwise our own target logs at `info` (`debug` when
/// verbose) and dependencies only at `warn`.
pub fn init_logging(verbose: bool) {
    let app_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let registry = tracing_subscriber::registry()
        .with(fmt::layer().compact().with_writer(std::io::stderr));
    match EnvFilter::try_from_default_env() {
        Ok(env_filter) => registry.with(env_filter).init(),
        Err(_) => registry
            .with(
                Targets::new()
                    .with_default(LevelFilter::WARN)
                    .with_target("fxq", app_level),
            )
            .init(),
    }
}
