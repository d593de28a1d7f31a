//! Logging setup of the command line host.

use checker::logging::LogLevel;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Print `tracing` events to stderr. Stdout belongs to issue output in the
/// host and to the protocol in the worker.
pub fn init_tracing(level: LogLevel) {
    let env = "RUST_LOG";
    let mut env_filter = EnvFilter::from_env(env);
    if std::env::var_os(env).is_none() {
        env_filter = env_filter.add_directive(level.level_filter().into());
    }

    let layer = tracing_subscriber::fmt::layer()
        .with_line_number(false)
        .with_file(false)
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    // A second call keeps the first subscriber.
    let _ = tracing_subscriber::registry().with(layer).try_init();
}
