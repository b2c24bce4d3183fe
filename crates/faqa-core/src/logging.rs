//! Tracing subscriber setup shared by the binaries

use crate::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `default_directives` is used with
/// the configured level appended for everything else.
pub fn init_tracing(config: &LoggingConfig, default_directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},{default_directives}", config.level)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    // A second init (tests, embedded use) is not an error worth failing on
    let result = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        tracing::debug!("tracing subscriber already installed: {e}");
    }
}
