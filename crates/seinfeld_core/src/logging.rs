//! Console logging setup shared by the binary and integration tests.

use seinfeld_error::{ConfigError, SeinfeldError, SeinfeldResult};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a global `tracing` subscriber writing to stderr.
///
/// `RUST_LOG` wins when set. Otherwise `verbose` selects between
/// `debug` and `info` for the workspace crates and `warn` for everything else.
///
/// Calling this twice is an error; tests that want logs should use
/// `try_init` semantics and ignore the result.
pub fn init_logging(verbose: bool, json: bool) -> SeinfeldResult<()> {
    let default_directive = if verbose {
        "warn,seinfeld=debug,seinfeld_core=debug,seinfeld_models=debug,seinfeld_retrieval=debug,seinfeld_pipeline=debug"
    } else {
        "warn,seinfeld=info,seinfeld_core=info,seinfeld_models=info,seinfeld_retrieval=info,seinfeld_pipeline=info"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .map_err(|e| SeinfeldError::from(ConfigError::new(format!("Invalid log filter: {}", e))))?;

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| {
            SeinfeldError::from(ConfigError::new(format!(
                "Failed to install log subscriber: {}",
                e
            )))
        })
}
