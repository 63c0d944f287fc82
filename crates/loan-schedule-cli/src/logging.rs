use std::io;
use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `fallback` is parsed as the filter.
/// Logs never go to stdout, which carries the command output.
pub fn init(fallback: &str) -> Result<(), Box<dyn std::error::Error>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(fallback)
            .map_err(|e| format!("invalid log level/filter '{}': {}", fallback, e))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_ansi(atty::is(atty::Stream::Stderr))
        .with_writer(io::stderr)
        .try_init()
        .map_err(|e| format!("failed to install log subscriber: {}", e))?;

    Ok(())
}
