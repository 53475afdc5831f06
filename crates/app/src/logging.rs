use tracing_subscriber::EnvFilter;

/// Initialise logging at `info`, or `debug` with `--debug`.
///
/// `RUST_LOG` only takes effect together with `--debug`, so a stray variable
/// in the user's environment cannot turn on verbose output by itself.
pub fn init(debug: bool) {
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
