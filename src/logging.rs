use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "TODOKIT_LOG";

/// Diagnostics go to stderr so stdout stays clean for `--json` output.
/// `TODOKIT_LOG` takes precedence over the verbosity flags.
pub fn init(verbose: bool, quiet: bool) {
    let default = if verbose {
        "todokit=debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
