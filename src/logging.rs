//! Diagnostic logging.
//!
//! Logs go to stderr through `tracing-subscriber`. `RUST_LOG` overrides the
//! level picked from the command-line verbosity flags.

use tracing_subscriber::EnvFilter;

/// Maps `-q` / `-v` counts to a default filter directive.
pub fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "off";
    }
    match verbose {
        0 => "tidyfold=error",
        1 => "tidyfold=info",
        2 => "tidyfold=debug",
        _ => "tidyfold=trace",
    }
}

/// Installs the global subscriber. Calling it twice is harmless.
pub fn init_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
