//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout only carries command output. `RUST_LOG`
//! overrides the level chosen from the CLI flags.

use tracing_subscriber::EnvFilter;

/// Filter directive for the given flags, or `None` when logging is off.
pub fn default_directive(debug: bool, machine_output: bool) -> Option<&'static str> {
    match (debug, machine_output) {
        (true, _) => Some("vault_util=debug"),
        (false, true) => None,
        (false, false) => Some("vault_util=info"),
    }
}

/// Install the global subscriber. Call once, from `main`.
pub fn init(debug: bool, colorize: bool, machine_output: bool) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match default_directive(debug, machine_output) {
            Some(directive) => EnvFilter::new(directive),
            None => EnvFilter::new("off"),
        },
    };

    // A subscriber may already be set (e.g. by a test harness).
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(colorize)
        .with_target(debug)
        .try_init()
    {
        tracing::debug!(error = %e, "keeping the existing tracing subscriber");
    }
}
