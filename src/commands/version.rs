//! Command: print version information.

/// Version string baked in at build time.
#[must_use]
pub fn version() -> &'static str {
    option_env!("DEVSETUP_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the devsetup version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("devsetup {}", version());
}
