//! Diagnostic output for the command-line binary
//!
//! Events go to stderr so they never mix with command output on stdout.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g. `gitgood=debug`
pub const LOG_ENV: &str = "GITGOOD_LOG";

/// Level used when `GITGOOD_LOG` is unset, raised by each `-v`
pub fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber; a second call is a no-op
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "warn")]
    #[case(1, "info")]
    #[case(2, "debug")]
    #[case(7, "trace")]
    fn verbosity_raises_the_level(#[case] verbosity: u8, #[case] level: &str) {
        assert_eq!(default_level(verbosity), level);
    }
}
