//! Logging initialization
//!
//! The library only emits `tracing` events; installing a subscriber is up to
//! the binary. Logs go to stderr so stdout stays reserved for diff output.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g. `difftree=debug`
pub const LOG_ENV: &str = "DIFFTREE_LOG";

/// Log output style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

static INIT_ONCE: Once = Once::new();

/// Default filter directive for a `-v` count
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "difftree=warn",
        1 => "difftree=info",
        2 => "difftree=debug",
        _ => "difftree=trace",
    }
}

/// Install the global subscriber
///
/// `DIFFTREE_LOG` takes precedence over the verbosity level. Only the first
/// call has any effect.
pub fn init(format: LogFormat, verbosity: u8) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

        // Another subscriber may already be installed (embedding, tests)
        let _ = match format {
            LogFormat::Text => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init(),
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
        };
    });
}
