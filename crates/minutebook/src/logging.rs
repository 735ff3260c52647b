//! Tracing setup for the `minutes` binary.
//!
//! Everything minutebook logs is emitted under the `minutebook` target:
//!
//! - `info`: the database opening, meetings scheduled, started, completed
//!   and removed, minutes drafted, PDFs exported
//! - `warn`: generation attempts that failed and will be retried
//! - `debug`: live-session entries (speakers, action items, decisions,
//!   item selection), stored minutes and generation requests
//!
//! The default level is `warn`, so a plain command prints only its own
//! output. `-v` shows the lifecycle and export events.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much of the log the `minutes` binary shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// `--quiet`: errors only.
    Quiet,
    /// Retried generation attempts and other warnings.
    #[default]
    Normal,
    /// `-v`: lifecycle transitions, exports and session entries.
    Verbose,
    /// `-vv`: everything.
    Trace,
}

impl Verbosity {
    /// Most detailed level shown at this verbosity.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }
}

/// Install the stderr subscriber for the `minutes` binary.
///
/// Log lines go to stderr so that listings, minutes text and `mailto:`
/// links on stdout can be piped. `RUST_LOG` replaces the filter derived
/// from `verbosity`, e.g. `RUST_LOG=minutebook::generation=debug` to watch
/// only the text-generation client.
///
/// # Examples
///
/// ```no_run
/// use minutebook::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let default_filter = format!("minutebook={}", verbosity.to_level_filter());
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    );

    // A second call keeps the first subscriber.
    let _ = subscriber.try_init();
}

/// Route warnings to the test harness, e.g. the retry messages of the
/// generation client tests.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("minutebook=warn")
        .with_test_writer()
        .try_init();
}
