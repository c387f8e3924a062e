//! Log setup for oracle processes.
//!
//! The driver runs an oracle as `<oracle> <candidate> 2>&1` and scans the
//! merged output for `FUZZ:` lines. Log records therefore go to stderr, never
//! stdout, and the CLI defaults to `WARN` so a healthy evaluation adds nothing
//! to what the driver reads. `RUST_LOG` overrides the level.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the process-wide subscriber. `json` switches to one JSON object
/// per record; `level` applies when `RUST_LOG` is unset.
///
/// Only the first call in a process has an effect.
pub fn init_tracing(json: bool, level: Level) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let records = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if json {
        registry.with(records.json()).try_init()
    } else {
        registry.with(records).try_init()
    };
    // Already installed by an earlier call (or by a test harness).
    let _ = installed;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_is_harmless() {
        init_tracing(false, Level::WARN);
        init_tracing(true, Level::DEBUG);
        tracing::warn!(event = "telemetry.test", "still logging");
    }
}
