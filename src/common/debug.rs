//! Logging setup and environment diagnostics

use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Map the repeatable `-v` flag to a default filter directive
fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the verbosity flag when set.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Log tool and host information for debugging purposes
pub fn log_build_environment() {
    debug!(
        version = env!("CARGO_PKG_VERSION"),
        os = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        "glyph-builder environment"
    );

    if let Ok(os_release) = std::fs::read_to_string("/etc/os-release") {
        for line in os_release.lines() {
            if let Some(name) = line.strip_prefix("PRETTY_NAME=") {
                debug!("OS: {}", name.trim_matches('"'));
                break;
            }
        }
    }

    if let Ok(dir) = std::env::var(crate::constants::config::DIR_ENV_VAR) {
        debug!(config_dir = %dir, "Config directory overridden by environment");
    }
}
