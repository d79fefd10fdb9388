//! Tracing subscriber setup shared by the binaries

use tracing_subscriber::{EnvFilter, prelude::*};

const WORKSPACE_CRATES: &[&str] = &["server", "campaign", "services", "utils"];

/// Builds the filter directive string: `warn` for dependencies, `level` for our crates.
pub fn filter_directives(level: &str) -> String {
    let mut directives = String::from("warn");
    for krate in WORKSPACE_CRATES {
        directives.push_str(&format!(",{krate}={level}"));
    }
    directives
}

/// Install the global subscriber. `RUST_LOG` picks the level for workspace crates.
pub fn init() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_new(filter_directives(&log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init (tests, embedded use) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .try_init();
}
