use tracing::Level;

use crate::config::AppConfig;

/// Install a fmt subscriber at the configured level.
///
/// Unknown levels fall back to `info`. Returns `false` if a global
/// subscriber was already installed, in which case nothing changes.
pub fn init_tracing(config: &AppConfig) -> bool {
    let level = parse_level(&config.log_level);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .is_ok()
}

fn parse_level(s: &str) -> Level {
    s.trim().parse().unwrap_or(Level::INFO)
}
