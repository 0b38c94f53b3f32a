//! Tracing subscriber setup driven by the `logger` section of the
//! configuration.

use anyhow::{Context, Result};
use bingconfig::Config;
use tracing::warn;
use tracing_subscriber::{
    Registry,
    filter::LevelFilter,
    layer::SubscriberExt,
    reload,
    util::SubscriberInitExt,
};

/// Changes the maximum log level after initialization
#[derive(Clone)]
pub struct LogHandle {
    reload_handle: reload::Handle<LevelFilter, Registry>,
}

impl LogHandle {
    pub fn set_max_level(&self, level: LevelFilter) -> Result<()> {
        self.reload_handle
            .modify(|filter| *filter = level)
            .context("Cannot change log level")
    }

    pub fn max_level(&self) -> Option<LevelFilter> {
        self.reload_handle.clone_current()
    }
}

/// Parses a level name (`TRACE`, `debug`, `off`...), `None` when unknown
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    level.trim().parse().ok()
}

/// Installs the global subscriber.
///
/// `logger.min_level` sets the initial level (INFO when invalid) and
/// `logger.enable_console` adds a formatted stderr output. Fails when a
/// global subscriber is already installed.
pub fn init_logging(config: &Config) -> Result<LogHandle> {
    let min_level = config.get_log_min_level();
    let level = parse_level(&min_level).unwrap_or(LevelFilter::INFO);
    let (filter, reload_handle) = reload::Layer::new(level);

    // Le filtre doit précéder la sortie console
    let console = config.get_log_enable_console().then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
    });

    Registry::default()
        .with(filter)
        .with(console)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    if parse_level(&min_level).is_none() {
        warn!(level = %min_level, "Unknown log level, using INFO");
    }

    Ok(LogHandle { reload_handle })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_level_names() {
        assert_eq!(parse_level("INFO"), Some(LevelFilter::INFO));
        assert_eq!(parse_level(" debug "), Some(LevelFilter::DEBUG));
        assert_eq!(parse_level("off"), Some(LevelFilter::OFF));
        assert_eq!(parse_level("verbose"), None);
    }
}
