//! Tracing setup for the `terms` binary
//!
//! The subscriber is installed before the configuration is read so config
//! loading can log. The configured `logging.level` is applied afterwards
//! through a reload handle, unless `RUST_LOG` or `--verbose` already picked
//! the level.

use anyhow::{Context, Result};
use tracing::Subscriber;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{reload, EnvFilter, Registry};

/// Handle for swapping the active filter after startup
pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Filter used until the config file has been read
pub fn startup_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }))
}

/// True when `RUST_LOG` or `--verbose` chose the level
pub fn level_fixed(verbose: bool) -> bool {
    verbose || std::env::var_os(EnvFilter::DEFAULT_ENV).is_some()
}

/// Reloadable fmt subscriber writing to `writer`
pub fn subscriber<W>(filter: EnvFilter, writer: W) -> (impl Subscriber + Send + Sync + 'static, FilterHandle)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let (filter, handle) = reload::Layer::new(filter);
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer));
    (subscriber, handle)
}

/// Switch to the configured level; no-op when the level is fixed
pub fn apply_config_level(handle: &FilterHandle, level: &str, fixed: bool) -> Result<()> {
    if fixed {
        return Ok(());
    }
    handle
        .reload(EnvFilter::new(level))
        .with_context(|| format!("Failed to apply log level '{}'", level))
}
