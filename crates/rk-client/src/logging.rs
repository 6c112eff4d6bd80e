//! Subscriber setup for request/response logging.
//!
//! The client emits its `REST ...` events through `tracing`. Applications
//! that already install a subscriber need nothing from this module; the rest
//! can call [`init`] with a [`LogConfig`].

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;
use crate::error::{Error, ErrorKind, Result};

/// Build a fmt subscriber for `config`.
///
/// Events at `info` and above pass when logging is enabled, `warn` and above
/// otherwise; `RUST_LOG` overrides either. With a file configured, events are
/// appended to it without ANSI colors; otherwise they go to stderr.
pub fn subscriber(config: &LogConfig) -> Result<Box<dyn Subscriber + Send + Sync>> {
    let level = if config.enabled {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    Ok(match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    Error::with_source(
                        ErrorKind::Config(format!("cannot open log file {}", path.display())),
                        e,
                    )
                })?;
            Box::new(builder.with_ansi(false).with_writer(Mutex::new(file)).finish())
        }
        None => Box::new(builder.with_writer(std::io::stderr).finish()),
    })
}

/// Install the subscriber for `config` as the global default.
///
/// Returns `false` if a global subscriber was already set.
pub fn init(config: &LogConfig) -> Result<bool> {
    let subscriber = subscriber(config)?;
    Ok(tracing::subscriber::set_global_default(subscriber).is_ok())
}
