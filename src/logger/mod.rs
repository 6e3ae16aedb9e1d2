// SPDX-License-Identifier: GPL-3.0-only

use anyhow::Result;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Sets up logging to stderr and, when available, the journal.
///
/// Stdout carries submissions and must stay clean.
pub fn init_logger() -> Result<()> {
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false);
    let (journald, journald_err) = match tracing_journald::layer() {
        Ok(layer) => (Some(layer), None),
        Err(err) => (None, Some(err)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(journald)
        .try_init()?;
    log_panics::init();

    if let Some(err) = journald_err {
        debug!(?err, "Journald not available");
    }
    info!("Version: {}", std::env!("CARGO_PKG_VERSION"));
    if cfg!(debug_assertions) {
        debug!(
            "Debug build ({})",
            std::option_env!("GIT_HASH").unwrap_or("Unknown")
        );
    }

    Ok(())
}
