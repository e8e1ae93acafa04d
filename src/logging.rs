//! # Logging
//! src/logging.rs
//!
//! Inicializa `tracing` hacia stdout. `RUST_LOG` con directivas completas
//! (ej: `hasher_server=debug`) tiene prioridad sobre el nivel simple.

use std::io;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

/// Instala el subscriber global; llamadas repetidas no hacen nada
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer = fmt::layer().with_writer(io::stdout).with_thread_names(true);

    let _ = Registry::default()
        .with(filter)
        .with(stdout_layer)
        .try_init();
}
