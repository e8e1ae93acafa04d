//! # hashersrv - Entry Point
//! src/main.rs
//!
//! Arranca el servicio, espera Ctrl-C, deja de aceptar requests y no sale
//! hasta que terminan los hashes ya aceptados.

use hasher_server::config::Config;
use hasher_server::logging::init_logging;
use hasher_server::server::{Server, ServerHandle};
use std::process::ExitCode;
use tracing::{error, info};

fn main() -> ExitCode {
    let config = Config::new();

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    init_logging(&config.log_level);
    info!(
        address = %config.address(),
        stats_average = ?config.stats_average,
        latency_log_capacity = config.latency_log_capacity,
        "starting hasher service"
    );

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "fatal error");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> std::io::Result<()> {
    let server = Server::bind(config)?.spawn()?;
    info!(address = %server.local_addr(), "server listening");

    wait_for_interrupt()?;
    shutdown(&server);

    Ok(())
}

/// Bloquea el thread principal hasta recibir Ctrl-C
fn wait_for_interrupt() -> std::io::Result<()> {
    tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .build()?
        .block_on(tokio::signal::ctrl_c())
}

fn shutdown(server: &ServerHandle) {
    info!("hasher service shutting down gracefully");
    server.shutdown();
    info!(
        total_jobs = server.api().store().job_count(),
        "all hash jobs finished"
    );
}
