//! # hashercli
//! src/bin/hashercli.rs
//!
//! Cliente de carga para `hashersrv`: crea jobs, verifica los digests y
//! muestra `/stats`. Sale con código distinto de 0 si algo falló.

use clap::Parser;
use hasher_server::client::HasherClient;
use hasher_server::loadtest::{LoadTest, LoadTestOptions};
use hasher_server::logging::init_logging;
use std::process::ExitCode;
use tracing::{error, info};

/// Argumentos del cliente de carga
#[derive(Debug, Parser)]
#[command(name = "hashercli")]
#[command(about = "Genera carga contra hashersrv y verifica los hashes")]
#[command(version = "0.1.0")]
struct Args {
    /// Dirección del servidor
    #[arg(long, default_value = "http://localhost:8080", env = "HASHER_ADDR")]
    addr: String,

    /// Número de requests a lanzar
    #[arg(long = "num-req", default_value = "10")]
    num_req: usize,

    /// Espera máxima antes de cada creación, en segundos
    #[arg(long = "max-create-delay-secs", default_value = "9")]
    max_create_delay_secs: u64,

    /// Nivel de log (`RUST_LOG` tiene prioridad)
    #[arg(long = "log-level", default_value = "info", env = "HASHER_LOG_LEVEL")]
    log_level: String,
}

/// Opciones de la prueba a partir de los flags; la espera mínima es 1 s
fn load_test_options(args: &Args) -> LoadTestOptions {
    let max_create_ms = args.max_create_delay_secs.saturating_mul(1_000);

    LoadTestOptions {
        requests: args.num_req,
        create_delay_ms: max_create_ms.min(1_000)..=max_create_ms,
        ..LoadTestOptions::default()
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    let options = load_test_options(&args);

    info!(addr = %args.addr, requests = args.num_req, "running the hasher CLI");

    let report = LoadTest::new(HasherClient::new(&args.addr), options).run();

    info!(
        created = report.created,
        verified = report.verified,
        mismatches = report.mismatches,
        failures = report.failures,
        "load test finished"
    );

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        error!("load test failed");
        ExitCode::FAILURE
    }
}
