//! # Handlers HTTP del Hasher
//! src/api/handlers.rs
//!
//! - `POST /hash` → crea un job, responde su id
//! - `GET /hash/{id}` → espera el digest del job y lo responde
//! - `GET /stats` → total de jobs y latencia promedio de `GET /hash/{id}`
//!
//! El gate de apagado y el método ya los comprobó el router.

use crate::api::{HasherApi, Stats};
use crate::http::{Request, Response, StatusCode};
use crate::jobs::{HashResult, JobError, JobId};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Cada cuánto se vuelve a mirar un job pendiente
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Prefijo de `GET /hash/{id}`
pub const HASH_ID_PREFIX: &str = "/hash/";

/// Handler para `POST /hash` con el campo de formulario `password`
///
/// # Ejemplo de response
/// ```text
/// 1
/// ```
pub fn create_hash_handler(api: &HasherApi, req: &Request) -> Response {
    let password = match req.form_value("password") {
        Some(p) if !p.is_empty() => p,
        _ => {
            return Response::error(
                StatusCode::UnprocessableEntity,
                "password is a required field",
            );
        }
    };

    let job_id = api.store().create_job(password);
    Response::text(&job_id.to_string())
}

/// Handler para `GET /hash/{id}`
///
/// Bloquea el thread de la conexión hasta que el digest exista, mirando
/// cada `POLL_INTERVAL`. No hay timeout: el cálculo termina siempre tras el
/// retardo fijo del almacén.
pub fn get_hash_handler(api: &HasherApi, req: &Request) -> Response {
    let started = Instant::now();

    let job_id = match parse_job_id(req.path()) {
        Some(id) => id,
        None => {
            return Response::error(
                StatusCode::UnprocessableEntity,
                "jobID was an incorrect format",
            );
        }
    };

    let digest = loop {
        match api.store().get_result(job_id) {
            Ok(HashResult::Ready(digest)) => break digest,
            Ok(HashResult::Pending) => thread::sleep(POLL_INTERVAL),
            Err(JobError::NotFound(_)) => {
                return Response::error(StatusCode::UnprocessableEntity, "JobID is not a valid ID");
            }
        }
    };

    let waited = started.elapsed();
    api.latencies().record(waited);
    debug!(job_id, waited_ms = waited.as_millis() as u64, "hash delivered");

    Response::text(&digest)
}

/// Handler para `GET /stats`
///
/// # Ejemplo de response
/// ```json
/// {"total":3,"average":5012}
/// ```
pub fn stats_handler(api: &HasherApi, _req: &Request) -> Response {
    let stats = Stats {
        total: api.store().job_count(),
        average: api.latencies().average_millis(api.average_mode()),
    };

    match serde_json::to_string(&stats) {
        Ok(body) => Response::json(&body),
        Err(e) => {
            error!(error = %e, "could not serialize stats");
            Response::error(
                StatusCode::InternalServerError,
                "Could not marshal stats to json",
            )
        }
    }
}

/// Extrae el id de `/hash/{id}`; solo dígitos decimales
fn parse_job_id(path: &str) -> Option<JobId> {
    let raw = path.strip_prefix(HASH_ID_PREFIX)?;

    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    raw.parse().ok()
}
