//! # API del Hasher
//! src/api/mod.rs
//!
//! Une el almacén de jobs, el log de latencias y el gate de apagado, y
//! expone las rutas HTTP del servicio.
//!
//! ## Endpoints
//!
//! - `POST /hash` (form `password`) → id del job
//! - `GET /hash/{id}` → digest base64 de SHA-512, cuando esté listo
//! - `GET /stats` → `{"total": N, "average": ms}`
//!
//! ## Apagado
//!
//! `Accepting → Rejecting`, en un solo sentido: `begin_shutdown` cierra el
//! gate (todo request nuevo recibe 423) y `wait_for_jobs` bloquea hasta que
//! terminen los hashes ya aceptados.

pub mod gate;
pub mod handlers;

pub use gate::ShutdownGate;

use crate::http::Method;
use crate::jobs::JobStore;
use crate::metrics::{AverageMode, LatencyLog};
use crate::router::Router;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Payload de `GET /stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Total de jobs creados
    pub total: u64,

    /// Latencia promedio de `GET /hash/{id}` en milisegundos
    pub average: u64,
}

/// Estado compartido por todos los threads de conexión
pub struct HasherApi {
    store: JobStore,
    gate: ShutdownGate,
    latencies: LatencyLog,
    average_mode: AverageMode,
}

impl HasherApi {
    pub fn new(store: JobStore) -> Self {
        Self {
            store,
            gate: ShutdownGate::new(),
            latencies: LatencyLog::new(),
            average_mode: AverageMode::default(),
        }
    }

    pub fn with_average_mode(mut self, mode: AverageMode) -> Self {
        self.average_mode = mode;
        self
    }

    pub fn with_latency_log(mut self, latencies: LatencyLog) -> Self {
        self.latencies = latencies;
        self
    }

    /// Construye el router con las tres rutas detrás del gate
    pub fn router(&self) -> Router<HasherApi> {
        let mut router = Router::new().with_gate(self.gate.clone());

        router.register("/hash", Method::POST, handlers::create_hash_handler);
        router.register_prefix(handlers::HASH_ID_PREFIX, Method::GET, handlers::get_hash_handler);
        router.register("/stats", Method::GET, handlers::stats_handler);

        router
    }

    /// Deja de aceptar requests; las siguientes reciben 423
    pub fn begin_shutdown(&self) {
        if self.gate.close() {
            info!(
                outstanding = self.store.tracker().outstanding(),
                "not accepting new requests, draining hash jobs"
            );
        }
    }

    pub fn is_draining(&self) -> bool {
        self.gate.is_closed()
    }

    /// Bloquea hasta que terminen los hashes en vuelo
    pub fn wait_for_jobs(&self) {
        self.store.wait_for_jobs();
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    pub fn latencies(&self) -> &LatencyLog {
        &self.latencies
    }

    pub fn average_mode(&self) -> AverageMode {
        self.average_mode
    }

    pub fn gate(&self) -> &ShutdownGate {
        &self.gate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Request, StatusCode};
    use std::time::Duration;

    fn request(raw: &str) -> Request {
        Request::parse(raw.as_bytes()).unwrap()
    }

    #[test]
    fn test_router_wires_all_endpoints() {
        let api = HasherApi::new(JobStore::with_work_delay(Duration::from_millis(10)));
        let router = api.router();

        let created = router.route(&api, &request("POST /hash HTTP/1.0\r\n\r\npassword=abc"));
        assert_eq!(created.body_text(), "1");

        let hashed = router.route(&api, &request("GET /hash/1 HTTP/1.0\r\n\r\n"));
        assert_eq!(hashed.status(), StatusCode::Ok);

        let stats = router.route(&api, &request("GET /stats HTTP/1.0\r\n\r\n"));
        assert!(stats.body_text().contains("\"total\":1"));
    }

    #[test]
    fn test_wrong_methods() {
        let api = HasherApi::new(JobStore::new());
        let router = api.router();

        for raw in [
            "GET /hash HTTP/1.0\r\n\r\n",
            "POST /hash/1 HTTP/1.0\r\n\r\n",
            "POST /stats HTTP/1.0\r\n\r\n",
            "PUT /hash HTTP/1.0\r\n\r\n",
        ] {
            let response = router.route(&api, &request(raw));
            assert_eq!(response.status(), StatusCode::MethodNotAllowed, "{}", raw);
        }
    }

    #[test]
    fn test_shutdown_locks_every_endpoint() {
        let api = HasherApi::new(JobStore::with_work_delay(Duration::from_millis(10)));
        let router = api.router();
        router.route(&api, &request("POST /hash HTTP/1.0\r\n\r\npassword=abc"));

        api.begin_shutdown();
        assert!(api.is_draining());

        for raw in [
            "POST /hash HTTP/1.0\r\n\r\npassword=abc",
            "POST /hash HTTP/1.0\r\n\r\n",
            "GET /hash/1 HTTP/1.0\r\n\r\n",
            "GET /hash/nope HTTP/1.0\r\n\r\n",
            "GET /stats HTTP/1.0\r\n\r\n",
        ] {
            let response = router.route(&api, &request(raw));
            assert_eq!(response.status(), StatusCode::Locked, "{}", raw);
        }

        // Lo que ya se aceptó termina igual
        api.wait_for_jobs();
        assert_eq!(api.store().job_count(), 1);
        assert!(matches!(
            api.store().get_result(1),
            Ok(crate::jobs::HashResult::Ready(_))
        ));
    }

    #[test]
    fn test_begin_shutdown_twice() {
        let api = HasherApi::new(JobStore::new());
        api.begin_shutdown();
        api.begin_shutdown();
        assert!(api.gate().is_closed());
    }
}
