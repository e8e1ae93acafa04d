//! # Prueba de Carga
//! src/loadtest.rs
//!
//! Genera carga contra un `hashersrv` en marcha y verifica cada digest:
//!
//! 1. N threads crean jobs (`password=angryMonkey{i}`) tras una espera
//!    aleatoria.
//! 2. Cuando hay al menos `min(2, N)` jobs creados, N threads piden el hash
//!    de un job al azar y lo comparan con el digest calculado localmente.
//! 3. Al final se consulta `/stats`.
//!
//! Todo el estado vive en el `LoadTest`; no hay variables globales.

use crate::api::Stats;
use crate::client::HasherClient;
use crate::jobs::digest::hash_password;
use crate::jobs::JobId;
use rand::seq::SliceRandom;
use rand::Rng;
use std::ops::RangeInclusive;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

/// Parámetros de la prueba
#[derive(Debug, Clone)]
pub struct LoadTestOptions {
    /// Número de jobs a crear (y de lecturas a hacer)
    pub requests: usize,

    /// Espera antes de cada creación, en milisegundos
    pub create_delay_ms: RangeInclusive<u64>,

    /// Espera antes de cada lectura, en milisegundos
    pub lookup_delay_ms: RangeInclusive<u64>,
}

impl Default for LoadTestOptions {
    fn default() -> Self {
        Self {
            requests: 10,
            create_delay_ms: 1_000..=9_000,
            lookup_delay_ms: 200..=699,
        }
    }
}

/// Resultado de una prueba
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadTestReport {
    /// Jobs creados con éxito
    pub created: usize,

    /// Lecturas cuyo digest coincidió
    pub verified: usize,

    /// Lecturas con un digest distinto del esperado
    pub mismatches: usize,

    /// Requests que fallaron (conexión, status, formato)
    pub failures: usize,

    /// Respuesta de `/stats` al final
    pub stats: Option<Stats>,
}

impl LoadTestReport {
    pub fn is_success(&self) -> bool {
        self.mismatches == 0 && self.failures == 0 && self.stats.is_some()
    }
}

/// Estado compartido entre los threads de la prueba
#[derive(Default)]
struct Ledger {
    /// Jobs creados: id → password usado
    jobs: Vec<(JobId, String)>,

    /// Intentos de creación terminados (con éxito o no)
    creates_done: usize,

    report: LoadTestReport,
}

/// Prueba de carga contra un servidor
pub struct LoadTest {
    client: HasherClient,
    options: LoadTestOptions,
    ledger: Mutex<Ledger>,
    changed: Condvar,
}

impl LoadTest {
    pub fn new(client: HasherClient, options: LoadTestOptions) -> Self {
        Self {
            client,
            options,
            ledger: Mutex::new(Ledger::default()),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ejecuta la prueba completa y retorna el reporte
    pub fn run(&self) -> LoadTestReport {
        let requests = self.options.requests;
        info!(address = self.client.address(), requests, "running load test");

        thread::scope(|scope| {
            for i in 0..requests {
                scope.spawn(move || self.create_one(i));
            }

            if !self.wait_for_first_jobs(requests.min(2)) {
                warn!("no job could be created, skipping hash lookups");
                return;
            }

            for _ in 0..requests {
                scope.spawn(|| self.lookup_one());
            }
        });

        let stats = match self.client.stats() {
            Ok(stats) => {
                info!(total = stats.total, average_ms = stats.average, "stats response");
                Some(stats)
            }
            Err(e) => {
                error!(error = %e, "stats request failed");
                self.lock().report.failures += 1;
                None
            }
        };

        let mut report = self.lock().report.clone();
        report.stats = stats;
        report
    }

    /// Espera hasta tener `wanted` jobs; `false` si no queda ninguno por crear y no hay jobs
    fn wait_for_first_jobs(&self, wanted: usize) -> bool {
        let requests = self.options.requests;
        let mut ledger = self.lock();

        while ledger.jobs.len() < wanted && ledger.creates_done < requests {
            ledger = self
                .changed
                .wait(ledger)
                .unwrap_or_else(PoisonError::into_inner);
        }

        !ledger.jobs.is_empty()
    }

    fn create_one(&self, index: usize) {
        sleep_random(&self.options.create_delay_ms);

        let password = format!("angryMonkey{}", index);
        let result = self.client.create_hash(&password);

        let mut ledger = self.lock();
        match result {
            Ok(job_id) => {
                info!(job_id, "job response");
                ledger.jobs.push((job_id, password));
                ledger.report.created += 1;
            }
            Err(e) => {
                error!(error = %e, password = %password, "hash request failed");
                ledger.report.failures += 1;
            }
        }
        ledger.creates_done += 1;
        self.changed.notify_all();
    }

    fn lookup_one(&self) {
        sleep_random(&self.options.lookup_delay_ms);

        let picked = self.lock().jobs.choose(&mut rand::thread_rng()).cloned();
        let Some((job_id, password)) = picked else {
            return;
        };

        info!(job_id, "requesting job");
        let result = self.client.get_hash(job_id);

        let mut ledger = self.lock();
        match result {
            Ok(digest) if digest == hash_password(&password) => {
                info!(job_id, "password hash check passed");
                ledger.report.verified += 1;
            }
            Ok(digest) => {
                error!(job_id, digest = %digest, "password hash didn't match");
                ledger.report.mismatches += 1;
            }
            Err(e) => {
                error!(job_id, error = %e, "hash lookup failed");
                ledger.report.failures += 1;
            }
        }
    }
}

fn sleep_random(range_ms: &RangeInclusive<u64>) {
    if range_ms.is_empty() {
        return;
    }
    let millis = rand::thread_rng().gen_range(range_ms.clone());
    thread::sleep(Duration::from_millis(millis));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::HasherApi;
    use crate::jobs::JobStore;
    use crate::server::Server;

    fn quick_options(requests: usize) -> LoadTestOptions {
        LoadTestOptions {
            requests,
            create_delay_ms: 0..=30,
            lookup_delay_ms: 0..=30,
        }
    }

    fn spawn_server() -> crate::server::ServerHandle {
        let api = HasherApi::new(JobStore::with_work_delay(Duration::from_millis(50)));
        Server::bind_with_api("127.0.0.1:0", api).unwrap().spawn().unwrap()
    }

    #[test]
    fn test_default_options() {
        let options = LoadTestOptions::default();
        assert_eq!(options.requests, 10);
        assert_eq!(options.create_delay_ms, 1_000..=9_000);
        assert_eq!(options.lookup_delay_ms, 200..=699);
    }

    #[test]
    fn test_report_success() {
        let mut report = LoadTestReport::default();
        assert!(!report.is_success());

        report.stats = Some(Stats { total: 1, average: 0 });
        assert!(report.is_success());

        report.mismatches = 1;
        assert!(!report.is_success());
    }

    #[test]
    fn test_run_against_server() {
        let server = spawn_server();
        let client = HasherClient::new(&server.local_addr().to_string());

        let report = LoadTest::new(client, quick_options(5)).run();

        assert_eq!(report.created, 5);
        assert_eq!(report.verified, 5);
        assert_eq!(report.mismatches, 0);
        assert_eq!(report.failures, 0);
        assert_eq!(report.stats.map(|s| s.total), Some(5));
        assert!(report.is_success());
    }

    #[test]
    fn test_single_request() {
        let server = spawn_server();
        let client = HasherClient::new(&server.local_addr().to_string());

        let report = LoadTest::new(client, quick_options(1)).run();

        assert_eq!(report.created, 1);
        assert_eq!(report.verified, 1);
    }

    #[test]
    fn test_draining_server_reports_failures() {
        let server = spawn_server();
        server.api().begin_shutdown();
        let client = HasherClient::new(&server.local_addr().to_string());

        let report = LoadTest::new(client, quick_options(3)).run();

        assert_eq!(report.created, 0);
        assert_eq!(report.verified, 0);
        // 3 creaciones + /stats
        assert_eq!(report.failures, 4);
        assert!(!report.is_success());
    }
}
