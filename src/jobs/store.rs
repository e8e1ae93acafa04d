//! # Almacén de Jobs
//! src/jobs/store.rs
//!
//! Guarda los ids de job y sus hashes en memoria. El contador de ids y el
//! mapa de resultados viven bajo un único `Mutex`: asignar un id y sembrar
//! su entrada pendiente es una sola sección crítica, así que dos llamadas
//! concurrentes nunca reciben el mismo id.
//!
//! Invariante: todo id en `[1, job_count]` tiene entrada en el mapa
//! (pendiente o resuelta); ningún otro id existe.

use crate::jobs::digest::hash_password;
use crate::jobs::tracker::JobTracker;
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Identificador de job (empieza en 1)
pub type JobId = u64;

/// Trabajo simulado que tarda cada hash
pub const DEFAULT_WORK_DELAY: Duration = Duration::from_secs(5);

/// Errores del almacén
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// El id nunca fue asignado
    #[error("job {0} does not exist")]
    NotFound(JobId),
}

/// Estado de un job existente
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashResult {
    /// El hash todavía se está calculando
    Pending,

    /// Digest ya calculado; no cambia más
    Ready(String),
}

/// Estado protegido por el lock
#[derive(Debug, Default)]
struct StoreState {
    /// Último id asignado == total de jobs
    job_count: JobId,

    /// `None` mientras el job está pendiente
    results: HashMap<JobId, Option<String>>,
}

impl StoreState {
    fn allocate(&mut self) -> JobId {
        self.job_count += 1;
        self.results.insert(self.job_count, None);
        self.job_count
    }
}

/// Almacén thread-safe de jobs de hashing
///
/// Clonar el almacén comparte el mismo estado.
#[derive(Clone)]
pub struct JobStore {
    state: Arc<Mutex<StoreState>>,
    tracker: JobTracker,
    work_delay: Duration,
}

impl JobStore {
    /// Crea un almacén vacío con el retardo de trabajo por defecto
    pub fn new() -> Self {
        Self::with_work_delay(DEFAULT_WORK_DELAY)
    }

    /// Crea un almacén con otro retardo simulado (usado en tests)
    pub fn with_work_delay(work_delay: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState::default())),
            tracker: JobTracker::new(),
            work_delay,
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        // Los resultados se escriben una sola vez; un panic no los deja a medias
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Crea un job y lanza su hash en segundo plano
    ///
    /// Retorna el id de inmediato; nunca espera al cálculo.
    ///
    /// # Ejemplo
    /// ```
    /// use hasher_server::jobs::{HashResult, JobStore};
    /// use std::time::Duration;
    ///
    /// let store = JobStore::with_work_delay(Duration::from_millis(10));
    /// let id = store.create_job("angryMonkey0");
    /// assert_eq!(id, 1);
    /// assert_eq!(store.get_result(id), Ok(HashResult::Pending));
    ///
    /// store.wait_for_jobs();
    /// assert!(matches!(store.get_result(id), Ok(HashResult::Ready(_))));
    /// ```
    pub fn create_job(&self, password: &str) -> JobId {
        let job_id = self.lock().allocate();

        self.launch(job_id, password.to_string(), |name, work| {
            thread::Builder::new().name(name).spawn(work).map(drop)
        });

        debug!(job_id, "job created");
        job_id
    }

    /// Lanza el cálculo de `job_id` con `spawn`
    ///
    /// Si no se puede crear el thread (p. ej. sin recursos), el hash se
    /// calcula en el thread actual: el id ya fue entregado y tiene que
    /// resolverse.
    fn launch<F>(&self, job_id: JobId, password: String, spawn: F)
    where
        F: FnOnce(String, Box<dyn FnOnce() + Send + 'static>) -> io::Result<()>,
    {
        // Ambos guards se toman antes del spawn: un apagado que empiece justo
        // después ya ve este job como pendiente, aunque el spawn falle
        let local_guard = self.tracker.begin();
        let worker_guard = self.tracker.begin();

        let store = self.clone();
        let worker_password = password.clone();
        let work = Box::new(move || {
            let _guard = worker_guard;
            store.compute(job_id, &worker_password);
        });

        if let Err(e) = spawn(format!("hash-job-{}", job_id), work) {
            warn!(job_id, error = %e, "could not spawn hash worker, hashing on the request thread");
            self.compute(job_id, &password);
        }

        drop(local_guard);
    }

    /// Cálculo en segundo plano de un job
    fn compute(&self, job_id: JobId, password: &str) {
        info!(job_id, "starting hash");

        let digest = hash_password(password);
        thread::sleep(self.work_delay);

        self.lock().results.insert(job_id, Some(digest));

        info!(job_id, "finished hash");
    }

    /// Consulta el resultado de un job
    pub fn get_result(&self, job_id: JobId) -> Result<HashResult, JobError> {
        let state = self.lock();

        match state.results.get(&job_id) {
            Some(Some(digest)) => Ok(HashResult::Ready(digest.clone())),
            Some(None) => Ok(HashResult::Pending),
            None => Err(JobError::NotFound(job_id)),
        }
    }

    /// Total de jobs creados
    pub fn job_count(&self) -> JobId {
        self.lock().job_count
    }

    /// Contador de hashes en vuelo
    pub fn tracker(&self) -> &JobTracker {
        &self.tracker
    }

    /// Bloquea hasta que terminen todos los hashes lanzados
    pub fn wait_for_jobs(&self) {
        self.tracker.wait_idle();
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Instant;

    fn fast_store() -> JobStore {
        JobStore::with_work_delay(Duration::from_millis(20))
    }

    #[test]
    fn test_ids_start_at_one() {
        let store = fast_store();

        assert_eq!(store.job_count(), 0);
        assert_eq!(store.create_job("a"), 1);
        assert_eq!(store.create_job("b"), 2);
        assert_eq!(store.create_job("c"), 3);
        assert_eq!(store.job_count(), 3);

        store.wait_for_jobs();
    }

    #[test]
    fn test_result_pending_then_ready() {
        let store = JobStore::with_work_delay(Duration::from_millis(100));
        let id = store.create_job("angryMonkey0");

        assert_eq!(store.get_result(id), Ok(HashResult::Pending));

        store.wait_for_jobs();

        assert_eq!(
            store.get_result(id),
            Ok(HashResult::Ready(hash_password("angryMonkey0")))
        );
    }

    #[test]
    fn test_create_does_not_wait_for_hash() {
        let store = JobStore::with_work_delay(Duration::from_secs(2));
        let started = Instant::now();

        store.create_job("slow");

        assert!(started.elapsed() < Duration::from_millis(500));
        assert_eq!(store.tracker().outstanding(), 1);
    }

    #[test]
    fn test_unknown_ids() {
        let store = fast_store();

        assert_eq!(store.get_result(0), Err(JobError::NotFound(0)));
        assert_eq!(store.get_result(999), Err(JobError::NotFound(999)));

        let id = store.create_job("x");
        assert_eq!(store.get_result(id + 1), Err(JobError::NotFound(id + 1)));

        store.wait_for_jobs();
    }

    #[test]
    fn test_concurrent_creation_has_no_gaps_or_duplicates() {
        let store = JobStore::with_work_delay(Duration::from_millis(1));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                thread::spawn(move || {
                    (0..25)
                        .map(|i| store.create_job(&format!("pw-{}-{}", t, i)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(ids.insert(id), "duplicated id {}", id);
            }
        }

        assert_eq!(ids.len(), 200);
        assert_eq!(store.job_count(), 200);
        assert!((1..=200).all(|id| ids.contains(&id)));

        store.wait_for_jobs();
        assert_eq!(store.tracker().outstanding(), 0);
    }

    #[test]
    fn test_each_job_gets_its_own_digest() {
        let store = fast_store();
        let first = store.create_job("one");
        let second = store.create_job("two");

        store.wait_for_jobs();

        assert_eq!(store.get_result(first), Ok(HashResult::Ready(hash_password("one"))));
        assert_eq!(store.get_result(second), Ok(HashResult::Ready(hash_password("two"))));
    }

    #[test]
    fn test_clones_share_state() {
        let store = fast_store();
        let other = store.clone();

        let id = store.create_job("shared");
        assert_eq!(other.job_count(), 1);

        other.wait_for_jobs();
        assert!(matches!(store.get_result(id), Ok(HashResult::Ready(_))));
    }

    #[test]
    fn test_default_work_delay() {
        assert_eq!(DEFAULT_WORK_DELAY, Duration::from_secs(5));
        assert_eq!(JobStore::new().work_delay, DEFAULT_WORK_DELAY);
    }

    #[test]
    fn test_spawn_failure_hashes_on_calling_thread() {
        let store = fast_store();
        let job_id = store.lock().allocate();

        store.launch(job_id, "angryMonkey0".to_string(), |_, _| {
            Err(io::Error::new(io::ErrorKind::WouldBlock, "no threads left"))
        });

        // Resuelto al volver, sin thread propio
        assert_eq!(
            store.get_result(job_id),
            Ok(HashResult::Ready(hash_password("angryMonkey0")))
        );
        assert_eq!(store.tracker().outstanding(), 0);
    }

    #[test]
    fn test_spawned_worker_holds_tracker() {
        let store = JobStore::with_work_delay(Duration::from_millis(100));
        let job_id = store.lock().allocate();

        store.launch(job_id, "x".to_string(), |name, work| {
            assert_eq!(name, format!("hash-job-{}", job_id));
            thread::Builder::new().name(name).spawn(work).map(drop)
        });

        assert_eq!(store.tracker().outstanding(), 1);
        store.wait_for_jobs();
        assert_eq!(store.get_result(job_id), Ok(HashResult::Ready(hash_password("x"))));
    }
}
