//! # Contador de Jobs en Vuelo
//! src/jobs/tracker.rs
//!
//! Equivalente a un wait-group: cuenta los hashes que todavía se están
//! calculando para que el apagado pueda esperar a que terminen.
//!
//! El contador se incrementa antes de lanzar el thread del job y se
//! decrementa cuando el `JobGuard` se destruye, sin importar cómo termine
//! el thread.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Contador compartido de computaciones pendientes
#[derive(Clone, Default)]
pub struct JobTracker {
    inner: Arc<TrackerInner>,
}

#[derive(Default)]
struct TrackerInner {
    outstanding: Mutex<usize>,
    idle: Condvar,
}

/// Marca un job como "en vuelo" mientras está vivo
#[must_use = "el job deja de contarse en cuanto se destruye el guard"]
pub struct JobGuard {
    inner: Arc<TrackerInner>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra el inicio de un job
    pub fn begin(&self) -> JobGuard {
        *self.inner.lock() += 1;
        JobGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Número de jobs en vuelo
    pub fn outstanding(&self) -> usize {
        *self.inner.lock()
    }

    /// Bloquea hasta que no queden jobs en vuelo
    pub fn wait_idle(&self) {
        let mut outstanding = self.inner.lock();
        while *outstanding > 0 {
            outstanding = self
                .inner
                .idle
                .wait(outstanding)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl TrackerInner {
    fn lock(&self) -> MutexGuard<'_, usize> {
        // Un contador entero no queda inconsistente por un panic
        self.outstanding.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        let mut outstanding = self.inner.lock();
        *outstanding = outstanding.saturating_sub(1);
        if *outstanding == 0 {
            self.inner.idle.notify_all();
        }
    }
}
