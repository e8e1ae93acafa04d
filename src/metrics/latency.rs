//! # Log de Latencias
//! src/metrics/latency.rs
//!
//! Guarda cuánto esperó cada `GET /hash/{id}` completado, en orden de
//! llegada. Lo alimentan muchos threads de conexión a la vez, así que
//! tiene su propio lock (independiente del lock del almacén de jobs).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Cómo se calcula el promedio de `/stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum AverageMode {
    /// Suma de latencias / número de muestras
    #[default]
    Samples,

    /// Suma de latencias / 2 (divisor fijo histórico)
    Legacy,
}

/// Log append-only de latencias, opcionalmente acotado
#[derive(Clone)]
pub struct LatencyLog {
    samples: Arc<Mutex<VecDeque<Duration>>>,

    /// Máximo de muestras a guardar (0 = sin límite)
    capacity: usize,
}

impl LatencyLog {
    /// Log sin límite
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Log que descarta la muestra más antigua al llegar a `capacity`
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Arc::new(Mutex::new(VecDeque::new())),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Duration>> {
        self.samples.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Agrega una muestra
    pub fn record(&self, latency: Duration) {
        let mut samples = self.lock();

        if self.capacity > 0 && samples.len() >= self.capacity {
            samples.pop_front();
        }
        samples.push_back(latency);
    }

    /// Número de muestras guardadas
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Promedio en milisegundos enteros (truncado)
    ///
    /// # Ejemplo
    /// ```
    /// use hasher_server::metrics::{AverageMode, LatencyLog};
    /// use std::time::Duration;
    ///
    /// let log = LatencyLog::new();
    /// log.record(Duration::from_millis(100));
    /// log.record(Duration::from_millis(300));
    ///
    /// assert_eq!(log.average_millis(AverageMode::Samples), 200);
    /// assert_eq!(log.average_millis(AverageMode::Legacy), 200);
    /// ```
    pub fn average_millis(&self, mode: AverageMode) -> u64 {
        let samples = self.lock();
        let sum_nanos: u128 = samples.iter().map(Duration::as_nanos).sum();

        let divisor = match mode {
            AverageMode::Samples => samples.len() as u128,
            AverageMode::Legacy => 2,
        };

        if divisor == 0 {
            return 0;
        }

        let avg_millis = sum_nanos / divisor / 1_000_000;
        u64::try_from(avg_millis).unwrap_or(u64::MAX)
    }
}

impl Default for LatencyLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_empty_log() {
        let log = LatencyLog::new();

        assert!(log.is_empty());
        assert_eq!(log.average_millis(AverageMode::Samples), 0);
        assert_eq!(log.average_millis(AverageMode::Legacy), 0);
    }

    #[test]
    fn test_average_by_samples() {
        let log = LatencyLog::new();
        log.record(Duration::from_millis(10));
        log.record(Duration::from_millis(20));
        log.record(Duration::from_millis(45));

        assert_eq!(log.len(), 3);
        assert_eq!(log.average_millis(AverageMode::Samples), 25);
    }

    #[test]
    fn test_legacy_average_divides_by_two() {
        let log = LatencyLog::new();
        log.record(Duration::from_millis(10));
        log.record(Duration::from_millis(20));
        log.record(Duration::from_millis(45));

        // 75 / 2 = 37.5 → 37
        assert_eq!(log.average_millis(AverageMode::Legacy), 37);
    }

    #[test]
    fn test_average_truncates_sub_millisecond() {
        let log = LatencyLog::new();
        log.record(Duration::from_micros(1_999));

        assert_eq!(log.average_millis(AverageMode::Samples), 1);
    }

    #[test]
    fn test_unbounded_by_default() {
        let log = LatencyLog::new();
        for i in 0..15_000 {
            log.record(Duration::from_micros(i));
        }

        assert_eq!(log.len(), 15_000);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let log = LatencyLog::with_capacity(2);
        log.record(Duration::from_millis(1));
        log.record(Duration::from_millis(5));
        log.record(Duration::from_millis(9));

        // Quedan 5 y 9
        assert_eq!(log.len(), 2);
        assert_eq!(log.average_millis(AverageMode::Samples), 7);
    }

    #[test]
    fn test_concurrent_appends() {
        let log = LatencyLog::new();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let log = log.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        log.record(Duration::from_millis(1));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(log.len(), 800);
        assert_eq!(log.average_millis(AverageMode::Legacy), 400);
    }
}
