//! # Gate de Apagado
//! src/api/gate.rs
//!
//! Señal de un solo uso: una vez cerrada, todos los endpoints responden 423
//! y no se vuelve a abrir. Los handlers la consultan sin bloquear.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct ShutdownGate {
    closed: Arc<AtomicBool>,
}

impl ShutdownGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cierra el gate; retorna `true` solo para la llamada que lo cerró
    pub fn close(&self) -> bool {
        !self.closed.swap(true, Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
