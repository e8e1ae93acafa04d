//! # Métricas
//! src/metrics/mod.rs
//!
//! Latencias de `GET /hash/{id}` que agrega el endpoint `/stats`.

pub mod latency;

pub use latency::{AverageMode, LatencyLog};
