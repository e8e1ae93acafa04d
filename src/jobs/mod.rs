//! # Sistema de Jobs
//!
//! Jobs de hashing en memoria: cada `POST /hash` crea un job, su digest se
//! calcula en un thread propio y queda disponible por id.
//!
//! - `digest`: `base64(SHA-512(password))`
//! - `store`: ids, resultados y lanzamiento de los cálculos
//! - `tracker`: cuenta los cálculos en vuelo para el apagado ordenado

pub mod digest;
pub mod store;
pub mod tracker;

pub use store::{HashResult, JobError, JobId, JobStore, DEFAULT_WORK_DELAY};
pub use tracker::{JobGuard, JobTracker};
