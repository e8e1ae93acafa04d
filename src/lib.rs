//! # Hasher Server
//! src/lib.rs
//!
//! Servicio HTTP/1.0 concurrente que recibe passwords, calcula su hash
//! SHA-512 en segundo plano (con un retardo simulado) y lo entrega por id
//! de job. Reporta latencias y se apaga drenando los jobs pendientes.
//!
//! ## Arquitectura
//!
//! - `http`: Parsing y construcción de mensajes HTTP/1.0
//! - `router`: Rutas por path y método, con gate de apagado
//! - `jobs`: Almacén de jobs, cálculo en segundo plano y contador de drenado
//! - `metrics`: Log de latencias para `/stats`
//! - `api`: Endpoints `/hash`, `/hash/{id}` y `/stats`
//! - `server`: Servidor TCP, un thread por conexión
//! - `config`: Flags y variables de entorno
//! - `logging`: Inicialización de `tracing`
//! - `client` / `loadtest`: Cliente HTTP y prueba de carga (`hashercli`)
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use hasher_server::config::Config;
//! use hasher_server::server::Server;
//!
//! let config = Config::default();
//! let server = Server::bind(&config)?.spawn()?;
//! // ... al recibir la señal de apagado:
//! server.shutdown();
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod http;
pub mod jobs;
pub mod loadtest;
pub mod logging;
pub mod metrics;
pub mod router;
pub mod server;
