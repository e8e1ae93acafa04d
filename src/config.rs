//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración de `hashersrv` con soporte para argumentos CLI y
//! variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./hashersrv --port 8080 --host 0.0.0.0 --stats-average legacy
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HASHER_PORT=8080 HASHER_LOG_LEVEL=debug ./hashersrv
//! ```
//!
//! `RUST_LOG` no se lee aquí: lo consume directamente el filtro de logging
//! y, si está definido, tiene prioridad sobre `--log-level`.

use crate::metrics::AverageMode;
use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errores de validación de la configuración
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Host must not be empty")]
    EmptyHost,

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}

/// Configuración del servicio de hashing
#[derive(Debug, Clone, Parser)]
#[command(name = "hashersrv")]
#[command(about = "Servicio HTTP/1.0 que calcula hashes SHA-512 de passwords en segundo plano")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor (0 = puerto libre cualquiera)
    #[arg(short, long, default_value = "8080", env = "HASHER_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HASHER_HOST")]
    pub host: String,

    /// Nivel de log o directivas de filtro (ej: `debug`, `hasher_server=trace`)
    #[arg(long = "log-level", default_value = "info", env = "HASHER_LOG_LEVEL")]
    pub log_level: String,

    // === Stats ===
    /// Cómo se promedian las latencias en /stats
    #[arg(long = "stats-average", value_enum, default_value = "samples", env = "HASHER_STATS_AVERAGE")]
    pub stats_average: AverageMode,

    /// Máximo de latencias guardadas para /stats (0 = sin límite)
    #[arg(long = "latency-log-capacity", default_value = "0", env = "HASHER_LATENCY_LOG_CAPACITY")]
    pub latency_log_capacity: usize,
}

impl Config {
    /// Crea la configuración parseando argumentos CLI y entorno
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use hasher_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }

        if EnvFilter::try_new(&self.log_level).is_err() {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }

        Ok(())
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            stats_average: AverageMode::Samples,
            latency_log_capacity: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.stats_average, AverageMode::Samples);
        assert_eq!(config.latency_log_capacity, 0);
    }

    #[test]
    fn test_address_custom() {
        let mut config = Config::default();
        config.host = "0.0.0.0".to_string();
        config.port = 3000;
        assert_eq!(config.address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_validate_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_host() {
        let mut config = Config::default();
        config.host = "  ".to_string();
        assert_eq!(config.validate(), Err(ConfigError::EmptyHost));
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = Config::default();
        config.log_level = "DEBUG".to_string();
        assert!(config.validate().is_ok());

        config.log_level = "hasher_server=loud".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_validate_accepts_filter_directives() {
        let config = Config::try_parse_from([
            "hashersrv",
            "--log-level",
            "hasher_server=debug,warn",
        ])
        .unwrap();

        assert_eq!(config.log_level, "hasher_server=debug,warn");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rust_log_directives_do_not_reach_log_level() {
        std::env::set_var("RUST_LOG", "hasher_server=debug");

        let config = Config::try_parse_from(["hashersrv"]).unwrap();

        assert_ne!(config.log_level, "hasher_server=debug");
        assert!(config.validate().is_ok());
    }

    // ==================== CLI ====================

    #[test]
    fn test_parse_flags() {
        let config = Config::try_parse_from([
            "hashersrv",
            "--port",
            "9000",
            "--host",
            "0.0.0.0",
            "--stats-average",
            "legacy",
            "--latency-log-capacity",
            "100",
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.stats_average, AverageMode::Legacy);
        assert_eq!(config.latency_log_capacity, 100);
    }

    #[test]
    fn test_parse_rejects_unknown_average_mode() {
        let result = Config::try_parse_from(["hashersrv", "--stats-average", "median"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_invalid_port() {
        let result = Config::try_parse_from(["hashersrv", "--port", "70000"]);
        assert!(result.is_err());
    }
}
