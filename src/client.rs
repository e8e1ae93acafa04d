//! # Cliente HTTP del Hasher
//! src/client.rs
//!
//! Cliente HTTP/1.0 mínimo sobre `TcpStream`: una conexión por request,
//! se lee hasta que el servidor cierra. Lo usan `hashercli` y los tests de
//! integración.

use crate::api::Stats;
use crate::http::request::find_header_end;
use crate::http::Method;
use crate::jobs::JobId;
use std::io::{self, Read, Write};
use std::net::TcpStream;
use thiserror::Error;

/// Errores del cliente
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connection error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed HTTP response: {0}")]
    MalformedResponse(String),

    /// El servidor respondió algo distinto de 200
    #[error("unexpected status {status}: {}", .body.trim_end())]
    Status { status: u16, body: String },

    #[error("server returned an invalid job id: {0:?}")]
    InvalidJobId(String),

    #[error("invalid stats payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Respuesta cruda: status y body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    /// Parsea `HTTP/1.x <code> <reason>\r\n...\r\n\r\n<body>`
    fn parse(raw: &[u8]) -> Result<Self, ClientError> {
        let header_end = find_header_end(raw)
            .ok_or_else(|| ClientError::MalformedResponse("missing header terminator".to_string()))?;

        let head = String::from_utf8_lossy(&raw[..header_end]);
        let status_line = head.split("\r\n").next().unwrap_or_default();

        let mut parts = status_line.split_whitespace();
        let status = match (parts.next(), parts.next()) {
            (Some(version), Some(code)) if version.starts_with("HTTP/") => code
                .parse::<u16>()
                .map_err(|_| ClientError::MalformedResponse(status_line.to_string()))?,
            _ => return Err(ClientError::MalformedResponse(status_line.to_string())),
        };

        Ok(Self {
            status,
            body: String::from_utf8_lossy(&raw[header_end + 4..]).into_owned(),
        })
    }

    /// Convierte cualquier status distinto de 200 en error
    fn ok(self) -> Result<String, ClientError> {
        if self.status == 200 {
            Ok(self.body)
        } else {
            Err(ClientError::Status {
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// Cliente del servicio de hashing
#[derive(Debug, Clone)]
pub struct HasherClient {
    addr: String,
}

impl HasherClient {
    /// Acepta `host:port` o una URL `http://host:port`
    ///
    /// # Ejemplo
    /// ```
    /// use hasher_server::client::HasherClient;
    ///
    /// assert_eq!(HasherClient::new("http://localhost:8080/").address(), "localhost:8080");
    /// assert_eq!(HasherClient::new("127.0.0.1:9000").address(), "127.0.0.1:9000");
    /// ```
    pub fn new(addr: &str) -> Self {
        let addr = addr.trim();
        let addr = addr.strip_prefix("http://").unwrap_or(addr);
        Self {
            addr: addr.trim_end_matches('/').to_string(),
        }
    }

    pub fn address(&self) -> &str {
        &self.addr
    }

    /// Envía un request y lee la respuesta completa
    pub fn send(&self, method: Method, path: &str, form: Option<&str>) -> Result<RawResponse, ClientError> {
        let mut stream = TcpStream::connect(&self.addr)?;

        let mut request = format!("{} {} HTTP/1.0\r\nHost: {}\r\n", method, path, self.addr);
        if let Some(body) = form {
            request.push_str("Content-Type: application/x-www-form-urlencoded\r\n");
            request.push_str(&format!("Content-Length: {}\r\n\r\n{}", body.len(), body));
        } else {
            request.push_str("\r\n");
        }

        stream.write_all(request.as_bytes())?;
        stream.flush()?;

        let mut raw = Vec::new();
        stream.read_to_end(&mut raw)?;

        RawResponse::parse(&raw)
    }

    /// `POST /hash`; retorna el id del job
    pub fn create_hash(&self, password: &str) -> Result<JobId, ClientError> {
        let form = format!("password={}", urlencoding::encode(password));
        let body = self.send(Method::POST, "/hash", Some(&form))?.ok()?;

        body.trim()
            .parse()
            .map_err(|_| ClientError::InvalidJobId(body.clone()))
    }

    /// `GET /hash/{id}`; bloquea hasta que el servidor tenga el digest
    pub fn get_hash(&self, job_id: JobId) -> Result<String, ClientError> {
        self.send(Method::GET, &format!("/hash/{}", job_id), None)?.ok()
    }

    /// `GET /stats`
    pub fn stats(&self) -> Result<Stats, ClientError> {
        let body = self.send(Method::GET, "/stats", None)?.ok()?;
        Ok(serde_json::from_str(&body)?)
    }
}
