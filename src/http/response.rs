//! # Construcción de Respuestas HTTP
//!
//! API para construir respuestas HTTP/1.0 y convertirlas a bytes.
//!
//! ## Formato de una respuesta HTTP/1.0
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Type: text/plain; charset=utf-8\r\n
//! Content-Length: 1\r\n
//! \r\n
//! 1
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use hasher_server::http::{Response, StatusCode};
//!
//! let response = Response::text("42");
//! assert_eq!(response.status(), StatusCode::Ok);
//!
//! let bytes = response.to_bytes();
//! assert!(bytes.ends_with(b"\r\n\r\n42"));
//! ```

use super::StatusCode;
use std::collections::HashMap;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Representa una respuesta HTTP/1.0 completa
#[derive(Debug, Clone)]
pub struct Response {
    /// Código de estado HTTP
    status: StatusCode,

    /// Headers HTTP; el HashMap evita duplicados
    headers: HashMap<String, String>,

    /// Cuerpo de la respuesta (puede ser vacío)
    body: Vec<u8>,
}

impl Response {
    /// Crea una respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Agrega un header a la respuesta; si ya existe se sobrescribe
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega un header a una respuesta existente (versión mutable)
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Establece el cuerpo y calcula `Content-Length`
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.as_bytes().to_vec();
        self.headers
            .insert("Content-Length".to_string(), self.body.len().to_string());
        self
    }

    /// Respuesta 200 OK con cuerpo de texto plano
    ///
    /// Se usa para el job id de `/hash` y el digest de `/hash/{id}`.
    pub fn text(body: &str) -> Self {
        Self::new(StatusCode::Ok)
            .with_header("Content-Type", TEXT_PLAIN)
            .with_body(body)
    }

    /// Respuesta 200 OK con cuerpo JSON
    pub fn json(body: &str) -> Self {
        Self::new(StatusCode::Ok)
            .with_header("Content-Type", "application/json")
            .with_body(body)
    }

    /// Respuesta de error con un mensaje legible en texto plano
    ///
    /// # Ejemplo
    /// ```
    /// use hasher_server::http::{Response, StatusCode};
    ///
    /// let response = Response::error(StatusCode::UnprocessableEntity, "password is a required field");
    /// assert_eq!(response.body(), b"password is a required field\n");
    /// ```
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::new(status)
            .with_header("Content-Type", TEXT_PLAIN)
            .with_header("X-Content-Type-Options", "nosniff")
            .with_body(&format!("{}\n", message))
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    ///
    /// - Status line: `HTTP/1.0 200 OK\r\n`
    /// - Headers: `Header-Name: Value\r\n`
    /// - Línea vacía: `\r\n`
    /// - Body
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(128 + self.body.len());

        result.extend_from_slice(format!("HTTP/1.0 {}\r\n", self.status).as_bytes());

        for (name, value) in &self.headers {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);

        result
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene una referencia a los headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene una referencia al body
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body como texto (lossy); útil para logs y tests
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_response() {
        let response = Response::new(StatusCode::Ok);
        assert_eq!(response.status(), StatusCode::Ok);
        assert!(response.headers().is_empty());
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_with_header_overwrites() {
        let response = Response::new(StatusCode::Ok)
            .with_header("X-Custom", "one")
            .with_header("X-Custom", "two");

        assert_eq!(response.headers().get("X-Custom"), Some(&"two".to_string()));
        assert_eq!(response.headers().len(), 1);
    }

    #[test]
    fn test_text_response() {
        let response = Response::text("1");

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.headers().get("Content-Type"), Some(&TEXT_PLAIN.to_string()));
        assert_eq!(response.headers().get("Content-Length"), Some(&"1".to_string()));
        assert_eq!(response.body(), b"1");
    }

    #[test]
    fn test_json_response() {
        let response = Response::json(r#"{"total":1,"average":0}"#);

        assert_eq!(response.headers().get("Content-Type"), Some(&"application/json".to_string()));
        assert_eq!(response.body_text(), r#"{"total":1,"average":0}"#);
    }

    #[test]
    fn test_error_response() {
        let response = Response::error(StatusCode::Locked, "Not accepting new connections");

        assert_eq!(response.status(), StatusCode::Locked);
        assert_eq!(response.body_text(), "Not accepting new connections\n");
        assert_eq!(response.headers().get("Content-Length"), Some(&"30".to_string()));
    }

    #[test]
    fn test_to_bytes() {
        let response = Response::new(StatusCode::Ok)
            .with_header("Content-Type", "text/plain")
            .with_body("Test");

        let text = String::from_utf8(response.to_bytes()).unwrap();

        assert!(text.starts_with("HTTP/1.0 200 OK\r\n"));
        assert!(text.contains("Content-Type: text/plain\r\n"));
        assert!(text.contains("Content-Length: 4\r\n"));
        assert!(text.ends_with("\r\n\r\nTest"));
    }

    #[test]
    fn test_empty_body_response() {
        let response = Response::new(StatusCode::MethodNotAllowed);
        let text = String::from_utf8(response.to_bytes()).unwrap();

        assert!(text.starts_with("HTTP/1.0 405 Method Not Allowed\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }
}
