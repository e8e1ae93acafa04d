//! # Parsing de Requests HTTP/1.0
//! src/http/request.rs
//!
//! Parser HTTP/1.0 escrito a mano.
//!
//! ## Formato de un Request HTTP/1.0
//!
//! ```text
//! POST /hash HTTP/1.0\r\n
//! Host: localhost:8080\r\n
//! Content-Type: application/x-www-form-urlencoded\r\n
//! Content-Length: 21\r\n
//! \r\n
//! password=angryMonkey0
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD /path?query HTTP/1.0`
//! 2. **Headers**: Pares `Name: Value` (uno por línea)
//! 3. **Empty Line**: `\r\n` que separa headers del body
//! 4. **Body**: Opcional; en POST suele ser un formulario urlencoded

use std::borrow::Cow;
use std::collections::HashMap;
use thiserror::Error;

/// Métodos HTTP reconocidos
///
/// Se reconocen más métodos de los que usa el router para poder responder
/// 405 (y no 400) cuando llega un verbo válido a una ruta que no lo acepta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    PATCH,
    OPTIONS,
}

impl Method {
    /// Parsea un método HTTP desde un string
    ///
    /// # Errores
    ///
    /// Retorna error si el método no es un verbo HTTP conocido
    fn from_str(s: &str) -> Result<Self, ParseError> {
        match s {
            "GET" => Ok(Method::GET),
            "HEAD" => Ok(Method::HEAD),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "DELETE" => Ok(Method::DELETE),
            "PATCH" => Ok(Method::PATCH),
            "OPTIONS" => Ok(Method::OPTIONS),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::PATCH => "PATCH",
            Method::OPTIONS => "OPTIONS",
        }
    }

    /// Indica si el método puede traer un formulario en el body
    fn carries_form(&self) -> bool {
        matches!(self, Method::POST | Method::PUT | Method::PATCH)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Representa un request HTTP/1.0 parseado
#[derive(Debug, Clone)]
pub struct Request {
    /// Método HTTP
    method: Method,

    /// Path de la petición sin query string (ej: "/hash/1")
    path: String,

    /// Query parameters decodificados
    query_params: HashMap<String, String>,

    /// Campos del formulario urlencoded del body
    form_params: HashMap<String, String>,

    /// Headers HTTP tal como llegaron
    headers: HashMap<String, String>,

    /// Versión HTTP ("HTTP/1.0" o "HTTP/1.1")
    version: String,

    /// Body crudo del request
    body: Vec<u8>,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Formato inválido de la request line
    #[error("Invalid request line format")]
    InvalidRequestLine,

    /// Método HTTP desconocido
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// Versión HTTP incorrecta
    #[error("Invalid HTTP version: {0}")]
    InvalidHttpVersion(String),

    /// Header malformado
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Request vacío
    #[error("Empty request")]
    EmptyRequest,
}

impl Request {
    /// Parsea un request HTTP/1.0 desde bytes
    ///
    /// El buffer debe contener la cabecera completa; todo lo que sigue a la
    /// línea vacía se toma como body.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use hasher_server::http::Request;
    ///
    /// let raw = b"POST /hash HTTP/1.0\r\nContent-Length: 16\r\n\r\npassword=secreto";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.path(), "/hash");
    /// assert_eq!(request.form_value("password"), Some("secreto"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        let (head, body) = match find_header_end(buffer) {
            Some(end) => (&buffer[..end], &buffer[end + 4..]),
            None => (buffer, &[][..]),
        };

        // La cabecera tiene que ser UTF-8 válido; el body no
        let head = std::str::from_utf8(head).map_err(|_| ParseError::InvalidRequestLine)?;

        if head.trim().is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        let mut lines = head.split("\r\n");
        // `split` siempre produce al menos un elemento
        let request_line = lines.next().unwrap_or_default();

        let (method, path, query_params, version) = Self::parse_request_line(request_line)?;
        let headers = Self::parse_headers(lines)?;
        let body = Self::limit_body(body, &headers);

        let form_params = if method.carries_form() && Self::is_form(&headers) {
            parse_urlencoded(&String::from_utf8_lossy(&body))
        } else {
            HashMap::new()
        };

        Ok(Request {
            method,
            path,
            query_params,
            form_params,
            headers,
            version,
            body,
        })
    }

    /// Parsea la request line (primera línea del request)
    ///
    /// Formato: `GET /path?query HTTP/1.0`
    fn parse_request_line(
        line: &str,
    ) -> Result<(Method, String, HashMap<String, String>, String), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        // METHOD PATH VERSION
        if parts.len() != 3 {
            return Err(ParseError::InvalidRequestLine);
        }

        let method = Method::from_str(parts[0])?;
        let (path, query_params) = Self::parse_path_and_query(parts[1]);

        let version = parts[2].to_string();
        if version != "HTTP/1.0" && version != "HTTP/1.1" {
            return Err(ParseError::InvalidHttpVersion(version));
        }

        Ok((method, path, query_params, version))
    }

    /// Separa el path de la query string
    ///
    /// Ejemplo: "/hash?password=abc" → ("/hash", {"password": "abc"})
    fn parse_path_and_query(target: &str) -> (String, HashMap<String, String>) {
        match target.split_once('?') {
            Some((path, query)) => (path.to_string(), parse_urlencoded(query)),
            None => (target.to_string(), HashMap::new()),
        }
    }

    /// Parsea los headers HTTP
    ///
    /// Cada header tiene formato: "Name: Value"
    fn parse_headers<'a>(
        lines: impl Iterator<Item = &'a str>,
    ) -> Result<HashMap<String, String>, ParseError> {
        let mut headers = HashMap::new();

        for line in lines {
            if line.trim().is_empty() {
                break;
            }

            match line.split_once(':') {
                Some((name, value)) => {
                    headers.insert(name.trim().to_string(), value.trim().to_string());
                }
                None => return Err(ParseError::InvalidHeader(line.to_string())),
            }
        }

        Ok(headers)
    }

    /// Recorta el body a `Content-Length` si el header viene
    fn limit_body(body: &[u8], headers: &HashMap<String, String>) -> Vec<u8> {
        let declared = lookup_header(headers, "Content-Length").and_then(|v| v.parse::<usize>().ok());

        match declared {
            Some(len) if len < body.len() => body[..len].to_vec(),
            _ => body.to_vec(),
        }
    }

    /// Un body sin Content-Type se trata como formulario (curl -d, clientes
    /// HTTP/1.0 mínimos); cualquier otro tipo distinto de urlencoded se ignora
    fn is_form(headers: &HashMap<String, String>) -> bool {
        match lookup_header(headers, "Content-Type") {
            Some(ct) => ct
                .split(';')
                .next()
                .map(|mime| mime.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"))
                .unwrap_or(false),
            None => true,
        }
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> Method {
        self.method
    }

    /// Obtiene el path del request
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Obtiene todos los query parameters
    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    /// Obtiene un query parameter específico
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(|s| s.as_str())
    }

    /// Obtiene un campo de formulario
    ///
    /// Busca primero en el body urlencoded y después en la query string.
    ///
    /// # Ejemplo
    /// ```
    /// use hasher_server::http::Request;
    ///
    /// let raw = b"POST /hash?password=query HTTP/1.0\r\n\r\npassword=body";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.form_value("password"), Some("body"));
    /// assert_eq!(request.form_value("missing"), None);
    /// ```
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form_params
            .get(name)
            .or_else(|| self.query_params.get(name))
            .map(|s| s.as_str())
    }

    /// Obtiene todos los headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header específico (sin distinguir mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        lookup_header(&self.headers, name)
    }

    /// Obtiene la versión HTTP
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Obtiene el body del request
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Posición del `\r\n\r\n` que cierra la cabecera
pub(crate) fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n")
}

fn lookup_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Parsea `a=1&b=dos%20palabras` en un HashMap
///
/// Si una clave se repite gana la primera aparición.
fn parse_urlencoded(input: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    for pair in input.split('&') {
        if pair.is_empty() {
            continue;
        }

        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params
            .entry(decode_component(key))
            .or_insert_with(|| decode_component(value));
    }

    params
}

/// Decodifica un componente urlencoded (`+` es espacio, `%XX` es un byte)
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(Cow::Borrowed(s)) => s.to_string(),
        Ok(Cow::Owned(s)) => s,
        // Secuencia %XX que no forma UTF-8: se deja tal cual
        Err(_) => spaced,
    }
}
