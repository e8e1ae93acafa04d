//! # Códigos de Estado HTTP
//!
//! Códigos de estado que devuelve el servicio de hashing.
//!
//! - **2xx**: Éxito (200 OK)
//! - **4xx**: Error del cliente (400, 404, 405, 422, 423)
//! - **5xx**: Error del servidor (500)
//!
//! 422 y 423 no existen en HTTP/1.0 (vienen de WebDAV, RFC 4918), pero
//! los clientes del servicio distinguen con ellos "input inválido" de
//! "servidor drenando".

/// Códigos de estado HTTP que usa el servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK - La petición fue exitosa
    Ok = 200,

    /// 400 Bad Request - Request HTTP malformado
    BadRequest = 400,

    /// 404 Not Found - Ruta no registrada
    NotFound = 404,

    /// 405 Method Not Allowed - La ruta existe pero no acepta ese método
    MethodNotAllowed = 405,

    /// 422 Unprocessable Entity - Falta el password o el job id no es válido
    UnprocessableEntity = 422,

    /// 423 Locked - El servidor está apagándose y no acepta trabajo nuevo
    Locked = 423,

    /// 500 Internal Server Error - Error interno del servidor
    InternalServerError = 500,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use hasher_server::http::StatusCode;
    /// assert_eq!(StatusCode::Locked.as_u16(), 423);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    ///
    /// # Ejemplo
    /// ```
    /// use hasher_server::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::UnprocessableEntity.reason_phrase(), "Unprocessable Entity");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::UnprocessableEntity => "Unprocessable Entity",
            StatusCode::Locked => "Locked",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
