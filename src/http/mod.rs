//! # Módulo HTTP
//!
//! Implementación mínima de HTTP/1.0 sobre la que corre el servicio:
//!
//! - Parsing de requests (request line, headers, query string y
//!   formularios `application/x-www-form-urlencoded`)
//! - Construcción de responses
//! - Códigos de estado
//!
//! ### Formato de Request
//!
//! ```text
//! POST /hash HTTP/1.0\r\n
//! Content-Length: 21\r\n
//! \r\n
//! password=angryMonkey0
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Length: 1\r\n
//! \r\n
//! 1
//! ```

pub mod request;
pub mod response;
pub mod status;

pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
