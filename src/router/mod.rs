//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Mapea (path, método) a handlers.
//!
//! ```text
//! Request → Router → [gate] → [método] → Handler → Response
//! ```
//!
//! Orden de las comprobaciones para una ruta registrada:
//! 1. Si el `ShutdownGate` está cerrado → 423, sin mirar nada más.
//! 2. Si ninguna ruta del path acepta el método → 405.
//! 3. Se ejecuta el handler.
//!
//! Un path que no coincide con ninguna ruta → 404 (no pasa por el gate).

use crate::api::ShutdownGate;
use crate::http::{Method, Request, Response, StatusCode};

/// Un handler recibe el estado compartido y el request
pub type Handler<S> = fn(&S, &Request) -> Response;

/// Cómo compara una ruta contra el path del request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// El path tiene que ser idéntico (ej: "/stats")
    Exact(String),

    /// El path empieza por este prefijo (ej: "/hash/" para "/hash/{id}")
    Prefix(String),
}

impl PathPattern {
    fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(p) => p == path,
            PathPattern::Prefix(p) => path.starts_with(p.as_str()),
        }
    }

    /// Las rutas exactas ganan; entre prefijos gana el más largo
    fn specificity(&self) -> usize {
        match self {
            PathPattern::Exact(_) => usize::MAX,
            PathPattern::Prefix(p) => p.len(),
        }
    }
}

struct Route<S> {
    pattern: PathPattern,
    method: Method,
    handler: Handler<S>,
}

/// Router que mapea paths a handlers sobre un estado `S`
pub struct Router<S> {
    routes: Vec<Route<S>>,
    gate: Option<ShutdownGate>,
}

impl<S> Router<S> {
    /// Crea un router vacío
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            gate: None,
        }
    }

    /// Todas las rutas registradas quedan detrás de este gate
    pub fn with_gate(mut self, gate: ShutdownGate) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Registra una ruta de path exacto
    ///
    /// # Ejemplo
    /// ```
    /// use hasher_server::http::{Method, Request, Response};
    /// use hasher_server::router::Router;
    ///
    /// fn hello(_state: &(), _req: &Request) -> Response {
    ///     Response::text("hello")
    /// }
    ///
    /// let mut router = Router::new();
    /// router.register("/hello", Method::GET, hello);
    ///
    /// let request = Request::parse(b"GET /hello HTTP/1.0\r\n\r\n").unwrap();
    /// assert_eq!(router.route(&(), &request).body(), b"hello");
    /// ```
    pub fn register(&mut self, path: &str, method: Method, handler: Handler<S>) {
        self.add(PathPattern::Exact(path.to_string()), method, handler);
    }

    /// Registra una ruta por prefijo (el resto del path lo interpreta el handler)
    pub fn register_prefix(&mut self, prefix: &str, method: Method, handler: Handler<S>) {
        self.add(PathPattern::Prefix(prefix.to_string()), method, handler);
    }

    fn add(&mut self, pattern: PathPattern, method: Method, handler: Handler<S>) {
        self.routes.push(Route {
            pattern,
            method,
            handler,
        });
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    pub fn route(&self, state: &S, request: &Request) -> Response {
        let path = request.path();

        let best = self
            .routes
            .iter()
            .filter(|r| r.pattern.matches(path))
            .map(|r| r.pattern.specificity())
            .max();

        let mut response = match best {
            None => Response::error(StatusCode::NotFound, &format!("Route not found: {}", path)),
            Some(specificity) => {
                let candidates: Vec<&Route<S>> = self
                    .routes
                    .iter()
                    .filter(|r| r.pattern.matches(path) && r.pattern.specificity() == specificity)
                    .collect();

                self.dispatch(state, request, &candidates)
            }
        };

        Self::add_common_headers(&mut response);
        response
    }

    fn dispatch(&self, state: &S, request: &Request, candidates: &[&Route<S>]) -> Response {
        if self.gate.as_ref().is_some_and(ShutdownGate::is_closed) {
            return Response::error(StatusCode::Locked, "Not accepting new connections");
        }

        match candidates.iter().find(|r| r.method == request.method()) {
            Some(route) => (route.handler)(state, request),
            None => {
                let allowed: Vec<&str> = candidates.iter().map(|r| r.method.as_str()).collect();
                let allowed = allowed.join(", ");

                Response::error(
                    StatusCode::MethodNotAllowed,
                    &format!("This endpoint only supports {} requests", allowed),
                )
                .with_header("Allow", &allowed)
            }
        }
    }

    /// Headers comunes a todas las respuestas
    fn add_common_headers(response: &mut Response) {
        response.add_header("Server", "hashersrv/0.1");
        response.add_header("Connection", "close");
    }
}

impl<S> Default for Router<S> {
    fn default() -> Self {
        Self::new()
    }
}
