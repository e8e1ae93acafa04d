//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Servidor TCP que atiende cada conexión en su propio thread. Un
//! `GET /hash/{id}` pendiente ocupa su thread durante toda la espera.
//!
//! El loop de accept no se detiene al apagar: después de
//! `begin_shutdown` las conexiones se siguen aceptando pero el router
//! responde 423 a todo.

use crate::api::HasherApi;
use crate::config::Config;
use crate::http::request::find_header_end;
use crate::http::{Request, Response, StatusCode};
use crate::jobs::JobStore;
use crate::metrics::LatencyLog;
use crate::router::Router;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Tamaño máximo aceptado para un request (cabecera + body)
pub const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// Servidor HTTP/1.0 del hasher, ya enlazado a su puerto
pub struct Server {
    listener: TcpListener,
    api: Arc<HasherApi>,
    router: Arc<Router<HasherApi>>,
    request_ids: Arc<AtomicU64>,
}

/// Servidor corriendo en un thread de fondo
pub struct ServerHandle {
    addr: SocketAddr,
    api: Arc<HasherApi>,
    _accept_thread: JoinHandle<()>,
}

impl Server {
    /// Enlaza el servidor según la configuración, con el retardo de hash normal
    pub fn bind(config: &Config) -> io::Result<Self> {
        let api = HasherApi::new(JobStore::new())
            .with_average_mode(config.stats_average)
            .with_latency_log(LatencyLog::with_capacity(config.latency_log_capacity));

        Self::bind_with_api(&config.address(), api)
    }

    /// Enlaza el servidor sobre una API ya construida
    pub fn bind_with_api(address: &str, api: HasherApi) -> io::Result<Self> {
        let listener = TcpListener::bind(address)?;
        let router = api.router();

        Ok(Self {
            listener,
            api: Arc::new(api),
            router: Arc::new(router),
            request_ids: Arc::new(AtomicU64::new(1)),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn api(&self) -> Arc<HasherApi> {
        Arc::clone(&self.api)
    }

    /// Loop de accept en el thread actual; solo retorna si falla el listener
    pub fn run(&self) -> io::Result<()> {
        info!(address = %self.local_addr()?, "hasher API accepting connections");

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => self.dispatch(stream),
                Err(e) => warn!(error = %e, "failed to accept connection"),
            }
        }

        Ok(())
    }

    /// Lanza `run` en un thread de fondo
    pub fn spawn(self) -> io::Result<ServerHandle> {
        let addr = self.local_addr()?;
        let api = self.api();

        let accept_thread = thread::Builder::new()
            .name("http-accept".to_string())
            .spawn(move || {
                if let Err(e) = self.run() {
                    error!(error = %e, "accept loop stopped");
                }
            })?;

        Ok(ServerHandle {
            addr,
            api,
            _accept_thread: accept_thread,
        })
    }

    fn dispatch(&self, stream: TcpStream) {
        let router = Arc::clone(&self.router);
        let api = Arc::clone(&self.api);
        let request_id = self.request_ids.fetch_add(1, Ordering::Relaxed);

        let spawned = thread::Builder::new()
            .name(format!("conn-{}", request_id))
            .spawn(move || {
                if let Err(e) = handle_connection(stream, &router, &api, request_id) {
                    warn!(request_id, error = %e, "connection error");
                }
            });

        if let Err(e) = spawned {
            error!(request_id, error = %e, "could not spawn connection thread");
        }
    }
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn api(&self) -> &HasherApi {
        &self.api
    }

    /// Cierra el gate y espera a que terminen los hashes aceptados
    pub fn shutdown(&self) {
        self.api.begin_shutdown();
        self.api.wait_for_jobs();
    }
}

/// Atiende una conexión: lee, enruta, responde y registra el request
fn handle_connection(
    mut stream: TcpStream,
    router: &Router<HasherApi>,
    api: &HasherApi,
    request_id: u64,
) -> io::Result<()> {
    let start = Instant::now();

    let raw = match read_request(&mut stream)? {
        ReadOutcome::Closed => {
            debug!(request_id, "connection closed before sending a request");
            return Ok(());
        }
        ReadOutcome::TooLarge => {
            let response = Response::error(StatusCode::BadRequest, "Request too large");
            return write_response(&mut stream, response, request_id);
        }
        ReadOutcome::Request(raw) => raw,
    };

    let (response, method, path) = match Request::parse(&raw) {
        Ok(request) => {
            let response = router.route(api, &request);
            (response, request.method().as_str(), request.path().to_string())
        }
        Err(e) => {
            debug!(request_id, error = %e, "malformed request");
            let response = Response::error(StatusCode::BadRequest, &format!("Invalid: {}", e));
            (response, "-", "-".to_string())
        }
    };

    let status = response.status().as_u16();
    write_response(&mut stream, response, request_id)?;

    info!(
        request_id,
        method,
        path = %path,
        status,
        latency_ms = start.elapsed().as_millis() as u64,
        "request served"
    );

    Ok(())
}

fn write_response(stream: &mut TcpStream, mut response: Response, request_id: u64) -> io::Result<()> {
    response.add_header("X-Request-Id", &format!("{:016x}", request_id));
    stream.write_all(&response.to_bytes())?;
    stream.flush()
}

enum ReadOutcome {
    /// El cliente cerró sin mandar nada
    Closed,

    /// Se superó `MAX_REQUEST_BYTES`
    TooLarge,

    Request(Vec<u8>),
}

/// Lee la cabecera completa y después `Content-Length` bytes de body
///
/// Si el cliente cierra antes, se devuelve lo leído y el parser decide.
fn read_request(stream: &mut TcpStream) -> io::Result<ReadOutcome> {
    let mut buffer = Vec::with_capacity(1024);
    let mut chunk = [0u8; 8192];
    let mut expected_len: Option<usize> = None;

    loop {
        if let Some(total) = expected_len {
            if buffer.len() >= total {
                buffer.truncate(total);
                break;
            }
        }

        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);

        if buffer.len() > MAX_REQUEST_BYTES {
            return Ok(ReadOutcome::TooLarge);
        }

        if expected_len.is_none() {
            if let Some(header_end) = find_header_end(&buffer) {
                let body_len = content_length(&buffer[..header_end]);
                let total = header_end + 4 + body_len;
                if total > MAX_REQUEST_BYTES {
                    return Ok(ReadOutcome::TooLarge);
                }
                expected_len = Some(total);
            }
        }
    }

    if buffer.is_empty() {
        Ok(ReadOutcome::Closed)
    } else {
        Ok(ReadOutcome::Request(buffer))
    }
}

/// Valor de `Content-Length` en una cabecera cruda (0 si falta o es inválido)
fn content_length(head: &[u8]) -> usize {
    String::from_utf8_lossy(head)
        .split("\r\n")
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}
