//! HTTP server components.
use std::fmt;
use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use log::error;

use crate::cache::{CacheRegistry, DEFAULT_CACHE_ID};
use crate::router::Routes;

pub mod stream;
pub mod tcp;

pub use stream::StreamServer;
pub use tcp::TcpServer;

#[derive(Debug)]
pub struct ServerError {
    message: String,
}

impl ServerError {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "server error: {}", &self.message)
    }
}

impl From<io::Error> for ServerError {
    fn from(err: io::Error) -> Self {
        ServerError::new(&format!("IOError({})", err))
    }
}

pub trait Server {
    /// Serve one request, must be implemented.
    fn serve_one(&mut self) -> Result<(), ServerError>;
    /// Whether the serving loop should exit before the next request.
    fn should_stop(&self) -> bool {
        false
    }
    /// Serve requests until told to stop (default implementation).
    fn serve_forever(&mut self) {
        while !self.should_stop() {
            match self.serve_one() {
                Ok(()) => (),
                Err(e) => error!("{}", e),
            }
        }
    }
}

/// Options for [`serve`]. TLS is intentionally not offered; front this
/// server with a terminating proxy if transport security is needed.
pub struct ServeOptions {
    pub host: String,
    pub port: u16,
    /// 0 or 1 handles requests on the accepting thread, more creates a pool.
    pub n_threads: usize,
    pub timeout: Option<Duration>,
    /// Response cache capacity; None disables response caching.
    pub cache_capacity: Option<usize>,
    pub cache_id: String,
    /// Registry the response cache is opened from. When None, `serve` uses
    /// a registry of its own, private to that server.
    pub registry: Option<Arc<CacheRegistry>>,
    /// Set to true to stop accepting new connections. In-flight requests
    /// run to completion.
    pub shutdown: Option<Arc<AtomicBool>>,
    pub on_listen: Option<Box<dyn FnOnce(&str)>>,
    pub on_error: Option<Box<dyn Fn(&ServerError) + Send + Sync>>,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            n_threads: 4,
            timeout: Some(Duration::from_secs(10)),
            cache_capacity: None,
            cache_id: DEFAULT_CACHE_ID.to_string(),
            registry: None,
            shutdown: None,
            on_listen: None,
            on_error: None,
        }
    }
}

impl ServeOptions {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
    pub fn with_threads(mut self, n_threads: usize) -> Self {
        self.n_threads = n_threads;
        self
    }
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
    pub fn with_cache(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }
    pub fn with_cache_id(mut self, id: &str) -> Self {
        self.cache_id = id.to_string();
        self
    }
    pub fn with_registry(mut self, registry: Arc<CacheRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }
    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }
    pub fn with_on_listen<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&str) + 'static,
    {
        self.on_listen = Some(Box::new(f));
        self
    }
    pub fn with_on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&ServerError) + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(f));
        self
    }
}

/// Serve `routes` over TCP until shut down.
///
/// The route table's built-in `"404"` entry (or the caller's replacement)
/// handles unmatched paths. When a cache capacity is configured the
/// response cache is opened through the supplied registry, so several
/// servers sharing a registry and id share one cache.
pub fn serve(routes: Routes, options: ServeOptions) -> Result<(), ServerError> {
    let registry = options
        .registry
        .clone()
        .unwrap_or_else(|| Arc::new(CacheRegistry::new()));
    let cache = options
        .cache_capacity
        .map(|capacity| registry.open(capacity, &options.cache_id));

    let bind_addr = format!("{}:{}", options.host, options.port);
    let mut server = TcpServer::new(
        &bind_addr,
        options.n_threads,
        options.timeout,
        routes,
        cache,
    )?;
    if let Some(flag) = options.shutdown {
        server.set_shutdown(flag);
    }
    if let Some(on_error) = options.on_error {
        server.set_on_error(on_error);
    }
    if let Some(on_listen) = options.on_listen {
        on_listen(&bind_addr);
    }
    server.serve_forever();
    Ok(())
}
