//! TCP HTTP server.
use std::io::Write;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};

use crate::cache::ResponseCache;
use crate::handler::ConnInfo;
use crate::request::parser::RequestParser;
use crate::response::Response;
use crate::router::{handle_request, Routes};
use crate::runner::Runner;
use crate::server::{Server, ServerError};
use crate::VERSION;

/// A single or multi-threaded TCP server dispatching requests through a
/// route table.
pub struct TcpServer {
    listener: TcpListener,
    runner: Runner,
    routes: Arc<Routes>,
    cache: Option<Arc<ResponseCache>>,
    timeout: Option<Duration>,
    shutdown: Option<Arc<AtomicBool>>,
    on_error: Option<Box<dyn Fn(&ServerError) + Send + Sync>>,
}

impl TcpServer {
    /// Create a new TCP server
    ///
    /// # Arguments
    /// * `bind_addr`: Address to listen on, such as "0.0.0.0:8080"
    /// * `n_threads`: Number of request handling threads.
    ///   - 0 or 1: handle requests on the accepting thread
    ///   - 2+: threadpool with n threads
    /// * `timeout`: network socket timeout
    /// * `routes`: route table
    /// * `cache`: response cache probed before route matching
    pub fn new(
        bind_addr: &str,
        n_threads: usize,
        timeout: Option<Duration>,
        routes: Routes,
        cache: Option<Arc<ResponseCache>>,
    ) -> Result<Self, std::io::Error> {
        Ok(Self {
            listener: TcpListener::bind(bind_addr)?,
            runner: Runner::new(n_threads),
            routes: Arc::new(routes),
            cache,
            timeout,
            shutdown: None,
            on_error: None,
        })
    }
    /// Address the server is actually bound to (useful with port 0).
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.listener.local_addr()
    }
    /// Stop accepting new connections once `flag` becomes true. In-flight
    /// requests run to completion when the server is dropped.
    pub fn set_shutdown(&mut self, flag: Arc<AtomicBool>) {
        self.shutdown = Some(flag);
    }
    pub fn set_on_error(&mut self, f: Box<dyn Fn(&ServerError) + Send + Sync>) {
        self.on_error = Some(f);
    }
}

/// Runs on the runner's thread: parse, dispatch, write back.
fn handle_connection(
    mut stream: TcpStream,
    addr: SocketAddr,
    routes: &Routes,
    cache: Option<&ResponseCache>,
) {
    let conn = ConnInfo {
        peer_addr: Some(addr),
    };
    let response = match RequestParser::new(&mut stream).parse() {
        Ok(request) => handle_request(&request, &conn, routes, cache),
        Err(e) => {
            error!("{}", e);
            Response::new(400)
        }
    };
    let response = response
        .with_header("Server", &format!("waypoint/{}", VERSION))
        .with_header("Connection", "closed");
    if let Err(e) = stream.write_all(&response.into_bytes()) {
        error!("IO error: {}", e);
    }
}

impl Server for TcpServer {
    /// Accept one connection and hand it to the runner.
    fn serve_one(&mut self) -> Result<(), ServerError> {
        let (stream, addr) = self.listener.accept()?;
        debug!("accepted connection from {:?}", addr);
        stream.set_read_timeout(self.timeout)?;
        stream.set_write_timeout(self.timeout)?;
        let routes = Arc::clone(&self.routes);
        let cache = self.cache.clone();
        self.runner
            .run(move || handle_connection(stream, addr, &routes, cache.as_deref()));
        Ok(())
    }

    fn should_stop(&self) -> bool {
        match &self.shutdown {
            Some(flag) => flag.load(Ordering::SeqCst),
            None => false,
        }
    }

    fn serve_forever(&mut self) {
        loop {
            if self.should_stop() {
                info!("shutdown requested, no longer accepting connections");
                break;
            }
            match self.serve_one() {
                Ok(()) => (),
                Err(e) => {
                    if let Some(on_error) = &self.on_error {
                        on_error(&e);
                    }
                    error!("{}", e);
                }
            }
        }
    }
}
