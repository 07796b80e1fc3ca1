//! Native HTTP server implementation
//!
//! hyper HTTP/1.1 on a tokio runtime:
//! - one task per connection, no shared mutable state
//! - TCP_NODELAY for low latency
//! - graceful shutdown that drains active connections

use crate::config::ServerConfig;
use crate::handlers::StaticFiles;
use crate::{Method, Request, Response, Result};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use socket2::{Domain, Protocol, Socket, Type};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

/// A bound static file server
pub struct Server {
    listener: TcpListener,
    files: Arc<StaticFiles>,
    tracker: Arc<ConnectionTracker>,
    shutdown_timeout: Duration,
}

impl Server {
    /// Bind the listening socket. Must be called inside a tokio runtime.
    pub fn bind(config: &ServerConfig) -> Result<Self> {
        let addr = config.addr()?;
        let socket = create_optimized_socket(&addr)?;
        let listener = TcpListener::from_std(socket.into())?;

        Ok(Self {
            listener,
            files: Arc::new(StaticFiles::new(config.static_files())),
            tracker: Arc::new(ConnectionTracker::new()),
            shutdown_timeout: Duration::from_millis(config.shutdown_timeout_ms),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the process is stopped
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve until `shutdown` completes, then drain open connections
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => self.spawn_connection(stream, peer),
                        Err(e) => tracing::warn!(error = %e, "accept failed"),
                    }
                }
            }
        }

        self.tracker.start_shutdown();
        tracing::info!(active = self.tracker.count(), "shutting down");
        self.drain().await;
        Ok(())
    }

    fn spawn_connection(&self, stream: tokio::net::TcpStream, peer: SocketAddr) {
        let io = TokioIo::new(stream);
        let files = self.files.clone();
        let tracker = self.tracker.clone();
        let guard = ConnectionGuard::new(self.tracker.clone());

        tokio::spawn(async move {
            let _guard = guard;
            let service = service_fn(move |req: hyper::Request<Incoming>| {
                let files = files.clone();
                async move {
                    let response = match from_hyper_request(&req) {
                        Ok(request) => files.handle(&request).await,
                        Err(e) => {
                            tracing::debug!(error = %e, "unsupported method");
                            Response::method_not_allowed()
                        }
                    };
                    tracing::debug!(status = %response.status, path = %req.uri().path(), "response");
                    Ok::<_, Infallible>(to_hyper_response(response))
                }
            });

            let conn = http1::Builder::new().serve_connection(io, service);
            tokio::pin!(conn);

            // Keep-alive connections finish their current request, then close
            let mut closing = false;
            loop {
                tokio::select! {
                    result = conn.as_mut() => {
                        if let Err(e) = result {
                            tracing::debug!(%peer, error = %e, "connection error");
                        }
                        break;
                    }
                    _ = tracker.shutdown_requested(), if !closing => {
                        closing = true;
                        conn.as_mut().graceful_shutdown();
                    }
                }
            }
        });
    }

    async fn drain(&self) {
        let deadline = tokio::time::Instant::now() + self.shutdown_timeout;
        while self.tracker.count() > 0 {
            if tokio::time::Instant::now() >= deadline {
                tracing::warn!(active = self.tracker.count(), "shutdown timeout, dropping connections");
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

/// Create a non-blocking TCP listener socket with optimizations
pub fn create_optimized_socket(addr: &SocketAddr) -> std::io::Result<Socket> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    // SO_REUSEADDR - allow binding to address in TIME_WAIT
    socket.set_reuse_address(true)?;

    // TCP_NODELAY - disable Nagle's algorithm for lower latency
    socket.set_nodelay(true)?;

    // Required before handing the socket to tokio
    socket.set_nonblocking(true)?;

    socket.bind(&(*addr).into())?;
    socket.listen(1024)?;

    Ok(socket)
}

/// Convert a hyper request head to our Request type. The query string is
/// dropped.
pub fn from_hyper_request<B>(req: &hyper::Request<B>) -> Result<Request> {
    let method = Method::parse(req.method().as_str())?;
    let uri = req.uri();

    Ok(Request::new(method, uri.path()))
}

/// Convert our Response to hyper Response. Headers that are not valid
/// HTTP are dropped.
pub fn to_hyper_response(res: Response) -> hyper::Response<Full<Bytes>> {
    let mut out = hyper::Response::new(Full::new(res.body));
    *out.status_mut() = http::StatusCode::from_u16(res.status.as_u16())
        .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);

    let headers = out.headers_mut();
    for (name, value) in &res.headers {
        match (
            http::HeaderName::from_bytes(name.as_bytes()),
            http::HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => tracing::warn!(header = %name, "dropping invalid response header"),
        }
    }

    out
}

// ============================================================================
// Connection Tracking for Graceful Shutdown
// ============================================================================

/// Tracks active connections for graceful shutdown
#[derive(Debug)]
pub struct ConnectionTracker {
    /// Active connection count
    active: AtomicU64,
    /// Shutdown signal received
    shutting_down: AtomicBool,
    /// Wakes open connections on shutdown
    shutdown: Notify,
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionTracker {
    /// Create a new connection tracker
    pub fn new() -> Self {
        Self {
            active: AtomicU64::new(0),
            shutting_down: AtomicBool::new(false),
            shutdown: Notify::new(),
        }
    }

    /// Increment active connection count
    #[inline]
    pub fn increment(&self) {
        self.active.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement active connection count
    #[inline]
    pub fn decrement(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }

    /// Get current active connection count
    #[inline]
    pub fn count(&self) -> u64 {
        self.active.load(Ordering::SeqCst)
    }

    /// Signal that shutdown is in progress
    pub fn start_shutdown(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        self.shutdown.notify_waiters();
    }

    /// Check if shutdown is in progress
    #[inline]
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    /// Resolves once shutdown has started, immediately if it already has
    pub async fn shutdown_requested(&self) {
        let notified = self.shutdown.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent start_shutdown is not missed
        notified.as_mut().enable();
        if self.is_shutting_down() {
            return;
        }
        notified.await;
    }
}

/// Counts a connection for as long as it lives
struct ConnectionGuard {
    tracker: Arc<ConnectionTracker>,
}

impl ConnectionGuard {
    fn new(tracker: Arc<ConnectionTracker>) -> Self {
        tracker.increment();
        Self { tracker }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.tracker.decrement();
    }
}
