//! # autoindex-server
//!
//! HTTP serving for a static tree: real files win, directories without an
//! on-disk `index.html` get a listing generated on the fly, and everything
//! else falls through to a 404.
//!
//! Listings come from a shared [`IndexBuilder`]. Two background tasks
//! bound staleness: the filesystem caches are dropped every five seconds
//! and rendered pages every second, so a changed tree shows up without a
//! restart.

pub mod error;
mod handler;
mod not_found;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use autoindex_core::IndexBuilder;
use axum::Router;
use axum::http::HeaderValue;
use axum::middleware;
use axum::response::Response;
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{debug, error, info};

pub use crate::error::{Result, ServeError};

/// How often the filesystem caches are dropped.
const FS_CACHE_CLEAR_INTERVAL: Duration = Duration::from_secs(5);
/// How often rendered listing pages are dropped.
const PAGE_CACHE_CLEAR_INTERVAL: Duration = Duration::from_secs(1);

/// Shared state behind every request.
pub(crate) struct AppState {
    /// Canonicalized serving root.
    pub(crate) root: PathBuf,
    /// Listing generator, shared so its caches are shared.
    pub(crate) builder: IndexBuilder,
    /// Rendered pages keyed by directory path.
    pub(crate) pages: Mutex<HashMap<PathBuf, String>>,
    /// Value of the `X-Powered-By` header.
    pub(crate) powered_by: HeaderValue,
}

impl AppState {
    fn new(root: PathBuf, builder: IndexBuilder) -> Result<Self> {
        let root = root
            .canonicalize()
            .map_err(|e| ServeError::Root(format!("{}: {e}", root.display())))?;
        if !root.is_dir() {
            return Err(ServeError::Root(format!("{}: not a directory", root.display())));
        }
        let powered_by = HeaderValue::from_str(&autoindex_core::version())
            .unwrap_or_else(|_| HeaderValue::from_static("autoindex"));
        Ok(Self { root, builder, pages: Mutex::new(HashMap::new()), powered_by })
    }
}

/// Serve `root` on `0.0.0.0:port` until the process is stopped.
pub async fn serve(root: PathBuf, builder: IndexBuilder, port: u16) -> Result<()> {
    let app = prepare(root, builder)?;
    let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).await?;
    info!("serving on http://{}/", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

/// A listing server bound to a specific address, for embedding and tests.
/// Shuts down when dropped.
pub struct Server {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Server {
    /// Bind `addr` and start serving `root` in a background task.
    pub async fn bind(root: PathBuf, builder: IndexBuilder, addr: SocketAddr) -> Result<Self> {
        let app = prepare(root, builder)?;
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let served = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = served.await {
                error!("server error: {e}");
            }
        });

        debug!("listening on {addr}");
        Ok(Self { addr, shutdown: Some(shutdown_tx) })
    }

    /// The bound address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections.
    pub fn shutdown(&mut self) {
        if let Some(sender) = self.shutdown.take() {
            let _ = sender.send(());
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn prepare(root: PathBuf, builder: IndexBuilder) -> Result<Router> {
    let state = Arc::new(AppState::new(root, builder)?);
    spawn_cache_timers(&state);
    Ok(router(state))
}

fn router(state: Arc<AppState>) -> Router {
    let powered_by = state.powered_by.clone();
    Router::new()
        .fallback(handler::handle)
        .layer(middleware::map_response(move |mut response: Response| {
            let powered_by = powered_by.clone();
            async move {
                response.headers_mut().insert("x-powered-by", powered_by);
                response
            }
        }))
        .with_state(state)
}

/// Periodic cache clears. The tasks hold only weak references, so they end
/// on their own once the server state is gone.
fn spawn_cache_timers(state: &Arc<AppState>) {
    let fs_state = Arc::downgrade(state);
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(FS_CACHE_CLEAR_INTERVAL).await;
            let Some(state) = fs_state.upgrade() else { break };
            state.builder.clear_caches();
        }
    });

    let page_state = Arc::downgrade(state);
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(PAGE_CACHE_CLEAR_INTERVAL).await;
            let Some(state) = page_state.upgrade() else { break };
            state.pages.lock().clear();
        }
    });
}
