use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::time::sleep;
use tracing::info;

use crate::config::Config;
use crate::http::connection::Connection;
use crate::http::parser::DEFAULT_READ_SIZE;
use crate::server::Handler;

/// Pause before retrying after a failed accept.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server is already stopped")]
    AlreadyStopped,
}

/// A running listener dispatching one task per connection.
///
/// Stopping prevents new accepts; connections already being served run to
/// completion on their own. Dropping a running server stops it.
pub struct Server {
    running: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    local_addr: SocketAddr,
}

impl Server {
    /// Listens on all interfaces at `port`.
    pub async fn start<H: Handler>(port: u16, handler: H) -> Result<Self, ServerError> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        Self::launch(&addr.to_string(), DEFAULT_READ_SIZE, Arc::new(handler)).await
    }

    /// Listens on `cfg.listen_addr` with the configured read buffer size.
    pub async fn start_with_config<H: Handler>(cfg: &Config, handler: H) -> Result<Self, ServerError> {
        Self::launch(&cfg.listen_addr, cfg.read_buffer_size, Arc::new(handler)).await
    }

    async fn launch(
        addr: &str,
        read_buffer_size: usize,
        handler: Arc<dyn Handler>,
    ) -> Result<Self, ServerError> {
        let bind_error = |source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        };

        let listener = TcpListener::bind(addr).await.map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;
        info!("Listening on {}", local_addr);

        let running = Arc::new(AtomicBool::new(true));
        let shutdown = Arc::new(Notify::new());

        tokio::spawn(accept_loop(
            listener,
            running.clone(),
            shutdown.clone(),
            handler,
            read_buffer_size,
        ));

        Ok(Self {
            running,
            shutdown,
            local_addr,
        })
    }

    /// The bound address, useful when started on port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stops accepting connections and closes the listener.
    pub fn stop(&self) -> Result<(), ServerError> {
        if !self.running.swap(false, Ordering::AcqRel) {
            return Err(ServerError::AlreadyStopped);
        }
        self.shutdown.notify_one();
        Ok(())
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

async fn accept_loop(
    listener: TcpListener,
    running: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    handler: Arc<dyn Handler>,
    read_buffer_size: usize,
) {
    while running.load(Ordering::Acquire) {
        tokio::select! {
            _ = shutdown.notified() => break,

            accepted = listener.accept() => {
                let (socket, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to accept connection");
                        sleep(ACCEPT_BACKOFF).await;
                        continue;
                    }
                };
                info!("Accepted connection from {}", peer);

                let handler = handler.clone();
                tokio::spawn(async move {
                    let conn = Connection::new(socket, peer, read_buffer_size);
                    if let Err(e) = conn.run(handler.as_ref()).await {
                        tracing::error!("Connection error from {}: {}", peer, e);
                    }
                });
            }
        }
    }

    info!(addr = ?listener.local_addr().ok(), "Listener closed");
}
