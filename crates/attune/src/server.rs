//! Server builder and accept loop.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::net::TcpListener;
use tracing::{debug, error, info};

use attune_protocol::ConnectionId;
use attune_session::{SessionConfig, SessionHandle};

use crate::handler::handle_connection;
use crate::ServerError;

/// Counter for process-unique connection ids.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Builder for configuring and binding a [`Server`].
///
/// # Example
///
/// ```rust,no_run
/// use attune::Server;
///
/// # async fn run() -> Result<(), attune::ServerError> {
/// let server = Server::builder().bind("0.0.0.0:3001").build().await?;
/// server.run().await
/// # }
/// ```
pub struct ServerBuilder {
    bind_addr: String,
    session_config: SessionConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3001".to_string(),
            session_config: SessionConfig::default(),
        }
    }

    /// Sets the address to listen on.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Overrides the session timings (countdown, reconnect grace).
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Binds the listen socket and assembles the server.
    pub async fn build(self) -> Result<Server, ServerError> {
        let listener = TcpListener::bind(&self.bind_addr)
            .await
            .map_err(ServerError::Bind)?;
        info!(addr = %self.bind_addr, "listening");
        Ok(Server {
            listener,
            sessions: SessionHandle::new(self.session_config),
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Attune server.
///
/// [`run`](Self::run) accepts connections until the process ends; each
/// connection gets its own handler task sharing one [`SessionHandle`].
pub struct Server {
    listener: TcpListener,
    sessions: SessionHandle,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// The address the listener actually bound. Useful with port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop.
    pub async fn run(self) -> Result<(), ServerError> {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let id = ConnectionId(
                        NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
                    );
                    let sessions = self.sessions.clone();
                    tokio::spawn(async move {
                        if let Err(err) =
                            handle_connection(stream, peer, id, sessions)
                                .await
                        {
                            debug!(
                                connection = %id,
                                %err,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(err) => {
                    error!(%err, "accept failed");
                }
            }
        }
    }
}
