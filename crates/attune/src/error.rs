//! Top-level server error.

/// Errors a server or connection task can exit with.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Binding the listen socket failed.
    #[error("bind failed: {0}")]
    Bind(#[source] std::io::Error),

    /// The WebSocket handshake or a frame-level operation failed.
    #[error(transparent)]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}
