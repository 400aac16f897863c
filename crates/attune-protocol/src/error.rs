//! Protocol-layer errors.

/// Errors from encoding or decoding wire frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing fields, or an
    /// unknown event type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// Structurally valid but semantically unusable at the protocol
    /// level.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

/// A wire team value outside {1, 2}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("team must be 1 or 2, got {0}")]
pub struct InvalidTeam(pub u8);
