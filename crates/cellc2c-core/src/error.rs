//! Error types for the secure channel core.

use thiserror::Error;

/// Raised when a [`crate::context::SecurityContext`] is constructed with
/// parameters that can never produce a valid channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("chunk_plain_max must be a positive multiple of 16, got {0}")]
    InvalidChunkPlainMax(usize),

    #[error("chunk_plain_max {chunk_plain_max} does not fit within max_wire {max_wire}")]
    ChunkPlainMaxExceedsWire {
        chunk_plain_max: usize,
        max_wire: usize,
    },

    #[error("V2 scheme requires a distinct HMAC key")]
    MissingHmacKey,

    #[error("V1 scheme requires a TE secret")]
    MissingTeSecret,
}

/// Framing violation raised by the restartable chunk parser (§4.3).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("missing start marker, expected 0xF8, got {0:#04x}")]
    BadStartMarker(u8),

    #[error("missing end marker, expected 0xF9, got {0:#04x}")]
    BadEndMarker(u8),

    #[error("payload length {length} exceeds maximum chunk size {max}")]
    OversizedLength { length: usize, max: usize },

    #[error("payload length {length} too short to hold IV and a {tag_len}-byte tag")]
    TooShort { length: usize, tag_len: usize },

    #[error("ciphertext length {0} is not a multiple of 16")]
    UnalignedCiphertext(usize),
}

/// Errors surfaced by the egress/ingress engines and the intercept glue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("frame is malformed: {0}")]
    Malformed(#[from] FrameError),

    /// Tag mismatch, or a padding byte out of range after successful
    /// verification in V1 — both are treated as a single integrity failure
    /// per §4.5 tie-breaks.
    #[error("authentication failed: invalid tag or padding")]
    AuthFailed,

    #[error("channel is not configured: {0}")]
    Config(#[from] ConfigError),

    /// Reserved for caller-contract violations against the internal
    /// accumulator/working-buffer invariants (§7). The safe `feed`/`consume`
    /// API never triggers this itself; it exists so callers embedding this
    /// crate behind a lower-level (e.g. FFI) boundary have somewhere to
    /// report buffer overrun attempts.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),
}
