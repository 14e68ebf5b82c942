//! Chip-to-chip secure channel: a framing and authenticated-encryption layer
//! for a host/co-processor UART link.
//!
//! The channel wraps an otherwise plain AT-command byte stream in
//! AES-128-CBC encrypted, authenticated chunks once both ends have
//! provisioned the same symmetric keys. [`SecurityContext`] is the entry
//! point: construct one per direction (or share one for a duplex link), then
//! drive it with [`SecurityContext::feed`]/[`SecurityContext::flush`] on the
//! way out and [`SecurityContext::consume`] on the way in. [`intercept`]
//! packages both directions behind a single capability type for callers that
//! want to splice the channel into an existing line-oriented transport.

pub mod context;
pub mod crypto;
pub mod egress;
pub mod error;
pub mod frame;
pub mod ingress;
pub mod intercept;
pub mod padding;

pub use context::{DEFAULT_MAX_WIRE, Scheme, SecurityContext, derive_chunk_plain_max};
pub use error::{ChannelError, ConfigError, FrameError};
pub use intercept::Intercept;
