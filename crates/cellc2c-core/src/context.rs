//! Security context (spec §3, §4.6): holds keys, scheme selection, and the
//! per-direction egress/ingress state for one logical channel.
//!
//! Scheme and keys are immutable once constructed — rotation means
//! discarding the context and building a new one, there is no in-band
//! renegotiation (spec §1 Non-goals).

use tracing::debug;
use zeroize::Zeroizing;

use crate::error::ConfigError;
use crate::frame::wire_len;

/// Which authentication scheme a context uses (spec §6.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// `tag = SHA256(TE_secret || IV || ciphertext)`, 32 bytes.
    V1,
    /// `tag = truncate16(HMAC_SHA256(hmac_key, IV || ciphertext))`, 16 bytes.
    V2,
}

impl Scheme {
    /// Authentication tag length for this scheme.
    #[must_use]
    pub const fn tag_len(self) -> usize {
        match self {
            Scheme::V1 => 32,
            Scheme::V2 => 16,
        }
    }
}

/// Default maximum total wire size of one chunk, per spec §6.1.
pub const DEFAULT_MAX_WIRE: usize = 1024;

/// Derive the largest legal `chunk_plain_max` for a given `max_wire` and tag
/// length: `maxWire - (1 + 2 + 16 + T + 1) - 16`, floored to a multiple of 16
/// (spec §6.1).
#[must_use]
pub fn derive_chunk_plain_max(max_wire: usize, tag_len: usize) -> usize {
    let worst_case_overhead = wire_len(0, tag_len) + 16;
    max_wire.saturating_sub(worst_case_overhead) / 16 * 16
}

/// Plaintext accumulator for the egress direction (spec §3 "Egress
/// sub-state"). Never holds more than one chunk's worth of plaintext.
#[derive(Debug, Default)]
pub(crate) struct EgressState {
    pub accumulator: Vec<u8>,
}

/// Partially received wire bytes for the ingress direction (spec §3
/// "Ingress sub-state").
#[derive(Debug, Default)]
pub(crate) struct IngressState {
    pub working: Vec<u8>,
    pub armed: bool,
}

/// Holds keys, scheme, and per-direction state for one logical channel.
pub struct SecurityContext {
    pub(crate) scheme: Scheme,
    pub(crate) te_secret: Option<Zeroizing<[u8; 16]>>,
    pub(crate) enc_key: Zeroizing<[u8; 16]>,
    pub(crate) hmac_key: Option<Zeroizing<[u8; 16]>>,
    pub(crate) max_wire: usize,
    pub(crate) chunk_plain_max: usize,
    pub(crate) egress: EgressState,
    pub(crate) ingress: IngressState,
}

impl std::fmt::Debug for SecurityContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityContext")
            .field("scheme", &self.scheme)
            .field("max_wire", &self.max_wire)
            .field("chunk_plain_max", &self.chunk_plain_max)
            .field("egress_fill", &self.egress.accumulator.len())
            .field("ingress_working_len", &self.ingress.working.len())
            .field("armed", &self.ingress.armed)
            .finish_non_exhaustive()
    }
}

impl SecurityContext {
    /// Construct a V1 (SHA-256-over-prefix) context.
    pub fn new_v1(
        enc_key: [u8; 16],
        te_secret: [u8; 16],
        chunk_plain_max: usize,
        max_wire: usize,
    ) -> Result<Self, ConfigError> {
        Self::new(
            Scheme::V1,
            enc_key,
            Some(te_secret),
            None,
            chunk_plain_max,
            max_wire,
        )
    }

    /// Construct a V2 (HMAC-SHA-256) context.
    pub fn new_v2(
        enc_key: [u8; 16],
        hmac_key: [u8; 16],
        chunk_plain_max: usize,
        max_wire: usize,
    ) -> Result<Self, ConfigError> {
        Self::new(
            Scheme::V2,
            enc_key,
            None,
            Some(hmac_key),
            chunk_plain_max,
            max_wire,
        )
    }

    fn new(
        scheme: Scheme,
        enc_key: [u8; 16],
        te_secret: Option<[u8; 16]>,
        hmac_key: Option<[u8; 16]>,
        chunk_plain_max: usize,
        max_wire: usize,
    ) -> Result<Self, ConfigError> {
        if chunk_plain_max == 0 || !chunk_plain_max.is_multiple_of(16) {
            return Err(ConfigError::InvalidChunkPlainMax(chunk_plain_max));
        }
        let ceiling = derive_chunk_plain_max(max_wire, scheme.tag_len());
        if chunk_plain_max > ceiling {
            return Err(ConfigError::ChunkPlainMaxExceedsWire {
                chunk_plain_max,
                max_wire,
            });
        }
        match scheme {
            Scheme::V1 if te_secret.is_none() => return Err(ConfigError::MissingTeSecret),
            Scheme::V2 if hmac_key.is_none() => return Err(ConfigError::MissingHmacKey),
            _ => {}
        }

        debug!(?scheme, chunk_plain_max, max_wire, "security context created");
        Ok(Self {
            scheme,
            te_secret: te_secret.map(Zeroizing::new),
            enc_key: Zeroizing::new(enc_key),
            hmac_key: hmac_key.map(Zeroizing::new),
            max_wire,
            chunk_plain_max,
            egress: EgressState::default(),
            ingress: IngressState::default(),
        })
    }

    #[must_use]
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    #[must_use]
    pub fn chunk_plain_max(&self) -> usize {
        self.chunk_plain_max
    }

    #[must_use]
    pub fn max_wire(&self) -> usize {
        self.max_wire
    }

    /// Transition the ingress direction to "armed": from this point on the
    /// first byte of every `consume` call must be a valid START marker
    /// (spec §9 open question, resolved: explicit arming rather than
    /// silent pre-roll passthrough).
    pub fn arm(&mut self) {
        self.ingress.armed = true;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.ingress.armed
    }

    /// Discard ingress state (partial frames, armed flag) without touching
    /// the egress accumulator or keys. Intended for use after a higher-layer
    /// I/O timeout (spec §5).
    pub fn reset_ingress(&mut self) {
        self.ingress.working.clear();
        self.ingress.armed = false;
    }

    /// Discard any partially accumulated egress plaintext. A higher-layer
    /// timeout may call this instead of destroying the whole context; the
    /// partial chunk is lost, which is acceptable per spec §5 since retry
    /// logic lives above this layer.
    pub fn reset_egress(&mut self) {
        self.egress.accumulator.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_chunk_plain_max_matches_spec_formula() {
        // maxWire=1024, T=32 (V1): 1024 - (1+2+16+32+1) - 16 = 956, floored to 944.
        assert_eq!(derive_chunk_plain_max(1024, 32), 944);
        // T=16 (V2): 1024 - (1+2+16+16+1) - 16 = 972, floored to 960.
        assert_eq!(derive_chunk_plain_max(1024, 16), 960);
    }

    #[test]
    fn rejects_non_block_aligned_chunk_plain_max() {
        let err = SecurityContext::new_v1([0; 16], [0; 16], 100, 1024).unwrap_err();
        assert_eq!(err, ConfigError::InvalidChunkPlainMax(100));
    }

    #[test]
    fn rejects_chunk_plain_max_too_large_for_wire() {
        let err = SecurityContext::new_v1([0; 16], [0; 16], 1008, 100).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ChunkPlainMaxExceedsWire { .. }
        ));
    }

    #[test]
    fn accepts_spec_default_budget() {
        // 1008 is the chunk-plaintext cap used in the documented interop
        // scenarios; it requires a wire budget comfortably above the
        // DEFAULT_MAX_WIRE used for smaller, conservative configurations.
        let ctx = SecurityContext::new_v1([0; 16], [0; 16], 1008, 2048);
        assert!(ctx.is_ok(), "1008 must fit a 2048-byte wire budget");
    }
}
