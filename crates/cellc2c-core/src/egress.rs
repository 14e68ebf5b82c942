//! Egress engine (spec §4.4): accumulate plaintext, chunk it to
//! `chunk_plain_max`, pad, encrypt, authenticate, and frame each chunk.

use tracing::trace;

use crate::context::{Scheme, SecurityContext};
use crate::crypto::{aes128_cbc_encrypt_in_place, hmac_sha256, random_bytes, sha256};
use crate::error::ChannelError;
use crate::frame::encode_frame;
use crate::padding::pad;

impl SecurityContext {
    /// Accept plaintext bound for the remote co-processor and return zero or
    /// more fully framed wire chunks.
    ///
    /// A chunk is emitted as soon as the accumulator holds at least
    /// `chunk_plain_max` bytes of plaintext; any remainder stays buffered for
    /// the next call or an explicit [`Self::flush`]. Large inputs are split
    /// into as many chunks as needed in a single call.
    pub fn feed(&mut self, plaintext: &[u8]) -> Result<Vec<Vec<u8>>, ChannelError> {
        self.egress.accumulator.extend_from_slice(plaintext);

        let mut chunks = Vec::new();
        while self.egress.accumulator.len() >= self.chunk_plain_max {
            let rest = self.egress.accumulator.split_off(self.chunk_plain_max);
            let chunk_plain = std::mem::replace(&mut self.egress.accumulator, rest);
            chunks.push(self.encode_chunk(&chunk_plain));
        }
        Ok(chunks)
    }

    /// Frame and emit whatever plaintext remains in the accumulator, even if
    /// it is shorter than `chunk_plain_max`. Returns `None` if there was
    /// nothing buffered.
    pub fn flush(&mut self) -> Result<Option<Vec<u8>>, ChannelError> {
        if self.egress.accumulator.is_empty() {
            return Ok(None);
        }
        let chunk_plain = std::mem::take(&mut self.egress.accumulator);
        Ok(Some(self.encode_chunk(&chunk_plain)))
    }

    fn encode_chunk(&mut self, chunk_plain: &[u8]) -> Vec<u8> {
        let iv: [u8; 16] = random_bytes();

        let mut buf = chunk_plain.to_vec();
        pad(&mut buf);
        aes128_cbc_encrypt_in_place(&self.enc_key, &iv, &mut buf);
        let ciphertext = buf;

        let tag = self.compute_tag(&iv, &ciphertext);

        trace!(
            plain_len = chunk_plain.len(),
            cipher_len = ciphertext.len(),
            "egress chunk encoded"
        );

        let mut wire = Vec::new();
        encode_frame(&mut wire, &iv, &ciphertext, &tag);
        wire
    }

    /// Compute the authentication tag over `IV || ciphertext` per the
    /// configured scheme (spec §4.4 step 5, §6.2). Shared with the ingress
    /// engine, which recomputes the same tag to verify incoming frames.
    pub(crate) fn compute_tag(&self, iv: &[u8; 16], ciphertext: &[u8]) -> Vec<u8> {
        match self.scheme {
            Scheme::V1 => {
                let te_secret = self
                    .te_secret
                    .as_ref()
                    .expect("V1 context always carries a TE secret, enforced at construction");
                let mut preimage = Vec::with_capacity(16 + 16 + ciphertext.len());
                preimage.extend_from_slice(&**te_secret);
                preimage.extend_from_slice(iv);
                preimage.extend_from_slice(ciphertext);
                sha256(&preimage).to_vec()
            }
            Scheme::V2 => {
                let hmac_key = self
                    .hmac_key
                    .as_ref()
                    .expect("V2 context always carries an HMAC key, enforced at construction");
                let mut preimage = Vec::with_capacity(16 + ciphertext.len());
                preimage.extend_from_slice(iv);
                preimage.extend_from_slice(ciphertext);
                let full = hmac_sha256(hmac_key, &preimage);
                full[..16].to_vec()
            }
        }
    }
}
