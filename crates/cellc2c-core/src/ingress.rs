//! Ingress engine (spec §4.5): reassemble frames from an arbitrarily
//! fragmented byte stream, verify their tag, decrypt in place, and strip
//! padding.
//!
//! Before [`SecurityContext::arm`] has been called, `consume` is a no-op
//! passthrough — bytes are handed back unexamined, matching the boot-time
//! window where a co-processor link carries plain AT traffic before the
//! secure channel is negotiated. Once armed, every byte on the wire is
//! expected to belong to a frame; a desynchronised stream is recovered one
//! byte at a time rather than treated as fatal.

use subtle::ConstantTimeEq;
use tracing::warn;

use crate::context::SecurityContext;
use crate::crypto::aes128_cbc_decrypt_in_place;
use crate::error::ChannelError;
use crate::frame::{Decoded, FrameLayout, decode_frame};
use crate::padding::unpad;

impl SecurityContext {
    /// Feed newly received wire bytes and return the plaintext recovered
    /// from every complete, authenticated frame now available.
    ///
    /// If any frame in this batch fails authentication or framing, the
    /// plaintext already recovered earlier in the *same* call is discarded
    /// and an error is returned; the offending bytes are dropped from the
    /// internal buffer so the stream can resynchronise on the next call.
    pub fn consume(&mut self, new_bytes: &[u8]) -> Result<Vec<u8>, ChannelError> {
        if !self.ingress.armed {
            return Ok(new_bytes.to_vec());
        }
        self.ingress.working.extend_from_slice(new_bytes);

        let tag_len = self.scheme.tag_len();
        let mut plaintext = Vec::new();
        let mut first_error = None;

        loop {
            match decode_frame(&self.ingress.working, self.max_wire, tag_len) {
                Decoded::NeedMore(_) => break,
                Decoded::Malformed(err) => {
                    warn!(?err, "dropping leading byte to resynchronise ingress stream");
                    if first_error.is_none() {
                        first_error = Some(ChannelError::from(err));
                    }
                    self.ingress.working.remove(0);
                }
                Decoded::Frame(layout) => {
                    let consumed = layout.consumed;
                    match self.decode_chunk(&layout) {
                        Ok(plain) if first_error.is_none() => plaintext.extend(plain),
                        Ok(_) => {}
                        Err(e) => {
                            if first_error.is_none() {
                                first_error = Some(e);
                            }
                        }
                    }
                    self.ingress.working.drain(..consumed);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(plaintext),
        }
    }

    /// Verify and decrypt a single frame already located at the front of
    /// `self.ingress.working`, decrypting the ciphertext span in place.
    fn decode_chunk(&mut self, layout: &FrameLayout) -> Result<Vec<u8>, ChannelError> {
        let iv: [u8; 16] = self.ingress.working[layout.iv_range()]
            .try_into()
            .expect("iv_range always yields 16 bytes");

        let expected_tag = self.compute_tag(&iv, &self.ingress.working[layout.cipher_range()]);
        let received_tag = &self.ingress.working[layout.tag_range()];
        if expected_tag.ct_eq(received_tag).unwrap_u8() == 0 {
            return Err(ChannelError::AuthFailed);
        }

        let cipher_range = layout.cipher_range();
        aes128_cbc_decrypt_in_place(&self.enc_key, &iv, &mut self.ingress.working[cipher_range.clone()]);

        let padded = &self.ingress.working[cipher_range];
        let plain_len = unpad(padded).map_err(|_| ChannelError::AuthFailed)?;
        Ok(padded[..plain_len].to_vec())
    }
}
