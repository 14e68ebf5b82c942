//! Glue between a [`SecurityContext`] and a line-oriented transport.
//!
//! The original design plugged two raw function pointers into the AT client:
//! one invoked before a string went onto the wire, one invoked on every
//! received byte run. Here that pair is a single owned capability instead —
//! [`Intercept`] holds the context the hooks would have closed over, so
//! there is nothing for a caller to get out of sync with a `void *` context
//! pointer.

use crate::context::SecurityContext;
use crate::error::ChannelError;

/// Wraps a [`SecurityContext`] with the two operations a line-protocol layer
/// needs: one to transform outgoing plaintext before it reaches the wire,
/// one to transform incoming wire bytes back into plaintext.
pub struct Intercept {
    ctx: SecurityContext,
}

impl Intercept {
    pub fn new(ctx: SecurityContext) -> Self {
        Self { ctx }
    }

    /// Arm the receive side so that subsequent wire bytes are parsed as
    /// frames rather than passed through unexamined.
    pub fn arm(&mut self) {
        self.ctx.arm();
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.ctx.is_armed()
    }

    /// Transform plaintext queued for transmission into zero or more wire
    /// chunks. Called in place of handing the bytes directly to the UART
    /// writer.
    pub fn on_send(&mut self, plaintext: &[u8]) -> Result<Vec<Vec<u8>>, ChannelError> {
        self.ctx.feed(plaintext)
    }

    /// Emit whatever plaintext is still buffered for transmission, even if
    /// it falls short of a full chunk. Intended for use when the higher
    /// layer has no more data queued and wants the partial chunk sent now
    /// rather than held for a later `on_send`.
    pub fn flush_send(&mut self) -> Result<Option<Vec<u8>>, ChannelError> {
        self.ctx.flush()
    }

    /// Transform newly received wire bytes into plaintext. Called in place
    /// of handing bytes read off the UART directly to the AT parser.
    pub fn on_receive(&mut self, wire_bytes: &[u8]) -> Result<Vec<u8>, ChannelError> {
        self.ctx.consume(wire_bytes)
    }

    /// Drop any partially received frame and un-arm the receive side.
    /// Intended for use after a higher-layer read timeout, to avoid a stale
    /// partial frame poisoning the next exchange.
    pub fn reset_receive(&mut self) {
        self.ctx.reset_ingress();
    }

    /// Drop any plaintext queued for transmission but not yet chunked.
    pub fn reset_send(&mut self) {
        self.ctx.reset_egress();
    }

    #[must_use]
    pub fn context(&self) -> &SecurityContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut SecurityContext {
        &mut self.ctx
    }

    pub fn into_inner(self) -> SecurityContext {
        self.ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_through_two_intercepts() {
        let tx_ctx = SecurityContext::new_v2([0x09; 16], [0x0A; 16], 16, 1024).unwrap();
        let rx_ctx = SecurityContext::new_v2([0x09; 16], [0x0A; 16], 16, 1024).unwrap();
        let mut tx = Intercept::new(tx_ctx);
        let mut rx = Intercept::new(rx_ctx);
        rx.arm();

        let chunks = tx.on_send(b"AT+CCLK?\r\n!!!!!!").unwrap();
        let mut plain = Vec::new();
        for chunk in chunks {
            plain.extend(rx.on_receive(&chunk).unwrap());
        }
        if let Some(last) = tx.flush_send().unwrap() {
            plain.extend(rx.on_receive(&last).unwrap());
        }
        assert_eq!(plain, b"AT+CCLK?\r\n!!!!!!");
    }

    #[test]
    fn unarmed_receive_is_transparent() {
        let ctx = SecurityContext::new_v1([0; 16], [0; 16], 16, 1024).unwrap();
        let mut rx = Intercept::new(ctx);
        assert!(!rx.is_armed());
        assert_eq!(rx.on_receive(b"OK\r\n").unwrap(), b"OK\r\n");
    }

    #[test]
    fn reset_receive_clears_partial_frame() {
        let ctx = SecurityContext::new_v1([0; 16], [0; 16], 16, 1024).unwrap();
        let mut rx = Intercept::new(ctx);
        rx.arm();
        // A lone start marker and length prefix: a partial frame header.
        rx.on_receive(&[0xF8, 0x00]).unwrap();
        rx.reset_receive();
        assert!(!rx.is_armed());
    }
}
