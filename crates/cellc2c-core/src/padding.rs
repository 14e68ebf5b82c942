//! RFC 5652 (PKCS#7-style) padding to a 16-byte block, per spec §3/§4.2.

/// Append RFC 5652 padding to `buf`, growing it to the next 16-byte boundary.
///
/// If `buf.len()` is already a multiple of 16, a full 16-byte block of value
/// `0x10` is appended (the scheme never emits zero padding bytes).
pub fn pad(buf: &mut Vec<u8>) {
    let remainder = buf.len() % 16;
    let pad_len = 16 - remainder;
    buf.resize(buf.len() + pad_len, pad_len as u8);
}

/// Errors returned by [`unpad`] when the trailing bytes are not a valid
/// RFC 5652 padding. Per spec §4.2 this is folded into authentication
/// failure by callers — it is never reachable after a V2 tag check succeeds
/// unless the sender has a bug, and in V1 the tag covers the padded
/// plaintext so a bad pad here also implies a forged or corrupted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPadding;

/// Strip RFC 5652 padding from `buf` in place, returning the unpadded
/// length. Does not truncate `buf`; callers index `&buf[..unpad(buf)?]`.
///
/// The comparison is not constant-time: a timing leak of the pad length is
/// tolerated because, per spec §4.2, authentication always precedes this
/// call (V2) or the MAC already covers the full padded plaintext (V1).
pub fn unpad(buf: &[u8]) -> Result<usize, InvalidPadding> {
    let last = *buf.last().ok_or(InvalidPadding)?;
    let pad_len = last as usize;
    if pad_len == 0 || pad_len > 16 || pad_len > buf.len() {
        return Err(InvalidPadding);
    }
    let tail = &buf[buf.len() - pad_len..];
    if tail.iter().any(|&b| b != last) {
        return Err(InvalidPadding);
    }
    Ok(buf.len() - pad_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_short_input_to_one_block() {
        let mut buf = b"Hello world!".to_vec(); // 12 bytes
        pad(&mut buf);
        assert_eq!(buf.len(), 16);
        assert_eq!(&buf[12..], &[4, 4, 4, 4]);
    }

    #[test]
    fn pads_aligned_input_with_full_block() {
        let mut buf = b"0123456789abcdef".to_vec(); // 16 bytes
        pad(&mut buf);
        assert_eq!(buf.len(), 32);
        assert_eq!(&buf[16..], &[16u8; 16]);
    }

    #[test]
    fn pads_empty_input_with_full_block() {
        let mut buf = Vec::new();
        pad(&mut buf);
        assert_eq!(buf, vec![16u8; 16]);
    }

    #[test]
    fn round_trips() {
        for len in 0..40usize {
            let original: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let mut buf = original.clone();
            pad(&mut buf);
            assert!(buf.len().is_multiple_of(16));
            let plain_len = unpad(&buf).unwrap();
            assert_eq!(&buf[..plain_len], &original[..]);
        }
    }

    #[test]
    fn rejects_zero_pad_byte() {
        let buf = vec![1, 2, 3, 0];
        assert_eq!(unpad(&buf), Err(InvalidPadding));
    }

    #[test]
    fn rejects_inconsistent_pad_bytes() {
        let mut buf = b"Hello world!".to_vec();
        pad(&mut buf);
        let last = buf.len() - 1;
        buf[last - 1] ^= 0xFF;
        assert_eq!(unpad(&buf), Err(InvalidPadding));
    }

    #[test]
    fn rejects_pad_length_out_of_range() {
        let buf = vec![1, 2, 3, 17];
        assert_eq!(unpad(&buf), Err(InvalidPadding));
    }

    #[test]
    fn rejects_empty_buffer() {
        assert_eq!(unpad(&[]), Err(InvalidPadding));
    }
}
