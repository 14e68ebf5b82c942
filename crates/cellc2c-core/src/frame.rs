//! The on-wire chunk framer (spec §4.3, §6.1): a restartable parser over a
//! byte prefix that may not yet contain a whole frame.
//!
//! ```text
//! Offset  Size   Field
//! 0       1      START = 0xF8
//! 1       2      LENGTH (big-endian): IV+cipher+tag length
//! 3       16     IV
//! 19      var    CIPHERTEXT (multiple of 16, >= 16)
//! 19+c    T      AUTH TAG: T=32 for V1, T=16 for V2
//! 19+c+T  1      END = 0xF9
//! ```

use crate::error::FrameError;

pub const START_MARKER: u8 = 0xF8;
pub const END_MARKER: u8 = 0xF9;
pub const IV_LEN: usize = 16;

/// Bytes of frame overhead around a given ciphertext+tag length: start, the
/// two-byte length field, and end.
const HEADER_AND_TRAILER_LEN: usize = 1 + 2 + 1;

/// The byte layout of one fully received frame within a buffer, expressed as
/// offsets so the caller can slice (and mutate, for in-place decryption) the
/// backing buffer itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub iv_start: usize,
    pub cipher_start: usize,
    pub cipher_len: usize,
    pub tag_start: usize,
    pub tag_len: usize,
    /// Total wire bytes occupied by this frame, from offset 0 of the buffer
    /// passed to [`decode_frame`].
    pub consumed: usize,
}

impl FrameLayout {
    pub fn iv_range(&self) -> std::ops::Range<usize> {
        self.iv_start..self.iv_start + IV_LEN
    }

    pub fn cipher_range(&self) -> std::ops::Range<usize> {
        self.cipher_start..self.cipher_start + self.cipher_len
    }

    pub fn tag_range(&self) -> std::ops::Range<usize> {
        self.tag_start..self.tag_start + self.tag_len
    }
}

/// Result of attempting to decode one frame from the front of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// Not enough bytes yet; retry once at least this many more have
    /// arrived (a lower bound — more may be required once the length field
    /// itself has been read).
    NeedMore(usize),
    /// A complete, well-formed frame sits at the front of the buffer.
    Frame(FrameLayout),
    /// The buffer can never become a valid frame without discarding bytes.
    Malformed(FrameError),
}

/// Attempt to decode one chunk from the front of `buf`.
///
/// `max_wire` bounds the total wire size of a chunk (spec §6.1); `tag_len`
/// is 32 for V1, 16 for V2. This function never allocates and never reads
/// past a byte it has already validated is present.
pub fn decode_frame(buf: &[u8], max_wire: usize, tag_len: usize) -> Decoded {
    let Some(&start) = buf.first() else {
        return Decoded::NeedMore(1);
    };
    if start != START_MARKER {
        return Decoded::Malformed(FrameError::BadStartMarker(start));
    }
    if buf.len() < 3 {
        return Decoded::NeedMore(3 - buf.len());
    }
    let length = u16::from_be_bytes([buf[1], buf[2]]) as usize;
    if length > max_wire {
        return Decoded::Malformed(FrameError::OversizedLength {
            length,
            max: max_wire,
        });
    }
    let Some(cipher_len) = length.checked_sub(IV_LEN + tag_len) else {
        return Decoded::Malformed(FrameError::TooShort { length, tag_len });
    };
    if !cipher_len.is_multiple_of(16) || cipher_len == 0 {
        return Decoded::Malformed(FrameError::UnalignedCiphertext(cipher_len));
    }

    let total = HEADER_AND_TRAILER_LEN + length;
    if buf.len() < total {
        return Decoded::NeedMore(total - buf.len());
    }
    let end = buf[total - 1];
    if end != END_MARKER {
        return Decoded::Malformed(FrameError::BadEndMarker(end));
    }

    let iv_start = 3;
    let cipher_start = iv_start + IV_LEN;
    let tag_start = cipher_start + cipher_len;
    Decoded::Frame(FrameLayout {
        iv_start,
        cipher_start,
        cipher_len,
        tag_start,
        tag_len,
        consumed: total,
    })
}

/// Encode one chunk: `START | len | IV | ciphertext | tag | END`.
pub fn encode_frame(out: &mut Vec<u8>, iv: &[u8; IV_LEN], ciphertext: &[u8], tag: &[u8]) {
    let length = IV_LEN + ciphertext.len() + tag.len();
    debug_assert!(length <= u16::MAX as usize);
    out.reserve(HEADER_AND_TRAILER_LEN + length);
    out.push(START_MARKER);
    out.extend_from_slice(&(length as u16).to_be_bytes());
    out.extend_from_slice(iv);
    out.extend_from_slice(ciphertext);
    out.extend_from_slice(tag);
    out.push(END_MARKER);
}

/// Total wire size of a chunk carrying `cipher_len` bytes of ciphertext with
/// a `tag_len`-byte tag.
pub fn wire_len(cipher_len: usize, tag_len: usize) -> usize {
    HEADER_AND_TRAILER_LEN + IV_LEN + cipher_len + tag_len
}
