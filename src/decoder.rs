//! Incremental text decoding for streamed answer bodies.
//!
//! The ask endpoint streams its answer as raw UTF-8 text with no framing, so
//! a chunk boundary can land in the middle of a multi-byte scalar. This
//! module turns successive byte buffers into text fragments, carrying any
//! partial scalar over to the next buffer instead of emitting mojibake.

/// Decodes a stream of UTF-8 byte buffers into text fragments.
///
/// A trailing partial scalar is held back between [`decode`] calls and
/// completed by the next buffer. Invalid sequences are replaced with
/// U+FFFD and decoding continues; a decode problem never aborts the
/// stream. [`flush`] must be called once at end-of-stream to drain
/// whatever is still held back.
///
/// [`decode`]: StreamTextDecoder::decode
/// [`flush`]: StreamTextDecoder::flush
#[derive(Debug, Default)]
pub struct StreamTextDecoder {
    // At most 3 bytes: the incomplete suffix of a 2-4 byte scalar.
    pending: Vec<u8>,
}

impl StreamTextDecoder {
    /// Creates a decoder with no carried-over state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes the next buffer from the stream, returning the text that is
    /// complete so far.
    ///
    /// The returned fragment may be empty when the buffer holds only the
    /// beginning of a multi-byte scalar.
    pub fn decode(&mut self, input: &[u8]) -> String {
        let carry;
        let bytes: &[u8] = if self.pending.is_empty() {
            input
        } else {
            let mut buf = std::mem::take(&mut self.pending);
            buf.extend_from_slice(input);
            carry = buf;
            &carry
        };

        let mut out = String::new();
        let mut rest = bytes;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    // The prefix up to valid_up_to is UTF-8 by construction.
                    out.push_str(std::str::from_utf8(&rest[..valid]).unwrap_or(""));
                    match err.error_len() {
                        Some(invalid) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &rest[valid + invalid..];
                        }
                        None => {
                            // Incomplete scalar at the end of the buffer;
                            // the next buffer completes it.
                            self.pending = rest[valid..].to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Drains the decoder at end-of-stream.
    ///
    /// Best-effort terminal decode: a scalar left incomplete when the
    /// stream ended becomes U+FFFD rather than being dropped silently.
    pub fn flush(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let pending = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&pending).into_owned()
    }
}
