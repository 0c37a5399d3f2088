//! Incremental UTF-8 decoding of a byte stream.

use std::borrow::Cow;

/// Decodes UTF-8 text that arrives in arbitrary byte chunks.
///
/// A multi-byte character split across two chunks is held back until the
/// rest of its bytes arrive. Invalid sequences decode to U+FFFD instead of
/// failing, so a corrupt byte never aborts a stream.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk, returning every complete character.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut out = String::with_capacity(bytes.len());
        let mut rest: &[u8] = &bytes;
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(e) => {
                    let valid_up_to = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&rest[..valid_up_to]));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &rest[valid_up_to + len..];
                        }
                        None => {
                            // Incomplete sequence at the end: wait for more bytes
                            self.pending = rest[valid_up_to..].to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Number of bytes held back waiting for the rest of a character.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Flush at end of input. A dangling partial character becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            char::REPLACEMENT_CHARACTER.to_string()
        }
    }
}

/// Lossy one-shot decode, for bodies that are already complete.
pub fn decode_complete(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}
