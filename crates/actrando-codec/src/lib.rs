#![warn(missing_docs)]
//! # actrando-codec
//!
//! ## Purpose
//! Round-trips arbitrary binary data through a text-safe base64 encoding so
//! ROM images can live in a text-only persistent store.
//!
//! ## Responsibilities
//! - Encode byte sequences into the 64-symbol base64 alphabet plus padding.
//! - Decode previously encoded text back into the exact original bytes.
//!
//! ## Data flow
//! The store crate encodes ROM bytes before writing them under its namespaced
//! key and decodes them on every read.
//!
//! ## Ownership and lifetimes
//! Both directions take borrowed input and return owned output; no buffers
//! are shared between caller and codec.
//!
//! ## Error model
//! Encoding cannot fail. Decoding rejects malformed text with [`CodecError`];
//! no external untrusted decode path exists, so a decode failure indicates a
//! corrupted store entry.
//!
//! ## Example
//! ```rust
//! let encoded = actrando_codec::encode(&[0xAC, 0x7F]);
//! assert_eq!(encoded, "rH8=");
//! assert_eq!(actrando_codec::decode(&encoded).unwrap(), vec![0xAC, 0x7F]);
//! ```

use thiserror::Error;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const PADDING: u8 = b'=';

/// Encodes a byte sequence as padded base64 text.
///
/// # Semantics
/// Each group of three input bytes yields four output symbols; a trailing
/// group of two bytes yields three symbols plus one padding symbol, and a
/// trailing group of one byte yields two symbols plus two padding symbols.
/// No line wrapping or whitespace is emitted.
pub fn encode(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len().div_ceil(3) * 4);

    for group in bytes.chunks(3) {
        let byte0 = group[0];
        encoded.push(ALPHABET[(byte0 >> 2) as usize] as char);

        match group {
            [_, byte1, byte2] => {
                encoded.push(ALPHABET[(((byte0 & 0b0000_0011) << 4) | (byte1 >> 4)) as usize] as char);
                encoded.push(ALPHABET[(((byte1 & 0b0000_1111) << 2) | (byte2 >> 6)) as usize] as char);
                encoded.push(ALPHABET[(byte2 & 0b0011_1111) as usize] as char);
            }
            [_, byte1] => {
                encoded.push(ALPHABET[(((byte0 & 0b0000_0011) << 4) | (byte1 >> 4)) as usize] as char);
                encoded.push(ALPHABET[((byte1 & 0b0000_1111) << 2) as usize] as char);
                encoded.push(PADDING as char);
            }
            _ => {
                encoded.push(ALPHABET[((byte0 & 0b0000_0011) << 4) as usize] as char);
                encoded.push(PADDING as char);
                encoded.push(PADDING as char);
            }
        }
    }

    encoded
}

/// Decodes base64 text produced by [`encode`] back into bytes.
///
/// # Errors
/// Returns [`CodecError`] when the text length is not a multiple of four,
/// when a symbol falls outside the 65-symbol set, or when padding appears
/// anywhere other than the final one or two positions.
pub fn decode(text: &str) -> Result<Vec<u8>, CodecError> {
    let symbols = text.as_bytes();
    if symbols.len() % 4 != 0 {
        return Err(CodecError::TruncatedGroup(symbols.len()));
    }

    let mut decoded = Vec::with_capacity(symbols.len() / 4 * 3);
    let group_count = symbols.len() / 4;

    for (group_index, group) in symbols.chunks_exact(4).enumerate() {
        let is_final_group = group_index + 1 == group_count;
        let require = |offset: usize| -> Result<u8, CodecError> {
            let symbol = group[offset];
            let position = group_index * 4 + offset;
            if symbol == PADDING {
                return Err(CodecError::MisplacedPadding { position });
            }
            symbol_value(symbol).ok_or(CodecError::InvalidSymbol {
                symbol: symbol as char,
                position,
            })
        };

        let value0 = require(0)?;
        let value1 = require(1)?;
        decoded.push((value0 << 2) | (value1 >> 4));

        // Padding may only close out the final group.
        if group[2] == PADDING {
            if !is_final_group || group[3] != PADDING {
                return Err(CodecError::MisplacedPadding {
                    position: group_index * 4 + 2,
                });
            }
            break;
        }
        let value2 = require(2)?;
        decoded.push((value1 << 4) | (value2 >> 2));

        if group[3] == PADDING {
            if !is_final_group {
                return Err(CodecError::MisplacedPadding {
                    position: group_index * 4 + 3,
                });
            }
            break;
        }
        let value3 = require(3)?;
        decoded.push((value2 << 6) | value3);
    }

    Ok(decoded)
}

fn symbol_value(symbol: u8) -> Option<u8> {
    match symbol {
        b'A'..=b'Z' => Some(symbol - b'A'),
        b'a'..=b'z' => Some(symbol - b'a' + 26),
        b'0'..=b'9' => Some(symbol - b'0' + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

/// Error type for decode failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Encoded length is not a whole number of four-symbol groups.
    #[error("encoded length {0} is not a multiple of four")]
    TruncatedGroup(usize),
    /// A symbol falls outside the base64 alphabet and padding set.
    #[error("invalid symbol {symbol:?} at position {position}")]
    InvalidSymbol {
        /// Offending symbol.
        symbol: char,
        /// Zero-based offset of the symbol in the encoded text.
        position: usize,
    },
    /// Padding appeared somewhere other than the tail of the final group.
    #[error("misplaced padding at position {position}")]
    MisplacedPadding {
        /// Zero-based offset of the padding symbol.
        position: usize,
    },
}
