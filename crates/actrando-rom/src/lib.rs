#![warn(missing_docs)]
//! # actrando-rom
//!
//! ## Purpose
//! Structural validation of candidate ROM images. A candidate is accepted
//! only when its size and internal-name header both match the expected
//! ActRaiser (USA) cartridge image.
//!
//! ## Error model
//! Validation is a pure boolean check; malformed or short input yields
//! `false`, never a panic or out-of-range read.

/// Byte length of a valid ROM image.
pub const ROM_SIZE: usize = 1_048_576;

/// Offset of the internal-name field inside the ROM header.
pub const INTERNAL_NAME_OFFSET: usize = 0x7FC0;

/// Expected internal name, padded with trailing spaces to the full
/// 21-byte field width.
pub const INTERNAL_NAME: &[u8; 21] = b"ACTRAISER-USA        ";

/// Returns `true` when `bytes` is a well-formed ROM of the expected variant.
///
/// # Semantics
/// The length check runs first so the internal-name window is never read on
/// short input.
pub fn is_valid_rom(bytes: &[u8]) -> bool {
    if bytes.len() != ROM_SIZE {
        return false;
    }

    let name_window = &bytes[INTERNAL_NAME_OFFSET..INTERNAL_NAME_OFFSET + INTERNAL_NAME.len()];
    name_window == INTERNAL_NAME
}
