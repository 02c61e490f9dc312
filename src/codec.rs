/// Fixed-width code-unit codec.
///
/// Words are decoded from UTF-8 into UTF-16 code units so that every unit
/// becomes exactly one base symbol. Pieces are stored as raw little-endian
/// unit bytes, two bytes per unit, and re-encoded to UTF-8 only for display.
use crate::error::VocabError;

/// Unit prepended to the first unit of a word (`'_'`).
pub const WORD_START: u16 = 0x005F;

/// Byte-order marker unit.
pub const BOM: u16 = 0xFEFF;

pub trait Codec: Sync {
    fn decode(&self, utf8: &[u8]) -> Result<Vec<u16>, VocabError>;
    fn encode(&self, units: &[u16]) -> String;
}

/// UTF-8 <-> UTF-16 code units. Stateless: never emits a byte-order marker.
#[derive(Debug, Default, Clone, Copy)]
pub struct Utf16Codec;

impl Codec for Utf16Codec {
    fn decode(&self, utf8: &[u8]) -> Result<Vec<u16>, VocabError> {
        let text = std::str::from_utf8(utf8)?;
        Ok(text.encode_utf16().collect())
    }

    /// Unpaired surrogates are dropped rather than replaced.
    fn encode(&self, units: &[u16]) -> String {
        char::decode_utf16(units.iter().copied())
            .filter_map(Result::ok)
            .collect()
    }
}

/// Single-byte-range unit: high byte zero, low byte non-zero.
#[inline]
pub fn is_printable(unit: u16) -> bool {
    unit != 0 && unit <= 0x00FF
}

pub fn unit_piece(unit: u16) -> Vec<u8> {
    unit.to_le_bytes().to_vec()
}

pub fn word_start_piece(unit: u16) -> Vec<u8> {
    let mut piece = Vec::with_capacity(4);
    piece.extend_from_slice(&WORD_START.to_le_bytes());
    piece.extend_from_slice(&unit.to_le_bytes());
    piece
}

pub fn piece_units(piece: &[u8]) -> Vec<u16> {
    piece
        .chunks_exact(2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .collect()
}

pub fn display<C: Codec + ?Sized>(codec: &C, piece: &[u8]) -> String {
    codec.encode(&piece_units(piece))
}
