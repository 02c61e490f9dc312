use rustc_hash::FxHashMap;

use crate::error::VocabError;

pub type SymbolId = u32;

/// Bits per symbol id; a pair of ids packs into `2 * ID_BITS` bits.
pub const ID_BITS: u32 = 17;
pub const MAX_SYMBOLS: usize = 1 << ID_BITS;

const ID_MASK: u64 = (1 << ID_BITS) - 1;

#[inline]
pub fn pack_pair(left: SymbolId, right: SymbolId) -> u64 {
    (u64::from(left) << ID_BITS) | u64::from(right)
}

#[inline]
pub fn unpack_pair(key: u64) -> (SymbolId, SymbolId) {
    ((key >> ID_BITS) as SymbolId, (key & ID_MASK) as SymbolId)
}

/// Append-only piece interner. Ids are dense and assigned in creation order.
#[derive(Debug, Default)]
pub struct SymbolTable {
    pieces: Vec<Vec<u8>>,
    ids: FxHashMap<Vec<u8>, SymbolId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, piece: &[u8]) -> Result<SymbolId, VocabError> {
        if let Some(&id) = self.ids.get(piece) {
            return Ok(id);
        }
        if self.pieces.len() >= MAX_SYMBOLS {
            return Err(VocabError::SymbolCapacity {
                capacity: MAX_SYMBOLS,
            });
        }
        let id = self.pieces.len() as SymbolId;
        self.pieces.push(piece.to_vec());
        self.ids.insert(piece.to_vec(), id);
        Ok(id)
    }

    pub fn piece_of(&self, id: SymbolId) -> Option<&[u8]> {
        self.pieces.get(id as usize).map(Vec::as_slice)
    }

    #[cfg(test)]
    pub fn id_of(&self, piece: &[u8]) -> Option<SymbolId> {
        self.ids.get(piece).copied()
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn remaining(&self) -> usize {
        MAX_SYMBOLS - self.pieces.len()
    }
}
