use crate::codec::{self, is_printable};
use crate::error::VocabError;
use crate::symbols::{SymbolId, SymbolTable};

/// One distinct input word: its current segmentation and its frequency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    pub symbols: Vec<SymbolId>,
    pub freq: u64,
}

#[derive(Debug, Default)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
}

/// Splits a decoded word into base symbols. The first unit carries the
/// word-start marker when it is printable; every later unit is interned raw.
pub fn segment(table: &mut SymbolTable, units: &[u16]) -> Result<Vec<SymbolId>, VocabError> {
    let mut ids = Vec::with_capacity(units.len());
    for (i, &unit) in units.iter().enumerate() {
        let id = if i == 0 && is_printable(unit) {
            table.intern(&codec::word_start_piece(unit))?
        } else {
            table.intern(&codec::unit_piece(unit))?
        };
        ids.push(id);
    }
    Ok(ids)
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_word(
        &mut self,
        table: &mut SymbolTable,
        units: &[u16],
        freq: u64,
    ) -> Result<(), VocabError> {
        let symbols = segment(table, units)?;
        self.entries.push(CorpusEntry { symbols, freq });
        Ok(())
    }

    #[cfg(test)]
    pub fn push_entry(&mut self, entry: CorpusEntry) {
        self.entries.push(entry);
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn freq(&self, entry: usize) -> u64 {
        self.entries[entry].freq
    }

    /// Calls `visit(left, right, entry, position)` for every adjacent pair,
    /// in entry order then position order.
    pub fn for_each_adjacent_pair<F>(&self, mut visit: F)
    where
        F: FnMut(SymbolId, SymbolId, usize, usize),
    {
        for (e, entry) in self.entries.iter().enumerate() {
            for (pos, w) in entry.symbols.windows(2).enumerate() {
                visit(w[0], w[1], e, pos);
            }
        }
    }

    /// Replaces every `left right` occurrence with `new_id` in one
    /// left-to-right pass per entry. A symbol produced in this pass is never
    /// paired again within the same pass. Returns how many entries shrank.
    pub fn rewrite(&mut self, left: SymbolId, right: SymbolId, new_id: SymbolId) -> usize {
        let mut changed = 0;
        for entry in &mut self.entries {
            let seq = &mut entry.symbols;
            let n = seq.len();
            let mut read = 0;
            let mut write = 0;
            while read < n {
                if read + 1 < n && seq[read] == left && seq[read + 1] == right {
                    seq[write] = new_id;
                    read += 2;
                } else {
                    seq[write] = seq[read];
                    read += 1;
                }
                write += 1;
            }
            if write < n {
                seq.truncate(write);
                changed += 1;
            }
        }
        changed
    }
}
