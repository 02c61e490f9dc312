use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;

use crate::corpus::Corpus;
use crate::symbols::{pack_pair, unpack_pair, SymbolId};

/// Winner of one aggregation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestPair {
    pub left: SymbolId,
    pub right: SymbolId,
    pub freq: u64,
}

/// Sparse pair-frequency accumulator keyed by packed pair.
///
/// Scratch state reused across rounds: both the counters and the
/// discovery list are empty before and after every `aggregate` call, while
/// their allocations are kept.
#[derive(Debug, Default)]
pub struct PairIndex {
    counts: FxHashMap<u64, u64>,
    discovered: Vec<u64>,
}

impl PairIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts every adjacent pair in `corpus` weighted by entry frequency and
    /// returns the most frequent one. Ties go to the pair discovered first.
    /// `None` when no entry has two or more symbols.
    pub fn aggregate(&mut self, corpus: &Corpus) -> Option<BestPair> {
        let counts = &mut self.counts;
        let discovered = &mut self.discovered;
        corpus.for_each_adjacent_pair(|left, right, entry, _| {
            let key = pack_pair(left, right);
            let freq = corpus.freq(entry);
            match counts.entry(key) {
                Entry::Occupied(mut o) => *o.get_mut() += freq,
                Entry::Vacant(v) => {
                    v.insert(freq);
                    discovered.push(key);
                }
            }
        });

        let mut best: Option<(u64, u64)> = None;
        for &key in discovered.iter() {
            let freq = counts.get(&key).copied().unwrap_or(0);
            if best.map_or(true, |(_, f)| freq > f) {
                best = Some((key, freq));
            }
        }

        counts.clear();
        discovered.clear();

        best.map(|(key, freq)| {
            let (left, right) = unpack_pair(key);
            BestPair { left, right, freq }
        })
    }

    #[cfg(test)]
    pub fn is_clear(&self) -> bool {
        self.counts.is_empty() && self.discovered.is_empty()
    }
}
