/// Greedy merge loop: aggregate pairs, pick the winner, intern the joined
/// piece, rewrite the corpus, report. Strictly sequential; a merge is never
/// undone.
use log::{debug, info};

use crate::corpus::Corpus;
use crate::error::VocabError;
use crate::pairs::PairIndex;
use crate::report::{MergeRecord, Reporter};
use crate::symbols::{SymbolId, SymbolTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRule {
    pub new: SymbolId,
    pub left: SymbolId,
    pub right: SymbolId,
    pub freq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    DictSizeReached,
    PairsExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub rounds: usize,
    pub stop: StopReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Running,
    Terminated(StopReason),
}

pub struct MergeEngine {
    symbols: SymbolTable,
    corpus: Corpus,
    index: PairIndex,
    rules: Vec<MergeRule>,
    dict_size: usize,
    state: State,
}

impl MergeEngine {
    /// Fails when `dict_size` could not fit in the ids left after loading.
    pub fn new(symbols: SymbolTable, corpus: Corpus, dict_size: usize) -> Result<Self, VocabError> {
        let remaining = symbols.remaining();
        if dict_size > remaining {
            return Err(VocabError::DictSizeExceedsCapacity {
                got: dict_size,
                remaining,
                capacity: crate::symbols::MAX_SYMBOLS,
            });
        }
        debug!(
            "engine ready: {} entries, {} base symbols, {} ids free",
            corpus.len(),
            symbols.len(),
            remaining
        );
        Ok(MergeEngine {
            symbols,
            corpus,
            index: PairIndex::new(),
            rules: Vec::with_capacity(dict_size),
            dict_size,
            state: State::Running,
        })
    }

    /// Runs one round. Returns `false` once the engine has terminated.
    pub fn step<R: Reporter>(&mut self, reporter: &mut R) -> Result<bool, VocabError> {
        if self.state != State::Running {
            return Ok(false);
        }
        if self.rules.len() >= self.dict_size {
            self.state = State::Terminated(StopReason::DictSizeReached);
            return Ok(false);
        }
        let Some(best) = self.index.aggregate(&self.corpus) else {
            self.state = State::Terminated(StopReason::PairsExhausted);
            return Ok(false);
        };

        let (Some(left), Some(right)) = (
            self.symbols.piece_of(best.left),
            self.symbols.piece_of(best.right),
        ) else {
            return Err(VocabError::InconsistentPair {
                left: best.left,
                right: best.right,
                len: self.symbols.len(),
            });
        };
        let split = left.len();
        let joined = [left, right].concat();
        let new = self.symbols.intern(&joined)?;
        let shrunk = self.corpus.rewrite(best.left, best.right, new);

        let rank = self.rules.len();
        let rule = MergeRule {
            new,
            left: best.left,
            right: best.right,
            freq: best.freq,
        };
        debug!(
            "round {}: ({}, {}) -> {} freq={} entries={}",
            rank, rule.left, rule.right, rule.new, rule.freq, shrunk
        );
        self.rules.push(rule);

        let (left, right) = joined.split_at(split);
        reporter.emit(&MergeRecord {
            rank,
            piece: &joined,
            left,
            right,
            freq: best.freq,
        })?;
        Ok(true)
    }

    pub fn run<R: Reporter>(&mut self, reporter: &mut R) -> Result<RunSummary, VocabError> {
        while self.step(reporter)? {}
        let stop = match self.state {
            State::Terminated(reason) => reason,
            State::Running => StopReason::DictSizeReached,
        };
        info!(
            "merged {} of {} rounds ({:?}), vocabulary holds {} symbols",
            self.rules.len(),
            self.dict_size,
            stop,
            self.symbols.len()
        );
        Ok(RunSummary {
            rounds: self.rules.len(),
            stop,
        })
    }

    #[cfg(test)]
    pub fn rules(&self) -> &[MergeRule] {
        &self.rules
    }

    #[cfg(test)]
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }
}
