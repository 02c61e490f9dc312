use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VocabError {
    #[error("open file: {} failed: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dict size max: {max}, got {got}")]
    DictSizeTooLarge { got: usize, max: usize },

    #[error("dict size {got} exceeds remaining symbol space ({remaining} of {capacity} ids free)")]
    DictSizeExceedsCapacity {
        got: usize,
        remaining: usize,
        capacity: usize,
    },

    #[error("symbol table full: cannot intern more than {capacity} pieces")]
    SymbolCapacity { capacity: usize },

    #[error("invalid record pattern: {0}")]
    Pattern(#[from] fancy_regex::Error),

    #[error("undecodable word: {0}")]
    Decode(#[from] std::str::Utf8Error),

    #[error("winning pair ({left}, {right}) is outside the symbol table ({len} ids)")]
    InconsistentPair { left: u32, right: u32, len: usize },

    #[error("failed to write merge log: {0}")]
    Output(#[source] std::io::Error),
}
