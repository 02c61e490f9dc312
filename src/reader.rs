/// Word-frequency corpus reader.
///
/// One record per line: `<word> <id> <freq>`. The id is ignored. Lines that
/// do not match, or whose word does not decode, are skipped. Decoding runs on
/// the rayon pool for large inputs; interning stays sequential so symbol ids
/// follow input order.
use std::fs;
use std::path::Path;

use log::{info, trace};
use rayon::prelude::*;
use unicode_normalization::UnicodeNormalization;

use crate::codec::{Codec, BOM};
use crate::corpus::Corpus;
use crate::error::VocabError;
use crate::symbols::SymbolTable;

/// Numeric tail after the word: signed id, then unsigned frequency.
const RECORD_TAIL_PAT: &str = r"^\s+[+-]?[0-9]+\s+\+?([0-9]+)";

const PARALLEL_MIN_LINES: usize = 4096;

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    pub nfc: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub lines: usize,
    pub words: usize,
    pub skipped_malformed: usize,
    pub skipped_undecodable: usize,
}

#[derive(Debug)]
pub struct Loaded {
    pub symbols: SymbolTable,
    pub corpus: Corpus,
    pub stats: LoadStats,
}

enum Line {
    Blank,
    Malformed,
    Undecodable,
    Word { units: Vec<u16>, freq: u64 },
}

pub struct RecordParser {
    tail: fancy_regex::Regex,
}

impl RecordParser {
    pub fn new() -> Result<Self, VocabError> {
        Ok(RecordParser {
            tail: fancy_regex::Regex::new(RECORD_TAIL_PAT)?,
        })
    }

    /// Splits a raw line into its word bytes and frequency.
    pub fn parse<'a>(&self, line: &'a [u8]) -> Option<(&'a [u8], u64)> {
        let start = line.iter().position(|b| !b.is_ascii_whitespace())?;
        let rest = &line[start..];
        let end = rest
            .iter()
            .position(|b| b.is_ascii_whitespace())
            .unwrap_or(rest.len());
        let (word, tail) = rest.split_at(end);
        // Only the numeric fields must be text; trailing bytes are ignored.
        let tail = match std::str::from_utf8(tail) {
            Ok(t) => t,
            Err(e) => std::str::from_utf8(&tail[..e.valid_up_to()]).ok()?,
        };
        let caps = self.tail.captures(tail).ok()??;
        let freq = caps.get(1)?.as_str().parse::<u64>().ok()?;
        Some((word, freq))
    }
}

fn classify<C: Codec>(
    parser: &RecordParser,
    codec: &C,
    opts: &LoadOptions,
    first: bool,
    line: &[u8],
) -> Line {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    if line.iter().all(u8::is_ascii_whitespace) {
        return Line::Blank;
    }
    let Some((word, freq)) = parser.parse(line) else {
        return Line::Malformed;
    };
    let decoded = if opts.nfc {
        std::str::from_utf8(word)
            .map_err(VocabError::from)
            .and_then(|w| codec.decode(w.nfc().collect::<String>().as_bytes()))
    } else {
        codec.decode(word)
    };
    let mut units = match decoded {
        Ok(units) => units,
        Err(_) => return Line::Undecodable,
    };
    if first && units.first() == Some(&BOM) {
        units.remove(0);
    }
    Line::Word { units, freq }
}

pub fn load_bytes<C: Codec>(
    data: &[u8],
    codec: &C,
    opts: &LoadOptions,
) -> Result<Loaded, VocabError> {
    let parser = RecordParser::new()?;
    let lines: Vec<&[u8]> = data.split(|&b| b == b'\n').collect();

    let decode = |(i, line): (usize, &&[u8])| classify(&parser, codec, opts, i == 0, line);
    let classified: Vec<Line> = if lines.len() >= PARALLEL_MIN_LINES {
        lines.par_iter().enumerate().map(decode).collect()
    } else {
        lines.iter().enumerate().map(decode).collect()
    };

    let mut symbols = SymbolTable::new();
    let mut corpus = Corpus::new();
    let mut stats = LoadStats::default();
    for (i, line) in classified.into_iter().enumerate() {
        match line {
            Line::Blank => continue,
            Line::Malformed => {
                trace!("line {}: malformed record skipped", i + 1);
                stats.skipped_malformed += 1;
            }
            Line::Undecodable => {
                trace!("line {}: undecodable word skipped", i + 1);
                stats.skipped_undecodable += 1;
            }
            Line::Word { units, freq } => {
                corpus.push_word(&mut symbols, &units, freq)?;
                stats.words += 1;
            }
        }
        stats.lines += 1;
    }

    Ok(Loaded {
        symbols,
        corpus,
        stats,
    })
}

pub fn load_corpus<C: Codec>(
    path: &Path,
    codec: &C,
    opts: &LoadOptions,
) -> Result<Loaded, VocabError> {
    let data = fs::read(path).map_err(|source| VocabError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let loaded = load_bytes(&data, codec, opts)?;
    info!(
        "loaded {} words from {} ({} lines, {} malformed, {} undecodable), {} base symbols",
        loaded.stats.words,
        path.display(),
        loaded.stats.lines,
        loaded.stats.skipped_malformed,
        loaded.stats.skipped_undecodable,
        loaded.symbols.len()
    );
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::codec::{unit_piece, word_start_piece, Utf16Codec};

    fn load(data: &[u8]) -> Loaded {
        load_bytes(data, &Utf16Codec, &LoadOptions::default()).unwrap()
    }

    #[test]
    fn parses_word_id_freq() {
        let parser = RecordParser::new().unwrap();
        assert_eq!(parser.parse(b"hello 12 40"), Some((&b"hello"[..], 40)));
        assert_eq!(parser.parse(b"  x\t-3   7 trailing"), Some((&b"x"[..], 7)));
        assert_eq!(parser.parse(b"hello 12"), None);
        assert_eq!(parser.parse(b"hello twelve 40"), None);
        assert_eq!(parser.parse(b"hello 1 -40"), None);
    }

    #[test]
    fn malformed_and_blank_lines_are_skipped() {
        let loaded = load(b"aa 1 5\n\nbroken\nab 2 3\nxy 3\n");
        assert_eq!(loaded.corpus.len(), 2);
        assert_eq!(
            loaded.stats,
            LoadStats { lines: 4, words: 2, skipped_malformed: 2, skipped_undecodable: 0 }
        );
        assert_eq!(loaded.corpus.entries()[0].freq, 5);
        assert_eq!(loaded.corpus.entries()[1].freq, 3);
    }

    #[test]
    fn non_utf8_trailing_bytes_do_not_drop_the_record() {
        let parser = RecordParser::new().unwrap();
        assert_eq!(parser.parse(b"ab 1 5 \xFF"), Some((&b"ab"[..], 5)));
        // invalid bytes inside the numeric fields still reject the line
        assert_eq!(parser.parse(b"ab 1 \xFF5"), None);

        let loaded = load(b"ab 1 5 \xFF\xFE\ncd 2 3 \xC3\xA9x\n");
        assert_eq!(
            loaded.stats,
            LoadStats { lines: 2, words: 2, skipped_malformed: 0, skipped_undecodable: 0 }
        );
        assert_eq!(loaded.corpus.entries()[0].freq, 5);
        assert_eq!(loaded.corpus.entries()[1].freq, 3);
    }

    #[test]
    fn undecodable_word_is_skipped_not_fatal() {
        let loaded = load(b"a\xFFb 1 5\ncd 2 1\r\n");
        assert_eq!(loaded.stats.skipped_undecodable, 1);
        assert_eq!(loaded.corpus.len(), 1);
        assert_eq!(loaded.corpus.entries()[0].symbols.len(), 2);
    }

    #[test]
    fn leading_bom_is_dropped_from_first_record_only() {
        let loaded = load("\u{FEFF}ab 1 2\n\u{FEFF}ab 1 2\n".as_bytes());
        let first = &loaded.corpus.entries()[0].symbols;
        let second = &loaded.corpus.entries()[1].symbols;
        assert_eq!(first.len(), 2);
        assert_eq!(
            loaded.symbols.piece_of(first[0]),
            Some(word_start_piece(u16::from(b'a')).as_slice())
        );
        // mid-file BOM is an ordinary unit and is not printable
        assert_eq!(second.len(), 3);
        assert_eq!(
            loaded.symbols.piece_of(second[0]),
            Some(unit_piece(BOM).as_slice())
        );
    }

    #[test]
    fn nfc_composes_before_decoding() {
        let data = "e\u{0301}t 1 1\n".as_bytes();
        let plain = load(data);
        let nfc = load_bytes(data, &Utf16Codec, &LoadOptions { nfc: true }).unwrap();
        assert_eq!(plain.corpus.entries()[0].symbols.len(), 3);
        assert_eq!(nfc.corpus.entries()[0].symbols.len(), 2);
    }

    #[test]
    fn parallel_load_assigns_same_ids_as_sequential() {
        let mut data = Vec::new();
        for i in 0..PARALLEL_MIN_LINES + 10 {
            writeln!(data, "w{}x {} {}", i % 97, i, i % 13).unwrap();
        }
        let big = load(&data);
        let mut symbols = SymbolTable::new();
        let mut corpus = Corpus::new();
        for i in 0..PARALLEL_MIN_LINES + 10 {
            let word = format!("w{}x", i % 97);
            let units: Vec<u16> = word.encode_utf16().collect();
            corpus.push_word(&mut symbols, &units, (i % 13) as u64).unwrap();
        }
        assert_eq!(big.corpus.entries(), corpus.entries());
        assert_eq!(big.symbols.len(), symbols.len());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_corpus(&dir.path().join("nope.txt"), &Utf16Codec, &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, VocabError::Io { .. }));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"aa 1 5\nab 2 3\n").unwrap();
        let loaded = load_corpus(file.path(), &Utf16Codec, &LoadOptions::default()).unwrap();
        assert_eq!(loaded.stats.words, 2);
        // _a, a, b
        assert_eq!(loaded.symbols.len(), 3);
    }
}
