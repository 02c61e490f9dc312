/// Merge log writer. Every emitted rule is written and flushed before the
/// next round starts, so an interrupted run leaves a usable prefix.
use std::io::Write;

use crate::codec::{self, Codec};
use crate::error::VocabError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// `<piece> <left> <right>`
    Text,
    /// One JSON object per line
    Json,
}

/// One round's merge in raw piece form.
#[derive(Debug, Clone, Copy)]
pub struct MergeRecord<'a> {
    pub rank: usize,
    pub piece: &'a [u8],
    pub left: &'a [u8],
    pub right: &'a [u8],
    pub freq: u64,
}

pub trait Reporter {
    fn emit(&mut self, record: &MergeRecord<'_>) -> Result<(), VocabError>;
}

pub struct MergeLog<W: Write, C: Codec> {
    out: W,
    codec: C,
    format: OutputFormat,
}

impl<W: Write, C: Codec> MergeLog<W, C> {
    pub fn new(out: W, codec: C, format: OutputFormat) -> Self {
        MergeLog { out, codec, format }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn format_line(&self, record: &MergeRecord<'_>) -> String {
        let piece = codec::display(&self.codec, record.piece);
        let left = codec::display(&self.codec, record.left);
        let right = codec::display(&self.codec, record.right);
        match self.format {
            OutputFormat::Text => format!("{} {} {}", piece, left, right),
            OutputFormat::Json => serde_json::json!({
                "rank": record.rank,
                "piece": piece,
                "left": left,
                "right": right,
                "freq": record.freq,
            })
            .to_string(),
        }
    }
}

impl<W: Write, C: Codec> Reporter for MergeLog<W, C> {
    fn emit(&mut self, record: &MergeRecord<'_>) -> Result<(), VocabError> {
        let line = self.format_line(record);
        writeln!(self.out, "{}", line).map_err(VocabError::Output)?;
        self.out.flush().map_err(VocabError::Output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{unit_piece, word_start_piece, Utf16Codec};

    fn pieces() -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        let left = word_start_piece(u16::from(b'a'));
        let right = unit_piece(u16::from(b'b'));
        let piece = [left.as_slice(), right.as_slice()].concat();
        (piece, left, right)
    }

    #[test]
    fn text_line_lists_piece_then_constituents() {
        let (piece, left, right) = pieces();
        let mut log = MergeLog::new(Vec::new(), Utf16Codec, OutputFormat::Text);
        let record = MergeRecord { rank: 0, piece: &piece, left: &left, right: &right, freq: 3 };
        log.emit(&record).unwrap();
        log.emit(&record).unwrap();
        let out = String::from_utf8(log.into_inner()).unwrap();
        assert_eq!(out, "_ab _a b\n_ab _a b\n");
    }

    #[test]
    fn json_line_carries_rank_and_frequency() {
        let (piece, left, right) = pieces();
        let mut log = MergeLog::new(Vec::new(), Utf16Codec, OutputFormat::Json);
        log.emit(&MergeRecord { rank: 4, piece: &piece, left: &left, right: &right, freq: 17 })
            .unwrap();
        let out = String::from_utf8(log.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(value["rank"], 4);
        assert_eq!(value["piece"], "_ab");
        assert_eq!(value["left"], "_a");
        assert_eq!(value["right"], "b");
        assert_eq!(value["freq"], 17);
    }
}
