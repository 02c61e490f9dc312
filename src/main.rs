mod codec;
mod corpus;
mod engine;
mod error;
mod pairs;
mod reader;
mod report;
mod symbols;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use env_logger::Env;
use log::LevelFilter;

use crate::codec::Utf16Codec;
use crate::engine::{MergeEngine, RunSummary};
use crate::error::VocabError;
use crate::reader::LoadOptions;
use crate::report::{MergeLog, OutputFormat};

/// Largest accepted round count.
const MAX_DICT_SIZE: usize = (1 << 16) - 1;

#[derive(Parser, Debug)]
#[command(
    name = "bpevocab",
    version,
    about = "Learn a byte-pair-encoding merge table from a word frequency list"
)]
struct Config {
    /// Corpus file, one `<word> <id> <freq>` record per line
    corpus: PathBuf,

    /// Maximum number of merge rounds
    dict_size: usize,

    /// Merge log format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// NFC-normalize words before splitting them into symbols
    #[arg(long)]
    nfc: bool,

    /// Write the merge log to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease log verbosity
    #[arg(short = 'q', long, action = ArgAction::Count)]
    quiet: u8,
}

impl Config {
    fn validate(&self) -> Result<(), VocabError> {
        if self.dict_size > MAX_DICT_SIZE {
            return Err(VocabError::DictSizeTooLarge {
                got: self.dict_size,
                max: MAX_DICT_SIZE,
            });
        }
        Ok(())
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    builder.format_timestamp_millis();
    let level = match (quiet, verbose) {
        (0, 0) => None,
        (0, 1) => Some(LevelFilter::Info),
        (0, 2) => Some(LevelFilter::Debug),
        (0, _) => Some(LevelFilter::Trace),
        (1, _) => Some(LevelFilter::Error),
        _ => Some(LevelFilter::Off),
    };
    if let Some(level) = level {
        builder.filter_level(level);
    }
    let _ = builder.try_init();
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => {
            let file = File::create(p).with_context(|| format!("creating {}", p.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    })
}

fn run(config: &Config) -> Result<RunSummary> {
    config.validate()?;

    let codec = Utf16Codec;
    let opts = LoadOptions { nfc: config.nfc };
    let loaded = reader::load_corpus(&config.corpus, &codec, &opts)?;
    let mut engine = MergeEngine::new(loaded.symbols, loaded.corpus, config.dict_size)?;

    let out = open_output(config.output.as_deref())?;
    let mut log = MergeLog::new(out, codec, config.format);
    let summary = engine.run(&mut log).context("merge loop aborted")?;
    Ok(summary)
}

fn main() {
    let config = Config::parse();
    init_logging(config.verbose, config.quiet);

    if let Err(e) = run(&config) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
