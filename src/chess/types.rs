use serde::Deserialize;
use std::fmt;

/// Input shape a record was extracted from. Selects the result vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    /// `RES:` / `CHECKMATE:` / `FEN:` line triples with full FEN.
    Block,
    /// `;`-delimited rows with `FEN` (placement only) and `RES` columns.
    Tabular,
}

/// Where a record came from: input index and position within that input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    pub source: usize,
    pub ordinal: usize,
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}", self.source, self.ordinal)
    }
}

/// One extracted game record, consumed straight away by the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub id: RecordId,
    pub format: RecordFormat,
    pub result_text: String,
    pub checkmate: Option<bool>,
    pub fen: String,
}

/// Game outcome, laid out in the slot order of the one-hot target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    WhiteWins = 0,
    BlackWins = 1,
    Draw = 2,
    Unknown = 3,
}

pub const OUTCOME_SLOTS: usize = 4;

impl Outcome {
    /// Maps a result token; anything outside the format's vocabulary is `Unknown`.
    pub fn from_token(format: RecordFormat, token: &str) -> Self {
        match (format, token) {
            (RecordFormat::Block, "1-0") | (RecordFormat::Tabular, "white") => Self::WhiteWins,
            (RecordFormat::Block, "0-1") | (RecordFormat::Tabular, "black") => Self::BlackWins,
            (RecordFormat::Block, "1/2-1/2") | (RecordFormat::Tabular, "pat") => Self::Draw,
            _ => Self::Unknown,
        }
    }

    pub const fn slot(self) -> usize {
        self as usize
    }

    pub fn one_hot(self) -> [f32; OUTCOME_SLOTS] {
        let mut vector = [0.0; OUTCOME_SLOTS];
        vector[self.slot()] = 1.0;
        vector
    }
}
