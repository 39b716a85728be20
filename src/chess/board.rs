use super::error::{DatasetError, Result};
use super::types::{OUTCOME_SLOTS, Outcome, RawRecord, RecordId};
use shakmaty::{Color, Piece, Square};
use std::fmt;

pub const BOARD_SIZE: usize = 8;
pub const EMPTY_SYMBOL: char = '.';

/// Rank 8 first, file a first.
pub type Grid = [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE];

/// Trailing FEN fields, present only when the source carried a full FEN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenMetadata {
    pub side_to_move: Color,
    pub castling: String,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

/// A decoded position. Immutable once built; identity is its `RecordId`.
#[derive(Debug, Clone)]
pub struct Board {
    id: RecordId,
    grid: Grid,
    outcome: Outcome,
    checkmate: Option<bool>,
    metadata: Option<FenMetadata>,
}

impl Board {
    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Piece> {
        self.grid[row][col]
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn outcome_vector(&self) -> [f32; OUTCOME_SLOTS] {
        self.outcome.one_hot()
    }

    pub fn checkmate(&self) -> Option<bool> {
        self.checkmate
    }

    pub fn metadata(&self) -> Option<&FenMetadata> {
        self.metadata.as_ref()
    }

    pub fn side_to_move(&self) -> Option<Color> {
        self.metadata.as_ref().map(|m| m.side_to_move)
    }

    pub fn castling(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.castling.as_str())
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.metadata.as_ref().and_then(|m| m.en_passant)
    }

    pub fn halfmove_clock(&self) -> Option<u32> {
        self.metadata.as_ref().map(|m| m.halfmove_clock)
    }

    pub fn fullmove_number(&self) -> Option<u32> {
        self.metadata.as_ref().map(|m| m.fullmove_number)
    }

    /// Row rendered with `.` for empty cells.
    pub fn rank_symbols(&self, row: usize) -> [char; BOARD_SIZE] {
        self.grid[row].map(|cell| cell.map_or(EMPTY_SYMBOL, Piece::char))
    }

    /// Piece-placement field with maximal empty runs.
    pub fn placement(&self) -> String {
        let mut out = String::with_capacity(71);
        for (row_idx, row) in self.grid.iter().enumerate() {
            if row_idx > 0 {
                out.push('/');
            }
            let mut empty_run = 0u8;
            for cell in row {
                match cell {
                    Some(piece) => {
                        if empty_run > 0 {
                            out.push(char::from(b'0' + empty_run));
                            empty_run = 0;
                        }
                        out.push(piece.char());
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                out.push(char::from(b'0' + empty_run));
            }
        }
        out
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RES: {:?}", self.outcome_vector())?;
        match self.checkmate {
            Some(flag) => writeln!(f, "CHECKMATE: {}", flag)?,
            None => writeln!(f, "CHECKMATE: -")?,
        }
        for row in 0..BOARD_SIZE {
            let mut line = String::with_capacity(2 * BOARD_SIZE);
            for (col, symbol) in self.rank_symbols(row).iter().enumerate() {
                if col > 0 {
                    line.push(' ');
                }
                line.push(*symbol);
            }
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Decodes one extracted record into a `Board`.
///
/// The FEN is either a bare placement field or a full six-field FEN; any other
/// field count, a rank count other than 8, a rank that does not expand to
/// exactly 8 cells, or an unknown piece symbol is `MalformedRecord`.
pub fn decode(record: &RawRecord) -> Result<Board> {
    let malformed = |reason: String| DatasetError::MalformedRecord {
        record: record.id,
        reason,
    };

    let fields: Vec<&str> = record.fen.split_whitespace().collect();
    let (placement, rest) = match fields.split_first() {
        Some((placement, rest)) => (*placement, rest),
        None => return Err(malformed("empty FEN".to_string())),
    };

    let grid = parse_placement(placement).map_err(malformed)?;
    let metadata = match rest.len() {
        0 => None,
        5 => Some(parse_metadata(rest).map_err(malformed)?),
        n => {
            return Err(malformed(format!(
                "expected 1 or 6 FEN fields, found {}",
                n + 1
            )));
        }
    };

    Ok(Board {
        id: record.id,
        grid,
        outcome: Outcome::from_token(record.format, record.result_text.trim()),
        checkmate: record.checkmate,
        metadata,
    })
}

pub fn parse_placement(placement: &str) -> std::result::Result<Grid, String> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != BOARD_SIZE {
        return Err(format!(
            "placement '{}' has {} ranks, expected {}",
            placement,
            ranks.len(),
            BOARD_SIZE
        ));
    }

    let mut grid: Grid = [[None; BOARD_SIZE]; BOARD_SIZE];
    for (row, rank) in ranks.iter().enumerate() {
        grid[row] = parse_rank(rank)?;
    }
    Ok(grid)
}

fn parse_rank(rank: &str) -> std::result::Result<[Option<Piece>; BOARD_SIZE], String> {
    let mut cells = [None; BOARD_SIZE];
    let mut col = 0usize;

    for ch in rank.chars() {
        let (width, piece) = match ch {
            '1'..='8' => (ch as usize - '0' as usize, None),
            _ => {
                let piece = Piece::from_char(ch)
                    .ok_or_else(|| format!("unknown piece symbol '{}' in rank '{}'", ch, rank))?;
                (1, Some(piece))
            }
        };
        if col + width > BOARD_SIZE {
            return Err(format!("rank '{}' expands past {} cells", rank, BOARD_SIZE));
        }
        if piece.is_some() {
            cells[col] = piece;
        }
        col += width;
    }

    if col != BOARD_SIZE {
        return Err(format!(
            "rank '{}' expands to {} cells, expected {}",
            rank, col, BOARD_SIZE
        ));
    }
    Ok(cells)
}

fn parse_metadata(fields: &[&str]) -> std::result::Result<FenMetadata, String> {
    let [side, castling, en_passant, halfmove, fullmove] = fields else {
        return Err(format!("expected 5 metadata fields, found {}", fields.len()));
    };

    let side_to_move = match side.as_bytes() {
        [ch] => Color::from_char(char::from(*ch)),
        _ => None,
    }
    .ok_or_else(|| format!("invalid side to move '{}'", side))?;

    let en_passant = match *en_passant {
        "-" => None,
        square => Some(
            square
                .parse::<Square>()
                .map_err(|_| format!("invalid en passant square '{}'", square))?,
        ),
    };

    let halfmove_clock = halfmove
        .parse::<u32>()
        .map_err(|_| format!("invalid halfmove clock '{}'", halfmove))?;
    let fullmove_number = fullmove
        .parse::<u32>()
        .map_err(|_| format!("invalid fullmove number '{}'", fullmove))?;

    Ok(FenMetadata {
        side_to_move,
        castling: castling.to_string(),
        en_passant,
        halfmove_clock,
        fullmove_number,
    })
}
