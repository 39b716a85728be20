use super::board::{BOARD_SIZE, Board};
use super::error::{DatasetError, Result};
use super::types::{OUTCOME_SLOTS, RecordFormat};
use serde::Deserialize;
use shakmaty::{Color, Piece, Role};

pub const FEATURE_LEN: usize = BOARD_SIZE * BOARD_SIZE;

/// 64 signed magnitudes, rank 8 first. White positive, black negative.
pub type FeatureVector = [f32; FEATURE_LEN];

/// Magnitude per piece kind. Black pieces take the negated value.
///
/// Deserializes from JSON keyed by the uppercase symbol:
/// `{"K": 1.0, "Q": 0.9, "R": 0.5, "B": 0.3, "N": 0.3, "P": 0.1}`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PieceValues {
    #[serde(rename = "K")]
    pub king: f32,
    #[serde(rename = "Q")]
    pub queen: f32,
    #[serde(rename = "R")]
    pub rook: f32,
    #[serde(rename = "B")]
    pub bishop: f32,
    #[serde(rename = "N")]
    pub knight: f32,
    #[serde(rename = "P")]
    pub pawn: f32,
}

impl PieceValues {
    /// Table used with the `RES:`/`CHECKMATE:`/`FEN:` block corpora.
    pub const fn block() -> Self {
        Self {
            king: 1.0,
            queen: 0.9,
            rook: 0.5,
            bishop: 0.3,
            knight: 0.3,
            pawn: 0.1,
        }
    }

    /// Table used with the `;`-delimited FEN/RES corpora.
    pub const fn tabular() -> Self {
        Self {
            king: 1.0,
            queen: 0.7,
            rook: 0.7,
            bishop: 0.5,
            knight: 0.3,
            pawn: 0.1,
        }
    }

    pub const fn for_format(format: RecordFormat) -> Self {
        match format {
            RecordFormat::Block => Self::block(),
            RecordFormat::Tabular => Self::tabular(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let values: Self = serde_json::from_str(json)?;
        values.validate()?;
        Ok(values)
    }

    pub fn validate(&self) -> Result<()> {
        for (symbol, value) in [
            ('K', self.king),
            ('Q', self.queen),
            ('R', self.rook),
            ('B', self.bishop),
            ('N', self.knight),
            ('P', self.pawn),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DatasetError::InvalidConfig(format!(
                    "piece value for '{}' must be finite and non-negative, got {}",
                    symbol, value
                )));
            }
        }
        Ok(())
    }

    pub fn magnitude(&self, role: Role) -> f32 {
        match role {
            Role::King => self.king,
            Role::Queen => self.queen,
            Role::Rook => self.rook,
            Role::Bishop => self.bishop,
            Role::Knight => self.knight,
            Role::Pawn => self.pawn,
        }
    }

    pub fn signed(&self, piece: Piece) -> f32 {
        match piece.color {
            Color::White => self.magnitude(piece.role),
            Color::Black => -self.magnitude(piece.role),
        }
    }
}

impl Default for PieceValues {
    fn default() -> Self {
        Self::block()
    }
}

/// Flat training inputs and targets for one batch, row-major.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodedBatch {
    /// `len × 64`
    pub features: Vec<f32>,
    /// `len × 4`
    pub targets: Vec<f32>,
    pub len: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoardEncoder {
    values: PieceValues,
}

impl BoardEncoder {
    pub fn new(values: PieceValues) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &PieceValues {
        &self.values
    }

    pub fn encode(&self, board: &Board) -> FeatureVector {
        let mut vector = [0.0; FEATURE_LEN];
        for (idx, cell) in board.grid().iter().flatten().enumerate() {
            if let Some(piece) = cell {
                vector[idx] = self.values.signed(*piece);
            }
        }
        vector
    }

    pub fn encode_batch<'a, I>(&self, boards: I) -> EncodedBatch
    where
        I: IntoIterator<Item = &'a Board>,
    {
        let mut batch = EncodedBatch::default();
        for board in boards {
            batch.features.extend_from_slice(&self.encode(board));
            batch.targets.extend_from_slice(&board.outcome_vector());
            batch.len += 1;
        }
        debug_assert_eq!(batch.targets.len(), batch.len * OUTCOME_SLOTS);
        batch
    }
}
