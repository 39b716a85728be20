use super::encoder::PieceValues;
use super::error::{DatasetError, Result};
use super::extract::SkipPolicy;
use super::input::Compression;
use super::sampler::SamplingMode;
use super::types::RecordFormat;
use serde::Deserialize;

/// Per-deployment settings for loading and sampling a corpus.
///
/// ```json
/// {
///   "format": "tabular",
///   "compression": "zstd",
///   "piece_values": {"K": 1.0, "Q": 0.7, "R": 0.7, "B": 0.5, "N": 0.3, "P": 0.1},
///   "skip_policy": "strict",
///   "sampling": "draining",
///   "train_fraction": 0.8,
///   "seed": 7
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetConfig {
    pub format: RecordFormat,
    #[serde(default)]
    pub compression: Compression,
    #[serde(default)]
    pub piece_values: Option<PieceValues>,
    #[serde(default)]
    pub skip_policy: SkipPolicy,
    #[serde(default)]
    pub sampling: SamplingMode,
    #[serde(default)]
    pub train_fraction: Option<f64>,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl DatasetConfig {
    pub fn new(format: RecordFormat) -> Self {
        Self {
            format,
            compression: Compression::Plain,
            piece_values: None,
            skip_policy: SkipPolicy::Lenient,
            sampling: SamplingMode::Preserving,
            train_fraction: None,
            seed: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(values) = &self.piece_values {
            values.validate()?;
        }
        if let Some(fraction) = self.train_fraction {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(DatasetError::InvalidConfig(format!(
                    "train_fraction must be within [0, 1], got {}",
                    fraction
                )));
            }
        }
        Ok(())
    }

    /// Explicit table, or the preset that goes with the input format.
    pub fn piece_values(&self) -> PieceValues {
        self.piece_values
            .unwrap_or_else(|| PieceValues::for_format(self.format))
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_piece_values(mut self, values: PieceValues) -> Self {
        self.piece_values = Some(values);
        self
    }

    pub fn with_skip_policy(mut self, policy: SkipPolicy) -> Self {
        self.skip_policy = policy;
        self
    }

    pub fn with_sampling(mut self, mode: SamplingMode) -> Self {
        self.sampling = mode;
        self
    }

    pub fn with_split(mut self, train_fraction: f64) -> Self {
        self.train_fraction = Some(train_fraction);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
