pub mod board;
pub mod config;
pub mod dataset;
pub mod encoder;
pub mod error;
pub mod extract;
pub mod input;
pub mod logging;
pub mod sampler;
pub mod types;

pub use board::{Board, FenMetadata, Grid, decode};
pub use config::DatasetConfig;
pub use dataset::Dataset;
pub use encoder::{BoardEncoder, EncodedBatch, FeatureVector, PieceValues};
pub use error::{DatasetError, ExtractionReport, Result};
pub use extract::{BlockExtractor, SkipPolicy, TabularExtractor, extract_records};
pub use input::Compression;
pub use sampler::{Batch, BatchSampler, Partition, SamplingMode, SharedSampler};
pub use types::{Outcome, RawRecord, RecordFormat, RecordId};
