use super::board::{Board, decode};
use super::config::DatasetConfig;
use super::encoder::BoardEncoder;
use super::error::{ExtractionReport, Result};
use super::extract::extract_records;
use super::input::{expand_paths, read_to_string};
use super::sampler::BatchSampler;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Decoded boards of one corpus plus what was skipped while reading it.
#[derive(Debug, Clone)]
pub struct Dataset {
    config: DatasetConfig,
    boards: Vec<Board>,
    report: ExtractionReport,
}

impl Dataset {
    /// Reads every file matched by `pattern`.
    ///
    /// With several files an unreadable one is logged and skipped; a single
    /// unreadable file is an error. Malformed FENs always fail the load.
    pub fn load(pattern: &str, config: &DatasetConfig) -> Result<Self> {
        config.validate()?;
        let paths = expand_paths(pattern)?;
        if paths.is_empty() {
            log::warn!("no input files match '{}'", pattern);
        }

        let mut dataset = Self::empty(config);
        for (source, path) in paths.iter().enumerate() {
            let content = match read_to_string(path, config.compression) {
                Ok(content) => content,
                Err(err) if paths.len() > 1 => {
                    log::warn!("{}", err);
                    continue;
                }
                Err(err) => return Err(err),
            };
            dataset.ingest(&content, source)?;
        }

        log::info!(
            "loaded {} boards from {} file(s), {} input(s) skipped",
            dataset.boards.len(),
            paths.len(),
            dataset.report.skipped()
        );
        Ok(dataset)
    }

    pub fn from_text(text: &str, config: &DatasetConfig) -> Result<Self> {
        config.validate()?;
        let mut dataset = Self::empty(config);
        dataset.ingest(text, 0)?;
        Ok(dataset)
    }

    fn empty(config: &DatasetConfig) -> Self {
        Self {
            config: config.clone(),
            boards: Vec::new(),
            report: ExtractionReport::default(),
        }
    }

    fn ingest(&mut self, text: &str, source: usize) -> Result<()> {
        let (records, report) =
            extract_records(text, self.config.format, source, self.config.skip_policy)?;
        self.boards.reserve(records.len());
        for record in &records {
            self.boards.push(decode(record)?);
        }
        self.report.merge(report);
        Ok(())
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn report(&self) -> &ExtractionReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    /// Encoder using the configured piece-value table.
    pub fn encoder(&self) -> BoardEncoder {
        BoardEncoder::new(self.config.piece_values())
    }

    /// Hands the boards to a sampler, split and mode taken from the config.
    pub fn into_sampler<R: Rng>(self, rng: R) -> Result<BatchSampler<R>> {
        match self.config.train_fraction {
            Some(fraction) => {
                BatchSampler::with_split(self.boards, fraction, self.config.sampling, rng)
            }
            None => Ok(BatchSampler::new(self.boards, self.config.sampling, rng)),
        }
    }

    /// Like `into_sampler`, seeded from the config or from OS entropy.
    pub fn into_seeded_sampler(self) -> Result<BatchSampler<StdRng>> {
        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.into_sampler(rng)
    }
}
