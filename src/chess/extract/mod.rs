use super::error::{DatasetError, ExtractionReport, Result};
use super::types::{RawRecord, RecordFormat};
use serde::Deserialize;

mod block;
mod tabular;

pub use block::BlockExtractor;
pub use tabular::TabularExtractor;

const EXCERPT_LEN: usize = 60;

/// What to do with a block or row that does not have the expected shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipPolicy {
    /// Drop it, count it in the `ExtractionReport` and log a warning.
    #[default]
    Lenient,
    /// Stop extraction with `DatasetError::UnmatchedInput`.
    Strict,
}

impl SkipPolicy {
    fn handle(
        self,
        report: &mut ExtractionReport,
        location: String,
        excerpt: &str,
    ) -> Result<()> {
        let excerpt = excerpt_of(excerpt);
        match self {
            Self::Lenient => {
                let msg = format!("skipped input at {}: '{}'", location, excerpt);
                log::warn!("{}", msg);
                report.push(&msg);
                Ok(())
            }
            Self::Strict => Err(DatasetError::UnmatchedInput { location, excerpt }),
        }
    }
}

fn excerpt_of(text: &str) -> String {
    let line = text.lines().next().unwrap_or("").trim();
    match line.char_indices().nth(EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &line[..idx]),
        None => line.to_string(),
    }
}

/// Eagerly extracts every record of one in-memory input.
pub fn extract_records(
    text: &str,
    format: RecordFormat,
    source: usize,
    policy: SkipPolicy,
) -> Result<(Vec<RawRecord>, ExtractionReport)> {
    match format {
        RecordFormat::Block => {
            let mut extractor = BlockExtractor::new(text, source, policy);
            let records = extractor.by_ref().collect::<Result<Vec<_>>>()?;
            Ok((records, extractor.into_report()))
        }
        RecordFormat::Tabular => {
            let mut extractor = TabularExtractor::from_reader(text.as_bytes(), source, policy)?;
            let records = extractor.by_ref().collect::<Result<Vec<_>>>()?;
            Ok((records, extractor.into_report()))
        }
    }
}
