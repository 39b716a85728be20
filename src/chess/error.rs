use super::sampler::Partition;
use super::types::RecordId;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("malformed record {record}: {reason}")]
    MalformedRecord { record: RecordId, reason: String },

    #[error("unmatched input at {location}: '{excerpt}'")]
    UnmatchedInput { location: String, excerpt: String },

    #[error("missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("requested {requested} boards from the {partition} pool but only {available} are available")]
    SampleSizeExceeded {
        requested: usize,
        available: usize,
        partition: Partition,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid path pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

pub type Result<T> = std::result::Result<T, DatasetError>;

/// Tally of inputs the extractors dropped, with a `"; "`-joined trail of why.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    skipped: usize,
    messages: Option<String>,
}

impl ExtractionReport {
    pub fn push(&mut self, msg: &str) {
        self.skipped += 1;
        match &mut self.messages {
            Some(existing) => {
                existing.push_str("; ");
                existing.push_str(msg);
            }
            None => {
                self.messages = Some(msg.to_string());
            }
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn messages(&self) -> Option<&str> {
        self.messages.as_deref()
    }

    pub fn take(&mut self) -> Option<String> {
        self.skipped = 0;
        self.messages.take()
    }

    pub fn is_empty(&self) -> bool {
        self.skipped == 0
    }

    /// Folds another report into this one, keeping message order.
    pub fn merge(&mut self, mut other: ExtractionReport) {
        let count = other.skipped;
        if let Some(trail) = other.take() {
            match &mut self.messages {
                Some(existing) => {
                    existing.push_str("; ");
                    existing.push_str(&trail);
                }
                None => self.messages = Some(trail),
            }
        }
        self.skipped += count;
    }
}
