use super::SkipPolicy;
use crate::chess::error::{DatasetError, ExtractionReport, Result};
use crate::chess::types::{RawRecord, RecordFormat, RecordId};
use csv::{ReaderBuilder, StringRecordsIntoIter, Trim};
use std::io::Read;

pub const FEN_COLUMN: &str = "FEN";
pub const RES_COLUMN: &str = "RES";
const DELIMITER: u8 = b';';

/// Lazy iterator over `;`-delimited rows with `FEN` and `RES` columns.
///
/// Ordinals are data-row positions, so skipped rows leave gaps.
pub struct TabularExtractor<R: Read> {
    rows: StringRecordsIntoIter<R>,
    fen_idx: usize,
    res_idx: usize,
    source: usize,
    row: usize,
    policy: SkipPolicy,
    report: ExtractionReport,
    finished: bool,
}

impl<R: Read> TabularExtractor<R> {
    pub fn from_reader(reader: R, source: usize, policy: SkipPolicy) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?;
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|header| header == name)
                .ok_or(DatasetError::MissingColumn(name))
        };
        let fen_idx = column(FEN_COLUMN)?;
        let res_idx = column(RES_COLUMN)?;

        Ok(Self {
            rows: csv_reader.into_records(),
            fen_idx,
            res_idx,
            source,
            row: 0,
            policy,
            report: ExtractionReport::default(),
            finished: false,
        })
    }

    pub fn report(&self) -> &ExtractionReport {
        &self.report
    }

    pub fn into_report(self) -> ExtractionReport {
        self.report
    }
}

impl<R: Read> Iterator for TabularExtractor<R> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let row = match self.rows.next()? {
                Ok(row) => row,
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err.into()));
                }
            };
            let ordinal = self.row;
            self.row += 1;

            match (row.get(self.fen_idx), row.get(self.res_idx)) {
                (Some(fen), Some(res)) if !fen.is_empty() => {
                    return Some(Ok(RawRecord {
                        id: RecordId {
                            source: self.source,
                            ordinal,
                        },
                        format: RecordFormat::Tabular,
                        result_text: res.to_string(),
                        checkmate: None,
                        fen: fen.to_string(),
                    }));
                }
                _ => {
                    let excerpt = row.iter().collect::<Vec<_>>().join(";");
                    if let Err(err) =
                        self.policy
                            .handle(&mut self.report, format!("row {}", ordinal), &excerpt)
                    {
                        self.finished = true;
                        return Some(Err(err));
                    }
                }
            }
        }
        None
    }
}
