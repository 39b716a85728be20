use super::SkipPolicy;
use crate::chess::error::{ExtractionReport, Result};
use crate::chess::types::{RawRecord, RecordFormat, RecordId};
use regex::Regex;
use std::sync::LazyLock;

static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?m)^[ \t]*RES:[ \t]*(?P<res>\S+)[ \t]*\r?\n",
        r"CHECKMATE:[ \t]*(?P<mate>True|False)[ \t]*\r?\n",
        r"FEN:[ \t]*(?P<fen>[PNBRQKpnbrqk0-9/]+",
        r"[ \t]+[wb]",
        r"[ \t]+(?:-|[KQkq]{1,4})",
        r"[ \t]+(?:-|[a-h][1-8])",
        r"[ \t]+\d+[ \t]+\d+)[ \t]*(?:\r?\n|$)",
    ))
    .expect("valid block triple regex")
});

const RES_KEYWORD: &str = "RES:";

// Only a keyword that opens a line counts; `SCORES:` in noise does not.
static RES_KEYWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*RES:").expect("valid result keyword regex"));

/// Lazy iterator over `RES:` / `CHECKMATE:` / `FEN:` triples in free text.
///
/// Text between triples is ignored, except that every `RES:` keyword that
/// does not open a well-formed triple counts as a skipped block.
pub struct BlockExtractor<'t> {
    text: &'t str,
    pos: usize,
    source: usize,
    ordinal: usize,
    policy: SkipPolicy,
    report: ExtractionReport,
    finished: bool,
}

impl<'t> BlockExtractor<'t> {
    pub fn new(text: &'t str, source: usize, policy: SkipPolicy) -> Self {
        Self {
            text,
            pos: 0,
            source,
            ordinal: 0,
            policy,
            report: ExtractionReport::default(),
            finished: false,
        }
    }

    pub fn report(&self) -> &ExtractionReport {
        &self.report
    }

    pub fn into_report(self) -> ExtractionReport {
        self.report
    }

    fn account_gap(&mut self, start: usize, end: usize) -> Result<()> {
        let text = self.text;
        let haystack = &text[..end];
        let mut at = start;
        while let Some(keyword) = RES_KEYWORD_RE.find_at(haystack, at) {
            let offset = keyword.end() - RES_KEYWORD.len();
            self.policy
                .handle(&mut self.report, format!("byte {}", offset), &text[offset..end])?;
            at = keyword.end();
        }
        Ok(())
    }
}

impl Iterator for BlockExtractor<'_> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let Some(caps) = BLOCK_RE.captures_at(self.text, self.pos) else {
            self.finished = true;
            return self.account_gap(self.pos, self.text.len()).err().map(Err);
        };

        let (start, end) = match caps.get(0) {
            Some(whole) => (whole.start(), whole.end()),
            None => (self.pos, self.text.len()),
        };
        if let Err(err) = self.account_gap(self.pos, start) {
            self.finished = true;
            return Some(Err(err));
        }
        self.pos = end;

        let id = RecordId {
            source: self.source,
            ordinal: self.ordinal,
        };
        self.ordinal += 1;

        Some(Ok(RawRecord {
            id,
            format: RecordFormat::Block,
            result_text: caps["res"].to_string(),
            checkmate: Some(&caps["mate"] == "True"),
            fen: caps["fen"].to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::error::DatasetError;

    fn collect(text: &str) -> (Vec<RawRecord>, ExtractionReport) {
        let mut extractor = BlockExtractor::new(text, 0, SkipPolicy::Lenient);
        let records = extractor.by_ref().collect::<Result<Vec<_>>>().unwrap();
        (records, extractor.into_report())
    }

    #[test]
    fn test_single_triple() {
        let (records, report) = collect(
            "RES: 1-0\nCHECKMATE: False\nFEN: 8/6k1/3B1b2/3Q4/p5qp/8/7K/8 w - - 32 82\n",
        );

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].result_text, "1-0");
        assert_eq!(records[0].checkmate, Some(false));
        assert_eq!(records[0].fen, "8/6k1/3B1b2/3Q4/p5qp/8/7K/8 w - - 32 82");
        assert_eq!(records[0].format, RecordFormat::Block);
        assert!(report.is_empty());
    }

    #[test]
    fn test_triples_with_noise_between() {
        let text = "\
Game 1 of the archive
RES: 1/2-1/2
CHECKMATE: False
FEN: 8/8/8/8/8/8/8/8 w - - 0 1
--- separator ---
RES:    0-1
CHECKMATE:   True
FEN:   rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3
trailing text";
        let (records, report) = collect(text);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].result_text, "1/2-1/2");
        assert_eq!(records[1].result_text, "0-1");
        assert_eq!(records[1].checkmate, Some(true));
        assert_eq!(
            records[1].fen,
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3"
        );
        assert_eq!(records[0].id.ordinal, 0);
        assert_eq!(records[1].id.ordinal, 1);
        assert!(report.is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        let (records, _) =
            collect("RES: *\r\nCHECKMATE: False\r\nFEN: 8/8/8/8/8/8/8/8 b - e3 12 40\r\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fen, "8/8/8/8/8/8/8/8 b - e3 12 40");
    }

    #[test]
    fn test_invalid_checkmate_token_is_skipped() {
        let (records, report) = collect(
            "RES: 1-0\nCHECKMATE: maybe\nFEN: 8/8/8/8/8/8/8/8 w - - 0 1\n\
             RES: 0-1\nCHECKMATE: True\nFEN: 8/8/8/8/8/8/8/8 w - - 0 1\n",
        );

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].result_text, "0-1");
        assert_eq!(report.skipped(), 1);
        assert!(report.messages().unwrap().contains("byte 0"));
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        let (records, report) =
            collect("res: 1-0\ncheckmate: False\nfen: 8/8/8/8/8/8/8/8 w - - 0 1\n");
        assert!(records.is_empty());
        assert!(report.is_empty());
    }

    #[test]
    fn test_out_of_order_lines_are_skipped() {
        let (records, report) =
            collect("RES: 1-0\nFEN: 8/8/8/8/8/8/8/8 w - - 0 1\nCHECKMATE: False\n");
        assert!(records.is_empty());
        assert_eq!(report.skipped(), 1);
    }

    #[test]
    fn test_fen_without_move_counters_is_skipped() {
        let (records, report) = collect("RES: 1-0\nCHECKMATE: False\nFEN: 8/8/8/8/8/8/8/8 w - -\n");
        assert!(records.is_empty());
        assert_eq!(report.skipped(), 1);
    }

    #[test]
    fn test_trailing_unmatched_block_is_counted() {
        let (records, report) = collect(
            "RES: 1-0\nCHECKMATE: False\nFEN: 8/8/8/8/8/8/8/8 w - - 0 1\nRES: 0-1\nCHECKMATE: Fal",
        );
        assert_eq!(records.len(), 1);
        assert_eq!(report.skipped(), 1);
    }

    #[test]
    fn test_strict_policy_stops_at_first_unmatched_block() {
        let text = "RES: 1-0\nCHECKMATE: nope\nFEN: 8/8/8/8/8/8/8/8 w - - 0 1\n\
                    RES: 0-1\nCHECKMATE: True\nFEN: 8/8/8/8/8/8/8/8 w - - 0 1\n";
        let mut extractor = BlockExtractor::new(text, 3, SkipPolicy::Strict);

        let first = extractor.next().unwrap();
        match first {
            Err(DatasetError::UnmatchedInput { location, excerpt }) => {
                assert_eq!(location, "byte 0");
                assert_eq!(excerpt, "RES: 1-0");
            }
            other => panic!("expected unmatched input, got {:?}", other),
        }
        assert!(extractor.next().is_none());
    }

    #[test]
    fn test_keyword_inside_noise_word_is_ignored() {
        let text = "SCORES: 12 points\nRES: 1-0\nCHECKMATE: False\nFEN: 8/8/8/8/8/8/8/8 w - - 0 1\n";

        let (records, report) = collect(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].result_text, "1-0");
        assert!(report.is_empty());

        let mut extractor = BlockExtractor::new(text, 0, SkipPolicy::Strict);
        let record = extractor.next().unwrap().unwrap();
        assert_eq!(record.fen, "8/8/8/8/8/8/8/8 w - - 0 1");
        assert!(extractor.next().is_none());
        assert!(extractor.report().is_empty());
    }

    #[test]
    fn test_indented_keyword_is_located_at_res() {
        let (records, report) = collect("  RES: 1-0\nCHECKMATE: nope\n");
        assert!(records.is_empty());
        assert_eq!(report.skipped(), 1);
        assert!(report.messages().unwrap().contains("byte 2: 'RES: 1-0'"));
    }

    #[test]
    fn test_overlong_rank_reaches_decode() {
        let (records, report) =
            collect("RES: 1-0\nCHECKMATE: False\nFEN: 9/8/8/8/8/8/8/8 w - - 0 1\n");
        assert_eq!(records.len(), 1);
        assert!(report.is_empty());

        let err = crate::chess::board::decode(&records[0]).unwrap_err();
        assert!(matches!(err, DatasetError::MalformedRecord { .. }));
    }

    #[test]
    fn test_junk_after_fullmove_counter_is_skipped() {
        let (records, report) =
            collect("RES: 1-0\nCHECKMATE: False\nFEN: 8/8/8/8/8/8/8/8 w - - 0 1abc\n");
        assert!(records.is_empty());
        assert_eq!(report.skipped(), 1);

        let (records, _) = collect("RES: 1-0\nCHECKMATE: False\nFEN: 8/8/8/8/8/8/8/8 w - - 0 1  ");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fen, "8/8/8/8/8/8/8/8 w - - 0 1");
    }

    #[test]
    fn test_source_is_carried_into_ids() {
        let mut extractor = BlockExtractor::new(
            "RES: 1-0\nCHECKMATE: False\nFEN: 8/8/8/8/8/8/8/8 w - - 0 1\n",
            7,
            SkipPolicy::Lenient,
        );
        let record = extractor.next().unwrap().unwrap();
        assert_eq!(record.id, RecordId { source: 7, ordinal: 0 });
        assert!(extractor.next().is_none());
        assert!(extractor.report().is_empty());
    }
}
