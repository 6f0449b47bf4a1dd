//! Feature extraction pipeline: raw lines → records → feature matrix.

use super::{extract, to_features, to_matrix, FeatureVector, LogRecord};
use ndarray::Array2;
use tracing::debug;

/// Parsed records and their feature rows, index-aligned and in input order.
#[derive(Debug, Clone)]
pub struct ExtractedBatch {
    pub records: Vec<LogRecord>,
    pub matrix: Array2<f32>,
    /// Lines that did not match the grammar.
    pub skipped: usize,
}

impl ExtractedBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Parse every line, dropping malformed ones, and featurize the survivors.
    pub fn extract_batch<I, S>(&self, lines: I) -> ExtractedBatch
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut records = Vec::new();
        let mut vectors: Vec<FeatureVector> = Vec::new();
        let mut skipped = 0usize;
        for line in lines {
            let line = line.as_ref();
            if line.trim().is_empty() {
                continue;
            }
            match extract(line) {
                Some(record) => {
                    vectors.push(to_features(&record));
                    records.push(record);
                }
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!(skipped, parsed = records.len(), "skipped unparseable log lines");
        }
        ExtractedBatch {
            matrix: to_matrix(&vectors),
            records,
            skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_order_and_counts_skips() {
        let lines = [
            r#"1.1.1.1 - - [t] "GET /a HTTP/1.1" 200 1"#,
            "garbage",
            "",
            r#"2.2.2.2 - - [t] "GET /b HTTP/1.1" 404 1"#,
        ];
        let batch = FeatureExtractor::new().extract_batch(lines);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.skipped, 1);
        assert_eq!(batch.records[0].client_address, "1.1.1.1");
        assert_eq!(batch.records[1].status_code, 404);
        assert_eq!(batch.matrix[[1, 2]], 404.0);
    }

    #[test]
    fn empty_input_gives_empty_matrix() {
        let batch = FeatureExtractor::new().extract_batch(Vec::<String>::new());
        assert!(batch.is_empty());
        assert_eq!(batch.matrix.nrows(), 0);
    }
}
