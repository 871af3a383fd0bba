//! Streaming accumulator for column type inference
//!
//! Rows are fed one at a time; each column keeps a success counter per
//! candidate type and a count of non-null samples. Nothing is resolved until
//! `build` is called, which makes the result independent of how the rows were
//! chunked.

use crate::infer::candidates::{normalize_numeric, CandidateTypes};
use crate::types::ColumnType;

/// Per-column evidence gathered while sampling
#[derive(Debug, Clone)]
struct ColumnStats {
    // indexed like the candidate list
    successes: Vec<usize>,
    samples: usize,
}

impl ColumnStats {
    fn new(candidate_count: usize) -> Self {
        ColumnStats {
            successes: vec![0; candidate_count],
            samples: 0,
        }
    }
}

/// Accumulates type evidence for a fixed set of columns
#[derive(Debug, Clone)]
pub struct TypeInferrer {
    candidates: CandidateTypes,
    sample_threshold: usize,
    columns: Vec<ColumnStats>,
    rows_seen: usize,
}

impl TypeInferrer {
    pub fn new(column_count: usize, candidates: CandidateTypes, sample_threshold: usize) -> Self {
        let columns = (0..column_count)
            .map(|_| ColumnStats::new(candidates.len()))
            .collect();

        TypeInferrer {
            candidates,
            sample_threshold,
            columns,
            rows_seen: 0,
        }
    }

    /// Score one row. Returns `true` once every column has reached the sample threshold.
    ///
    /// Empty cells are skipped entirely. Cells past the last column are ignored.
    pub fn add_row<S: AsRef<str>>(&mut self, row: &[S]) -> bool {
        self.rows_seen += 1;

        for (stats, cell) in self.columns.iter_mut().zip(row.iter()) {
            let cell = cell.as_ref().trim();
            if cell.is_empty() {
                continue;
            }

            let normalized = normalize_numeric(cell);
            stats.samples += 1;
            for (idx, candidate) in self.candidates.iter().enumerate() {
                if (candidate.accepts)(&normalized) {
                    stats.successes[idx] += 1;
                }
            }
        }

        self.is_saturated()
    }

    /// Whether every column has at least `sample_threshold` non-null samples
    pub fn is_saturated(&self) -> bool {
        self.columns
            .iter()
            .all(|stats| stats.samples >= self.sample_threshold)
    }

    pub fn rows_seen(&self) -> usize {
        self.rows_seen
    }

    /// Non-null sample count per column
    pub fn sample_counts(&self) -> Vec<usize> {
        self.columns.iter().map(|stats| stats.samples).collect()
    }

    /// Success count of `column_type` in `column`, if both exist
    pub fn success_count(&self, column: usize, column_type: ColumnType) -> Option<usize> {
        let idx = self
            .candidates
            .iter()
            .position(|c| c.column_type == column_type)?;
        self.columns.get(column).map(|stats| stats.successes[idx])
    }

    /// Resolve one type per column.
    ///
    /// Starting from `text`, each candidate in order takes over when it has at
    /// least one success and no fewer successes than the current pick.
    pub fn build(&self) -> Vec<ColumnType> {
        self.columns.iter().map(|stats| self.resolve(stats)).collect()
    }

    fn resolve(&self, stats: &ColumnStats) -> ColumnType {
        let mut best = ColumnType::Text;
        let mut best_count = self
            .candidates
            .iter()
            .position(|c| c.column_type == ColumnType::Text)
            .map_or(0, |idx| stats.successes[idx]);

        for (candidate, &count) in self.candidates.iter().zip(stats.successes.iter()) {
            if count > 0 && count >= best_count {
                best = candidate.column_type;
                best_count = count;
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer(rows: &[&[&str]]) -> Vec<ColumnType> {
        let width = rows.first().map_or(0, |r| r.len());
        let mut inferrer = TypeInferrer::new(width, CandidateTypes::default(), 100);
        for row in rows {
            inferrer.add_row(*row);
        }
        inferrer.build()
    }

    #[test]
    fn test_empty_builder() {
        let inferrer = TypeInferrer::new(0, CandidateTypes::default(), 100);
        assert!(inferrer.build().is_empty());
        assert!(inferrer.is_saturated());
    }

    #[test]
    fn test_simple_columns() {
        let types = infer(&[&["abc", "1", "1.0"], &["xyz", "2", "2.0"], &["efg", "3", "3.0"]]);
        assert_eq!(
            types,
            vec![ColumnType::Text, ColumnType::Integer, ColumnType::Real]
        );
    }

    #[test]
    fn test_all_null_column_is_text() {
        let types = infer(&[&["", "1"], &["  ", "2"]]);
        assert_eq!(types, vec![ColumnType::Text, ColumnType::Integer]);
    }

    #[test]
    fn test_nulls_are_not_scored() {
        let types = infer(&[&["", ""], &["", ""], &["1", "text"]]);
        assert_eq!(types, vec![ColumnType::Integer, ColumnType::Text]);
    }

    #[test]
    fn test_mixed_integer_and_real_is_real() {
        let types = infer(&[&["1"], &["2.5"], &["3"]]);
        assert_eq!(types, vec![ColumnType::Real]);
    }

    #[test]
    fn test_one_word_makes_column_text() {
        let types = infer(&[&["1"], &["2"], &["n/a"]]);
        assert_eq!(types, vec![ColumnType::Text]);
    }

    #[test]
    fn test_grouped_numbers_are_real() {
        let types = infer(&[&["1,234"], &["5"]]);
        assert_eq!(types, vec![ColumnType::Real]);
    }

    #[test]
    fn test_columns_are_independent() {
        let clean = infer(&[&["1", "a"], &["2", "b"]]);
        let noisy = infer(&[&["1", "??"], &["2", "1.5"]]);
        assert_eq!(clean[0], ColumnType::Integer);
        assert_eq!(noisy[0], ColumnType::Integer);
    }

    #[test]
    fn test_short_and_long_rows() {
        let mut inferrer = TypeInferrer::new(2, CandidateTypes::default(), 100);
        inferrer.add_row(&["1"]);
        inferrer.add_row(&["2", "x", "extra"]);
        assert_eq!(inferrer.sample_counts(), vec![2, 1]);
        assert_eq!(
            inferrer.build(),
            vec![ColumnType::Integer, ColumnType::Text]
        );
    }

    #[test]
    fn test_saturation() {
        let mut inferrer = TypeInferrer::new(2, CandidateTypes::default(), 2);
        assert!(!inferrer.add_row(&["1", "a"]));
        assert!(!inferrer.add_row(&["2", ""]));
        assert!(inferrer.add_row(&["3", "b"]));
        assert_eq!(inferrer.rows_seen(), 3);
    }

    #[test]
    fn test_success_counts() {
        let mut inferrer = TypeInferrer::new(1, CandidateTypes::default(), 100);
        inferrer.add_row(&["1"]);
        inferrer.add_row(&["1.5"]);
        assert_eq!(inferrer.success_count(0, ColumnType::Text), Some(2));
        assert_eq!(inferrer.success_count(0, ColumnType::Real), Some(2));
        assert_eq!(inferrer.success_count(0, ColumnType::Integer), Some(1));
        assert_eq!(inferrer.success_count(3, ColumnType::Text), None);
    }

    #[test]
    fn test_custom_order_without_text() {
        let candidates = CandidateTypes::from_types(&[ColumnType::Integer, ColumnType::Real]);
        let mut inferrer = TypeInferrer::new(1, candidates, 100);
        inferrer.add_row(&["1"]);
        inferrer.add_row(&["2"]);
        // real is listed last, so it wins the tie with integer
        assert_eq!(inferrer.build(), vec![ColumnType::Real]);
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let mut inferrer = TypeInferrer::new(1, CandidateTypes::default(), 100);
        inferrer.add_row(&["7"]);
        assert_eq!(inferrer.build(), inferrer.build());
    }
}
