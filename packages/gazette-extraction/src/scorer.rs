//! Quality scorer - completeness metric over extracted fields.

use crate::types::{PublicationRecord, ScoreWeights};

/// Scores a record's completeness in [0, 1].
///
/// Pure and deterministic: identical input always scores identically. Each
/// weight contributes only when its field is non-empty. Truncation
/// penalties are the pipeline's business, not the scorer's.
#[derive(Debug, Clone, Copy)]
pub struct QualityScorer {
    weights: ScoreWeights,
}

impl QualityScorer {
    /// Create a scorer with the given weights.
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    /// Score a record.
    pub fn score(&self, record: &PublicationRecord) -> f32 {
        let mut score = 0.0;
        if record.process_number.is_some() {
            score += self.weights.process_number;
        }
        if !record.authors.is_empty() {
            score += self.weights.authors;
        }
        if !record.lawyers.is_empty() {
            score += self.weights.lawyers;
        }
        if record.has_monetary_value() {
            score += self.weights.monetary;
        }
        if record.has_date() {
            score += self.weights.date;
        }
        score.clamp(0.0, 1.0)
    }
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self::new(ScoreWeights::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Lawyer;
    use chrono::NaiveDate;

    fn full_record() -> PublicationRecord {
        let mut record = PublicationRecord::new("texto", vec![1]);
        record.process_number = Some("1234567-89.2024.8.26.0100".to_string());
        record.authors = vec!["MARIA LUIZA CAMPOS".to_string()];
        record.lawyers = vec![Lawyer::new("CARLOS LIMA", "123456").with_state("SP")];
        record.gross_value = Some(150050);
        record.publication_date = NaiveDate::from_ymd_opt(2024, 3, 12);
        record
    }

    #[test]
    fn empty_record_scores_zero() {
        let record = PublicationRecord::new("texto", vec![1]);
        assert_eq!(QualityScorer::default().score(&record), 0.0);
    }

    #[test]
    fn full_record_scores_one() {
        let score = QualityScorer::default().score(&full_record());
        assert!((score - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn each_weight_contributes_independently() {
        let scorer = QualityScorer::default();

        let mut record = PublicationRecord::new("texto", vec![1]);
        record.process_number = Some("x".to_string());
        assert!((scorer.score(&record) - 0.2).abs() < f32::EPSILON);

        record.authors = vec!["MARIA CAMPOS".to_string()];
        assert!((scorer.score(&record) - 0.5).abs() < f32::EPSILON);

        // A second monetary field adds nothing beyond the first.
        record.gross_value = Some(1);
        let with_one = scorer.score(&record);
        record.net_value = Some(2);
        assert_eq!(scorer.score(&record), with_one);
    }

    #[test]
    fn score_is_deterministic() {
        let scorer = QualityScorer::default();
        let record = full_record();
        assert_eq!(scorer.score(&record), scorer.score(&record));
    }

    #[test]
    fn oversized_weights_are_clamped() {
        let weights = ScoreWeights {
            process_number: 0.9,
            authors: 0.9,
            lawyers: 0.0,
            monetary: 0.0,
            date: 0.0,
        };
        let score = QualityScorer::new(weights).score(&full_record());
        assert_eq!(score, 1.0);
    }
}
