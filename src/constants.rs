//! Cross-cutting, shared constants.
//!
//! Column names follow the layout of the firm tables produced by the scraping
//! and labelling jobs. Override them through [`crate::config::Config`] rather
//! than editing these values.

/// Identifier column in the candidate and training tables.
pub const DEFAULT_ID_COLUMN: &str = "firm_name";

/// Binary label column, only present in the training table.
pub const DEFAULT_TARGET_COLUMN: &str = "label_recommendable";

/// Default number of records per recommendation call.
pub const DEFAULT_TOP_N: usize = 3;

/// Default cap on records per recommendation call.
pub const DEFAULT_MAX_N: usize = 100;

/// Decimal places kept on `aiScore`.
pub const AI_SCORE_DECIMALS: i32 = 3;

/// Share of labelled rows held out for the validation report.
pub const VALIDATION_FRACTION: f64 = 0.2;

/// Seed for the train/validation split so reports are reproducible.
pub const TRAINING_SPLIT_SEED: u64 = 42;

/// Version tag written into model artifacts.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Rounds `score` to [`AI_SCORE_DECIMALS`] places.
#[inline]
pub fn round_score(score: f64) -> f64 {
    let factor = 10f64.powi(AI_SCORE_DECIMALS);
    (score * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.123456), 0.123);
        assert_eq!(round_score(0.9995), 1.0);
        assert_eq!(round_score(0.0), 0.0);
    }
}
