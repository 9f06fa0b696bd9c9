//! Bounded analysis score.
//!
//! A [`Score`] is an integer on the 0-100 inclusive scale. The historical
//! scoring pipeline produced values on a 0-5 scale, so ingestion goes
//! through a single normalization rule ([`Score::from_raw`]) shared by the
//! external-response path and the stored-record path.

use crate::errors::InvalidValue;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Analysis score on the 0-100 inclusive scale.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    /// Lowest possible score.
    pub const MIN: Score = Score(0);

    /// Highest possible score.
    pub const MAX: Score = Score(100);

    /// Raw values at or below this threshold are treated as 0-5-scale.
    const LEGACY_SCALE_MAX: f64 = 5.0;

    /// Construct a score, rejecting values above 100.
    pub fn new(value: u8) -> Result<Self, InvalidValue> {
        if value > 100 {
            return Err(InvalidValue::ScoreOutOfRange {
                value: f64::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Normalize a raw numeric score of unknown scale.
    ///
    /// The single rescaling rule: any value ≤ 5.0 is treated as a 0-5-scale
    /// score and multiplied by 20; any value > 5.0 is treated as already
    /// 0-100. The result is rounded to the nearest integer and
    /// bounds-checked. Zero and every value above the legacy threshold are
    /// fixed points, so re-reading a normalized score is stable; a genuine
    /// 0-100 score of 1-5 cannot be told apart from a legacy payload and is
    /// rescaled (see DESIGN.md).
    pub fn from_raw(raw: f64) -> Result<Self, InvalidValue> {
        if !raw.is_finite() || raw < 0.0 {
            return Err(InvalidValue::ScoreOutOfRange { value: raw });
        }
        let scaled = if raw <= Self::LEGACY_SCALE_MAX {
            raw * 20.0
        } else {
            raw
        };
        let rounded = scaled.round();
        if rounded > 100.0 {
            return Err(InvalidValue::ScoreOutOfRange { value: raw });
        }
        Ok(Self(rounded as u8))
    }

    /// The score value on the 0-100 scale.
    #[inline]
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Score {
    type Error = InvalidValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_accepts_bounds() {
        assert_eq!(Score::new(0).unwrap().value(), 0);
        assert_eq!(Score::new(100).unwrap().value(), 100);
    }

    #[test]
    fn test_new_rejects_above_100() {
        assert!(Score::new(101).is_err());
    }

    #[test]
    fn test_from_raw_rescales_legacy_scale() {
        assert_eq!(Score::from_raw(0.0).unwrap().value(), 0);
        assert_eq!(Score::from_raw(2.5).unwrap().value(), 50);
        assert_eq!(Score::from_raw(5.0).unwrap().value(), 100);
    }

    #[test]
    fn test_from_raw_passes_modern_scale_through() {
        assert_eq!(Score::from_raw(6.0).unwrap().value(), 6);
        assert_eq!(Score::from_raw(73.4).unwrap().value(), 73);
        assert_eq!(Score::from_raw(100.0).unwrap().value(), 100);
    }

    #[test]
    fn test_from_raw_rejects_out_of_range() {
        assert!(Score::from_raw(-0.1).is_err());
        assert!(Score::from_raw(100.5).is_err());
        assert!(Score::from_raw(f64::NAN).is_err());
        assert!(Score::from_raw(f64::INFINITY).is_err());
    }

    #[test]
    fn test_serde_rejects_out_of_range() {
        assert!(serde_json::from_str::<Score>("101").is_err());
        let score: Score = serde_json::from_str("88").unwrap();
        assert_eq!(score.value(), 88);
    }

    proptest! {
        #[test]
        fn prop_normalization_is_idempotent_above_threshold(raw in 5.5f64..=100.0) {
            let once = Score::from_raw(raw).unwrap();
            let twice = Score::from_raw(f64::from(once.value())).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_legacy_scale_maps_linearly(raw in 0.0f64..=5.0) {
            let score = Score::from_raw(raw).unwrap();
            prop_assert_eq!(f64::from(score.value()), (raw * 20.0).round());
        }

        #[test]
        fn prop_normalized_scores_are_in_bounds(raw in 0.0f64..=100.0) {
            let score = Score::from_raw(raw).unwrap();
            prop_assert!(score.value() <= 100);
        }
    }
}
