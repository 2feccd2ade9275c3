//! Blended APY for positions spanning a range of segments.

use super::rate_curve::RateCurve;
use crate::config::{EngineConfig, RangePolicy};
use crate::types::{Position, RiskRange, TrancheResult, MAX_SEGMENT};
use serde::{Deserialize, Serialize};

/// Yield predicted for a position over one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictedYield {
    /// Blended APY of the range
    pub apy: f64,
    /// `amount * apy`
    pub dollar_yield: f64,
}

/// Reduces a risk range to one representative APY.
///
/// With [`RangePolicy::MeanSegment`] the curve is evaluated at the mean
/// position `(min + max) / 2`. With [`RangePolicy::RadialBlend`] the mean is
/// normalised to `r = mean / 99` and blended as
/// `safe + (ceiling - safe) * r^exponent`.
///
/// # Examples
///
/// ```
/// use tranche_core::config::EngineConfig;
/// use tranche_core::curve::RangeAggregator;
///
/// let agg = RangeAggregator::new(&EngineConfig::default()).unwrap();
///
/// let prediction = agg.predicted_yield(10_000.0, (0, 9)).unwrap();
/// assert!((prediction.apy - 0.03).abs() < 1e-12);
/// assert!((prediction.dollar_yield - 300.0).abs() < 1e-9);
///
/// assert!(agg.range_apy(40, 20).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RangeAggregator {
    curve: RateCurve,
    policy: RangePolicy,
}

impl RangeAggregator {
    /// Build an aggregator from a validated configuration.
    pub fn new(config: &EngineConfig) -> TrancheResult<Self> {
        Ok(Self {
            curve: RateCurve::new(config)?,
            policy: config.range_policy,
        })
    }

    /// Underlying rate curve.
    #[inline]
    pub fn curve(&self) -> &RateCurve {
        &self.curve
    }

    /// Policy in use.
    #[inline]
    pub fn policy(&self) -> RangePolicy {
        self.policy
    }

    /// Blended APY for raw bounds.
    ///
    /// # Errors
    ///
    /// `SegmentOutOfRange` or `InvertedRange` for invalid bounds.
    pub fn range_apy(&self, min: i64, max: i64) -> TrancheResult<f64> {
        Ok(self.range_apy_for(&RiskRange::new(min, max)?))
    }

    /// Blended APY for a validated range.
    pub fn range_apy_for(&self, range: &RiskRange) -> f64 {
        let mean = range.mean_position();
        match self.policy {
            RangePolicy::MeanSegment => self.curve.apy_at_position(mean),
            RangePolicy::RadialBlend {
                safe_apy,
                ceiling_apy,
                exponent,
            } => {
                let r = mean / MAX_SEGMENT as f64;
                safe_apy + (ceiling_apy - safe_apy) * r.powf(exponent)
            }
        }
    }

    /// Predicted APY and dollar yield for `amount` over `(min, max)`.
    ///
    /// # Errors
    ///
    /// Range errors as for [`range_apy`](Self::range_apy), plus
    /// `NegativeAmount` / `NonFiniteAmount` for a bad amount.
    pub fn predicted_yield(&self, amount: f64, range: (i64, i64)) -> TrancheResult<PredictedYield> {
        let range = RiskRange::new(range.0, range.1)?;
        let position = Position::new(amount, range)?;
        Ok(self.predicted_yield_for(&position))
    }

    /// Predicted yield for a validated position.
    pub fn predicted_yield_for(&self, position: &Position) -> PredictedYield {
        let apy = self.range_apy_for(&position.range);
        PredictedYield {
            apy,
            dollar_yield: position.amount * apy,
        }
    }

    /// Predicted yield for a batch of raw requests; stops at the first invalid one.
    pub fn predicted_yields(&self, requests: &[(f64, (i64, i64))]) -> TrancheResult<Vec<PredictedYield>> {
        requests
            .iter()
            .map(|&(amount, range)| self.predicted_yield(amount, range))
            .collect()
    }
}
