//! Piecewise four-tier APY curve.

use crate::config::{EngineConfig, RateParams, TierLayout};
use crate::types::{Segment, Tier, TrancheResult, MAX_SEGMENT};
use serde::{Deserialize, Serialize};

/// Shape of the APY curve inside one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierShape {
    /// Constant rate
    Flat,
    /// Linear interpolation
    Linear,
    /// Power-law interpolation on the normalised position
    Polynomial,
    /// Geometric growth per segment
    Exponential,
}

impl TierShape {
    /// Shape used by `tier`.
    pub fn of(tier: Tier) -> Self {
        match tier {
            Tier::Senior => TierShape::Flat,
            Tier::Mezzanine => TierShape::Linear,
            Tier::Junior => TierShape::Polynomial,
            Tier::Equity => TierShape::Exponential,
        }
    }
}

/// One sampled point of the curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Segment sampled
    pub segment: Segment,
    /// Tier owning the segment
    pub tier: Tier,
    /// Annualised yield as a decimal fraction
    pub apy: f64,
}

/// Maps every segment of the risk scale to an annualised yield.
///
/// - Senior: flat `base_rate * senior_multiplier`
/// - Mezzanine: linear from the senior rate to `mezzanine_end_apy`
/// - Junior: `start + (end - start) * t^junior_exponent` up to `junior_end_apy`
/// - Equity: `junior_end_apy * equity_growth_base^(s - equity_start)`, optionally capped
///
/// Each tier starts at the rate the previous tier ends on, so the curve is
/// continuous at every boundary and non-decreasing over the whole scale.
///
/// # Examples
///
/// ```
/// use tranche_core::config::EngineConfig;
/// use tranche_core::curve::RateCurve;
///
/// let curve = RateCurve::new(&EngineConfig::default()).unwrap();
///
/// // Senior floor
/// assert!((curve.apy_for_segment(0).unwrap() - 0.03).abs() < 1e-12);
/// // Continuity across the senior/mezzanine boundary
/// let a = curve.apy_for_segment(9).unwrap();
/// let b = curve.apy_for_segment(10).unwrap();
/// assert!((a - b).abs() < 1e-9);
/// // Outside the scale
/// assert!(curve.apy_for_segment(100).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RateCurve {
    layout: TierLayout,
    rates: RateParams,
}

impl RateCurve {
    /// Build a curve from a validated configuration.
    pub fn new(config: &EngineConfig) -> TrancheResult<Self> {
        config.validate()?;
        Ok(Self {
            layout: config.tiers,
            rates: config.rates,
        })
    }

    /// Tier layout in use.
    #[inline]
    pub fn layout(&self) -> &TierLayout {
        &self.layout
    }

    /// Rate parameters in use.
    #[inline]
    pub fn rates(&self) -> &RateParams {
        &self.rates
    }

    /// APY for a raw segment index.
    ///
    /// # Errors
    ///
    /// `SegmentOutOfRange` when `segment` is outside [0, 99].
    pub fn apy_for_segment(&self, segment: i64) -> TrancheResult<f64> {
        Ok(self.apy(Segment::new(segment)?))
    }

    /// APY for a validated segment.
    #[inline]
    pub fn apy(&self, segment: Segment) -> f64 {
        self.apy_at_position(segment.position())
    }

    /// APY at a possibly fractional position, clamped to [0, 99].
    pub fn apy_at_position(&self, position: f64) -> f64 {
        let position = position.clamp(0.0, MAX_SEGMENT as f64);
        let tier = self.layout.tier_for_position(position);
        let span = self.layout.bounds(tier);
        let r = &self.rates;

        match TierShape::of(tier) {
            TierShape::Flat => r.senior_apy(),
            TierShape::Linear => {
                let start = r.senior_apy();
                start + (r.mezzanine_end_apy - start) * span.normalized(position)
            }
            TierShape::Polynomial => {
                let start = r.mezzanine_end_apy;
                let t = span.normalized(position);
                start + (r.junior_end_apy - start) * t.powf(r.junior_exponent)
            }
            TierShape::Exponential => {
                let steps = (position - span.start.position()).max(0.0);
                let apy = r.junior_end_apy * r.equity_growth_base.powf(steps);
                match r.apy_cap {
                    Some(cap) => apy.min(cap),
                    None => apy,
                }
            }
        }
    }

    /// Tier owning `segment`.
    #[inline]
    pub fn tier_of(&self, segment: Segment) -> Tier {
        self.layout.tier_of(segment)
    }

    /// APY at the first and last segment of `tier`.
    pub fn tier_apy_bounds(&self, tier: Tier) -> (f64, f64) {
        let span = self.layout.bounds(tier);
        (self.apy(span.start), self.apy(span.end))
    }

    /// The full 100-point curve in segment order.
    pub fn points(&self) -> Vec<CurvePoint> {
        Segment::all()
            .map(|segment| CurvePoint {
                segment,
                tier: self.tier_of(segment),
                apy: self.apy(segment),
            })
            .collect()
    }
}
