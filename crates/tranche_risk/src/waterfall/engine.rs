//! Bottom-up yield allocation.

use super::distribution::{CoverageLevel, SegmentDistribution, YieldDistribution};
use tracing::debug;
use tranche_core::curve::RateCurve;
use tranche_core::types::error::ensure_amount;
use tranche_core::types::{LiquidityProfile, LiquidityTick, Segment, TrancheResult};
use tranche_core::EngineConfig;

/// Pays expected yield to segments in ascending risk order.
///
/// The expected yield (need) of a segment is `liquidity * apy`. Walking from
/// segment 0 upwards, the coverage level is the last segment reached before
/// cumulative need exceeds the yield available.
///
/// # Examples
///
/// ```
/// use tranche_core::{EngineConfig, LiquidityProfile};
/// use tranche_risk::waterfall::{CoverageLevel, YieldWaterfall};
///
/// let waterfall = YieldWaterfall::new(&EngineConfig::default()).unwrap();
/// let profile = LiquidityProfile::uniform(1_000.0).unwrap();
///
/// // Ten senior segments at 3% need 300 in total
/// let level = waterfall.find_coverage_level(305.0, &profile).unwrap();
/// assert_eq!(level.as_index(), 9);
///
/// assert_eq!(
///     waterfall.find_coverage_level(0.0, &profile).unwrap(),
///     CoverageLevel::None
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct YieldWaterfall {
    curve: RateCurve,
}

impl YieldWaterfall {
    /// Build a waterfall from a validated configuration.
    pub fn new(config: &EngineConfig) -> TrancheResult<Self> {
        Ok(Self::from_curve(RateCurve::new(config)?))
    }

    /// Build a waterfall around an existing curve.
    pub fn from_curve(curve: RateCurve) -> Self {
        Self { curve }
    }

    /// Rate curve used to price need.
    #[inline]
    pub fn curve(&self) -> &RateCurve {
        &self.curve
    }

    /// Expected yield of every segment.
    pub fn needs(&self, profile: &LiquidityProfile) -> Vec<f64> {
        profile
            .ticks()
            .iter()
            .map(|tick| self.need(tick))
            .collect()
    }

    /// Highest segment whose full need can be paid from `total_yield`.
    ///
    /// # Errors
    ///
    /// `NegativeAmount` or `NonFiniteAmount` for a bad `total_yield`.
    pub fn find_coverage_level(
        &self,
        total_yield: f64,
        profile: &LiquidityProfile,
    ) -> TrancheResult<CoverageLevel> {
        ensure_amount("total_yield", total_yield)?;
        Ok(Self::coverage_for(total_yield, &self.needs(profile)).0)
    }

    /// Split `total_yield` across the segments of `profile`.
    ///
    /// Segments up to the coverage level receive their full need, the next
    /// segment receives the residual and higher segments receive nothing.
    ///
    /// # Errors
    ///
    /// `NegativeAmount` or `NonFiniteAmount` for a bad `total_yield`.
    pub fn distribute_yield(
        &self,
        total_yield: f64,
        profile: &LiquidityProfile,
    ) -> TrancheResult<YieldDistribution> {
        ensure_amount("total_yield", total_yield)?;

        let needs = self.needs(profile);
        let total_need: f64 = needs.iter().sum();
        let (coverage_level, covered_need) = Self::coverage_for(total_yield, &needs);

        let mut allocations = SegmentDistribution::zeros();
        {
            let amounts = allocations.amounts_mut();
            for segment in Segment::all().filter(|&s| coverage_level.covers(s)) {
                amounts[segment.index()] = needs[segment.index()];
            }
            if let Some(residual) = coverage_level.residual_segment() {
                amounts[residual.index()] = (total_yield - covered_need).max(0.0);
            }
        }

        let ticks: Vec<LiquidityTick> = profile
            .ticks()
            .iter()
            .zip(allocations.as_slice())
            .map(|(tick, &amount)| tick.with_yield(amount))
            .collect();

        let distributed = allocations.total();
        let surplus = if coverage_level.is_full() {
            (total_yield - total_need).max(0.0)
        } else {
            0.0
        };

        debug!(
            total_yield,
            coverage_level = coverage_level.as_index(),
            total_need,
            distributed,
            "yield distributed"
        );

        Ok(YieldDistribution {
            total_yield,
            coverage_level,
            allocations,
            ticks,
            total_need,
            distributed,
            surplus,
        })
    }

    fn need(&self, tick: &LiquidityTick) -> f64 {
        if tick.is_empty() {
            0.0
        } else {
            tick.liquidity * self.curve.apy(tick.segment)
        }
    }

    /// Coverage level and the need paid in full up to it.
    fn coverage_for(total_yield: f64, needs: &[f64]) -> (CoverageLevel, f64) {
        if total_yield <= 0.0 {
            return (CoverageLevel::None, 0.0);
        }
        let mut level = CoverageLevel::None;
        let mut cumulative = 0.0;
        for (segment, &need) in Segment::all().zip(needs) {
            if cumulative + need > total_yield {
                break;
            }
            cumulative += need;
            level = CoverageLevel::Covered(segment);
        }
        (level, cumulative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tranche_core::types::{TrancheError, SEGMENT_COUNT};

    fn waterfall() -> YieldWaterfall {
        YieldWaterfall::new(&EngineConfig::default()).unwrap()
    }

    fn seg(i: i64) -> Segment {
        Segment::new(i).unwrap()
    }

    #[test]
    fn test_partial_coverage_pays_residual_to_next_segment() {
        let profile = LiquidityProfile::uniform(1_000.0).unwrap();
        let dist = waterfall().distribute_yield(305.0, &profile).unwrap();

        assert_eq!(dist.coverage_level.as_index(), 9);
        for s in 0..=9 {
            assert_relative_eq!(dist.yield_for(seg(s)), 30.0, epsilon = 1e-9);
        }
        assert_relative_eq!(dist.yield_for(seg(10)), 5.0, epsilon = 1e-9);
        assert_eq!(dist.yield_for(seg(11)), 0.0);
        assert_eq!(dist.yield_for(seg(99)), 0.0);
        assert_relative_eq!(dist.distributed, 305.0, epsilon = 1e-9);
        assert_eq!(dist.surplus, 0.0);
    }

    #[test]
    fn test_full_coverage() {
        let profile = LiquidityProfile::uniform(1_000.0).unwrap();
        let wf = waterfall();
        let dist = wf.distribute_yield(1e9, &profile).unwrap();

        assert!(dist.coverage_level.is_full());
        assert_eq!(dist.coverage_level.as_index(), 99);
        for segment in Segment::all() {
            assert_relative_eq!(
                dist.yield_for(segment),
                1_000.0 * wf.curve().apy(segment),
                epsilon = 1e-9
            );
        }
        assert_relative_eq!(dist.distributed, dist.total_need, epsilon = 1e-9);
        assert_relative_eq!(dist.surplus, 1e9 - dist.total_need, epsilon = 1e-3);
    }

    #[test]
    fn test_zero_yield_has_no_coverage() {
        let profile = LiquidityProfile::uniform(1_000.0).unwrap();
        let dist = waterfall().distribute_yield(0.0, &profile).unwrap();
        assert_eq!(dist.coverage_level, CoverageLevel::None);
        assert_eq!(dist.distributed, 0.0);
        assert!(dist.allocations.as_slice().iter().all(|&a| a == 0.0));
    }

    #[test]
    fn test_yield_below_first_need_goes_to_segment_zero() {
        let profile = LiquidityProfile::uniform(1_000.0).unwrap();
        let dist = waterfall().distribute_yield(10.0, &profile).unwrap();
        assert_eq!(dist.coverage_level, CoverageLevel::None);
        assert_relative_eq!(dist.yield_for(Segment::FIRST), 10.0);
        assert_eq!(dist.yield_for(seg(1)), 0.0);
    }

    #[test]
    fn test_empty_segments_are_skipped() {
        let mut amounts = vec![0.0; SEGMENT_COUNT];
        amounts[50] = 1_000.0;
        let profile = LiquidityProfile::from_liquidity(&amounts).unwrap();
        let wf = waterfall();
        let need = 1_000.0 * wf.curve().apy(seg(50));

        let dist = wf.distribute_yield(need, &profile).unwrap();
        assert!(dist.coverage_level.is_full());
        assert_relative_eq!(dist.yield_for(seg(50)), need, epsilon = 1e-12);
        assert_eq!(dist.ticks[0].realized_apy, 0.0);
        assert_relative_eq!(
            dist.ticks[50].realized_apy,
            wf.curve().apy(seg(50)),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_empty_profile() {
        let dist = waterfall()
            .distribute_yield(100.0, &LiquidityProfile::empty())
            .unwrap();
        assert!(dist.coverage_level.is_full());
        assert_eq!(dist.distributed, 0.0);
        assert_eq!(dist.surplus, 100.0);
    }

    #[test]
    fn test_ticks_carry_realized_apy() {
        let profile = LiquidityProfile::uniform(1_000.0).unwrap();
        let dist = waterfall().distribute_yield(305.0, &profile).unwrap();
        assert_relative_eq!(dist.ticks[3].realized_apy, 0.03, epsilon = 1e-12);
        assert_relative_eq!(dist.ticks[10].available_yield, 5.0, epsilon = 1e-9);
        assert_relative_eq!(dist.ticks[10].realized_apy, 0.005, epsilon = 1e-12);
        assert_eq!(dist.ticks[20].realized_apy, 0.0);
    }

    #[test]
    fn test_rejects_bad_yield() {
        let profile = LiquidityProfile::uniform(1.0).unwrap();
        let wf = waterfall();
        assert!(matches!(
            wf.distribute_yield(-1.0, &profile),
            Err(TrancheError::NegativeAmount { .. })
        ));
        assert!(matches!(
            wf.find_coverage_level(f64::NAN, &profile),
            Err(TrancheError::NonFiniteAmount { .. })
        ));
    }

    #[test]
    fn test_coverage_level_matches_distribution() {
        let profile = LiquidityProfile::uniform(500.0).unwrap();
        let wf = waterfall();
        for total in [0.0, 1.0, 150.0, 1_234.5, 5_000.0] {
            let level = wf.find_coverage_level(total, &profile).unwrap();
            let dist = wf.distribute_yield(total, &profile).unwrap();
            assert_eq!(level, dist.coverage_level);
        }
    }
}
