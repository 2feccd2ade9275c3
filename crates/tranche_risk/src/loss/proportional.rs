//! Per-segment loss allocation weighted by APY.

use crate::waterfall::SegmentDistribution;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use tranche_core::config::TierLayout;
use tranche_core::curve::RateCurve;
use tranche_core::types::error::ensure_amount;
use tranche_core::types::{LiquidityProfile, Segment, TierTable, TrancheError, TrancheResult};
use tranche_core::EngineConfig;

/// Loss below this is treated as fully placed.
const LOSS_EPSILON: f64 = 1e-9;

/// Outcome of a proportional loss allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentLossDistribution {
    /// Loss presented to the distributor
    pub total_loss: f64,
    /// Loss per segment
    pub losses: SegmentDistribution,
    /// Loss placed on segments
    pub total_absorbed: f64,
    /// Loss no eligible segment could take
    pub unabsorbed: f64,
    /// Whether any loss was left unabsorbed
    pub overflow: bool,
}

impl SegmentLossDistribution {
    /// Loss assigned to `segment`.
    pub fn loss_for(&self, segment: Segment) -> f64 {
        self.losses.get(segment)
    }

    /// Loss per tier.
    pub fn tier_losses(&self, layout: &TierLayout) -> TierTable<f64> {
        self.losses.tier_totals(layout)
    }

    /// Escalate overflow to an error.
    pub fn ensure_absorbed(&self) -> TrancheResult<()> {
        if self.overflow {
            return Err(TrancheError::OverflowLoss {
                unabsorbed: self.unabsorbed,
            });
        }
        Ok(())
    }
}

/// Spreads loss across every funded segment above the protected tier.
///
/// Each eligible segment is weighted by its APY, so riskier segments take a
/// larger share. A segment never loses more than its liquidity; loss above a
/// cap is re-spread over the segments still below theirs. The protected
/// tier is never assigned any loss.
///
/// # Examples
///
/// ```
/// use tranche_core::{EngineConfig, LiquidityProfile, Tier};
/// use tranche_core::config::TierLayout;
/// use tranche_risk::loss::ProportionalLossDistributor;
///
/// let distributor = ProportionalLossDistributor::new(&EngineConfig::default()).unwrap();
/// let profile = LiquidityProfile::uniform(10_000.0).unwrap();
///
/// let dist = distributor.distribute_loss(100_000.0, &profile).unwrap();
/// let by_tier = dist.tier_losses(&TierLayout::default());
/// assert_eq!(by_tier.senior, 0.0);
/// assert!(!dist.overflow);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ProportionalLossDistributor {
    curve: RateCurve,
}

impl ProportionalLossDistributor {
    /// Build a distributor from a validated configuration.
    pub fn new(config: &EngineConfig) -> TrancheResult<Self> {
        Ok(Self::from_curve(RateCurve::new(config)?))
    }

    /// Build a distributor around an existing curve.
    pub fn from_curve(curve: RateCurve) -> Self {
        Self { curve }
    }

    /// Rate curve supplying the weights.
    #[inline]
    pub fn curve(&self) -> &RateCurve {
        &self.curve
    }

    /// Allocate `total_loss` over `profile`.
    ///
    /// # Errors
    ///
    /// `NegativeAmount` or `NonFiniteAmount` for a bad `total_loss`.
    pub fn distribute_loss(
        &self,
        total_loss: f64,
        profile: &LiquidityProfile,
    ) -> TrancheResult<SegmentLossDistribution> {
        ensure_amount("total_loss", total_loss)?;

        // (segment, weight, liquidity) of every segment that can take loss
        let mut active: Vec<(Segment, f64, f64)> = profile
            .ticks()
            .iter()
            .filter(|tick| !tick.is_empty() && !self.curve.tier_of(tick.segment).is_protected())
            .map(|tick| (tick.segment, self.curve.apy(tick.segment), tick.liquidity))
            .collect();
        let eligible: f64 = active.iter().map(|&(_, _, liquidity)| liquidity).sum();

        let mut losses = SegmentDistribution::zeros();
        let mut remaining = total_loss;

        // Every pass either caps at least one segment or places the rest.
        while remaining > LOSS_EPSILON && !active.is_empty() {
            let weight_sum: f64 = active.iter().map(|&(_, w, _)| w).sum();
            let amounts = losses.amounts_mut();
            let mut placed = 0.0;
            let mut capped_any = false;

            active.retain(|&(segment, weight, liquidity)| {
                let slot = &mut amounts[segment.index()];
                let share = remaining * weight / weight_sum;
                let room = liquidity - *slot;
                if share >= room {
                    *slot = liquidity;
                    placed += room;
                    capped_any = true;
                    false
                } else {
                    *slot += share;
                    placed += share;
                    true
                }
            });

            if capped_any {
                remaining = (remaining - placed).max(0.0);
            } else {
                remaining = 0.0;
            }
        }

        let total_absorbed = losses.total();
        // Whatever exceeds the eligible liquidity is reported, however small.
        let unabsorbed = (total_loss - eligible).max(0.0);
        let overflow = unabsorbed > 0.0;

        if overflow {
            warn!(total_loss, unabsorbed, "loss exceeds liquidity above the protected tier");
        } else {
            debug!(total_loss, total_absorbed, "loss distributed proportionally");
        }

        Ok(SegmentLossDistribution {
            total_loss,
            losses,
            total_absorbed,
            unabsorbed,
            overflow,
        })
    }
}
