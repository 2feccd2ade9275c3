//! Positions and the per-segment liquidity model.

use super::error::{ensure_amount, TrancheError, TrancheResult};
use super::segment::{RiskRange, Segment, Tier, SEGMENT_COUNT};
use crate::config::TierLayout;
use serde::{Deserialize, Serialize};

/// Capital committed to one risk range for the duration of a calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Capital amount (non-negative)
    pub amount: f64,
    /// Exposure footprint
    pub range: RiskRange,
}

impl Position {
    /// Create a position, validating the amount.
    ///
    /// # Examples
    /// ```
    /// use tranche_core::types::{Position, RiskRange};
    ///
    /// let range = RiskRange::new(10, 19).unwrap();
    /// assert!(Position::new(1_000.0, range).is_ok());
    /// assert!(Position::new(-1.0, range).is_err());
    /// ```
    pub fn new(amount: f64, range: RiskRange) -> TrancheResult<Self> {
        ensure_amount("amount", amount)?;
        Ok(Self { amount, range })
    }

    /// Amount allotted to each covered segment when spread evenly.
    #[inline]
    pub fn amount_per_segment(&self) -> f64 {
        self.amount / self.range.width() as f64
    }
}

/// Per-segment liquidity record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidityTick {
    /// Segment this tick describes
    pub segment: Segment,
    /// Total liquidity deposited at the segment
    pub liquidity: f64,
    /// Yield assigned by the last distribution
    pub available_yield: f64,
    /// Realised APY (`available_yield / liquidity`, 0 when empty)
    pub realized_apy: f64,
}

impl LiquidityTick {
    /// Tick with liquidity and no yield assigned yet.
    pub fn new(segment: Segment, liquidity: f64) -> Self {
        Self {
            segment,
            liquidity,
            available_yield: 0.0,
            realized_apy: 0.0,
        }
    }

    /// Whether the segment holds any liquidity.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.liquidity <= 0.0
    }

    /// Copy of this tick with `yield_amount` assigned.
    pub fn with_yield(&self, yield_amount: f64) -> Self {
        let realized_apy = if self.liquidity > 0.0 {
            yield_amount / self.liquidity
        } else {
            0.0
        };
        Self {
            available_yield: yield_amount,
            realized_apy,
            ..*self
        }
    }
}

/// Complete liquidity model: exactly one tick per segment, in order.
///
/// # Examples
/// ```
/// use tranche_core::types::LiquidityProfile;
///
/// let profile = LiquidityProfile::uniform(1_000.0).unwrap();
/// assert_eq!(profile.ticks().len(), 100);
/// assert!((profile.total_liquidity() - 100_000.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LiquidityTick>", into = "Vec<LiquidityTick>")]
pub struct LiquidityProfile {
    ticks: Vec<LiquidityTick>,
}

impl LiquidityProfile {
    /// Profile with zero liquidity everywhere.
    pub fn empty() -> Self {
        Self {
            ticks: Segment::all().map(|s| LiquidityTick::new(s, 0.0)).collect(),
        }
    }

    /// Profile with the same liquidity at every segment.
    pub fn uniform(liquidity: f64) -> TrancheResult<Self> {
        ensure_amount("liquidity", liquidity)?;
        Ok(Self {
            ticks: Segment::all()
                .map(|s| LiquidityTick::new(s, liquidity))
                .collect(),
        })
    }

    /// Profile from one liquidity amount per segment.
    pub fn from_liquidity(amounts: &[f64]) -> TrancheResult<Self> {
        if amounts.len() != SEGMENT_COUNT {
            return Err(TrancheError::InvalidProfile(format!(
                "expected {} liquidity values, got {}",
                SEGMENT_COUNT,
                amounts.len()
            )));
        }
        let mut ticks = Vec::with_capacity(SEGMENT_COUNT);
        for (segment, &amount) in Segment::all().zip(amounts) {
            ensure_amount("liquidity", amount)?;
            ticks.push(LiquidityTick::new(segment, amount));
        }
        Ok(Self { ticks })
    }

    /// Profile from explicit ticks, which must be ordered with no gaps.
    pub fn from_ticks(ticks: Vec<LiquidityTick>) -> TrancheResult<Self> {
        if ticks.len() != SEGMENT_COUNT {
            return Err(TrancheError::InvalidProfile(format!(
                "expected {} ticks, got {}",
                SEGMENT_COUNT,
                ticks.len()
            )));
        }
        for (expected, tick) in Segment::all().zip(&ticks) {
            if tick.segment != expected {
                return Err(TrancheError::InvalidProfile(format!(
                    "tick for segment {} found at position {}",
                    tick.segment, expected
                )));
            }
            ensure_amount("liquidity", tick.liquidity)?;
        }
        Ok(Self { ticks })
    }

    /// Aggregate positions into a profile, spreading each evenly across its range.
    pub fn from_positions(positions: &[Position]) -> TrancheResult<Self> {
        let mut amounts = vec![0.0; SEGMENT_COUNT];
        for position in positions {
            ensure_amount("amount", position.amount)?;
            let share = position.amount_per_segment();
            for segment in position.range.segments() {
                amounts[segment.index()] += share;
            }
        }
        Self::from_liquidity(&amounts)
    }

    /// All ticks in segment order.
    #[inline]
    pub fn ticks(&self) -> &[LiquidityTick] {
        &self.ticks
    }

    /// Tick for a segment.
    #[inline]
    pub fn tick(&self, segment: Segment) -> &LiquidityTick {
        &self.ticks[segment.index()]
    }

    /// Liquidity at a segment.
    #[inline]
    pub fn liquidity(&self, segment: Segment) -> f64 {
        self.ticks[segment.index()].liquidity
    }

    /// Sum of liquidity over all segments.
    pub fn total_liquidity(&self) -> f64 {
        self.ticks.iter().map(|t| t.liquidity).sum()
    }

    /// Sum of liquidity over the segments of one tier.
    pub fn tier_liquidity(&self, layout: &TierLayout, tier: Tier) -> f64 {
        layout
            .bounds(tier)
            .segments()
            .map(|s| self.liquidity(s))
            .sum()
    }

    /// Consume the profile, returning its ticks.
    pub fn into_ticks(self) -> Vec<LiquidityTick> {
        self.ticks
    }
}

impl TryFrom<Vec<LiquidityTick>> for LiquidityProfile {
    type Error = TrancheError;

    fn try_from(ticks: Vec<LiquidityTick>) -> Result<Self, Self::Error> {
        Self::from_ticks(ticks)
    }
}

impl From<LiquidityProfile> for Vec<LiquidityTick> {
    fn from(profile: LiquidityProfile) -> Self {
        profile.into_ticks()
    }
}
