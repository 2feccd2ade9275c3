//! Result types shared by the yield and loss allocators.

use serde::{Deserialize, Serialize};
use std::fmt;
use tranche_core::config::TierLayout;
use tranche_core::types::{
    LiquidityTick, Segment, Tier, TierTable, TrancheError, TrancheResult, SEGMENT_COUNT,
};

/// Highest segment paid its full expected yield.
///
/// Serialises as the segment index, or -1 when no segment is covered.
///
/// # Examples
/// ```
/// use tranche_core::types::Segment;
/// use tranche_risk::waterfall::CoverageLevel;
///
/// assert_eq!(CoverageLevel::None.as_index(), -1);
/// assert_eq!(CoverageLevel::Covered(Segment::LAST).as_index(), 99);
/// assert!(CoverageLevel::Covered(Segment::LAST).is_full());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum CoverageLevel {
    /// Not even the first segment is fully paid.
    None,
    /// Segments up to and including this one are fully paid.
    Covered(Segment),
}

impl CoverageLevel {
    /// Index of the covered segment, -1 for no coverage.
    pub fn as_index(self) -> i64 {
        match self {
            CoverageLevel::None => -1,
            CoverageLevel::Covered(segment) => segment.index() as i64,
        }
    }

    /// Covered segment, if any.
    pub fn segment(self) -> Option<Segment> {
        match self {
            CoverageLevel::None => None,
            CoverageLevel::Covered(segment) => Some(segment),
        }
    }

    /// Whether every segment is fully paid.
    pub fn is_full(self) -> bool {
        self == CoverageLevel::Covered(Segment::LAST)
    }

    /// Whether `segment` receives its full expected yield.
    pub fn covers(self, segment: Segment) -> bool {
        match self {
            CoverageLevel::None => false,
            CoverageLevel::Covered(level) => segment <= level,
        }
    }

    /// Segment receiving the residual yield, if one exists above the level.
    pub fn residual_segment(self) -> Option<Segment> {
        match self {
            CoverageLevel::None => Some(Segment::FIRST),
            CoverageLevel::Covered(level) => level.next(),
        }
    }
}

impl From<CoverageLevel> for i64 {
    fn from(level: CoverageLevel) -> Self {
        level.as_index()
    }
}

impl TryFrom<i64> for CoverageLevel {
    type Error = TrancheError;

    fn try_from(index: i64) -> Result<Self, Self::Error> {
        if index == -1 {
            Ok(CoverageLevel::None)
        } else {
            Segment::new(index).map(CoverageLevel::Covered)
        }
    }
}

impl fmt::Display for CoverageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverageLevel::None => write!(f, "none"),
            CoverageLevel::Covered(segment) => write!(f, "{}", segment),
        }
    }
}

/// One amount per segment, in segment order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDistribution {
    amounts: Vec<f64>,
}

impl SegmentDistribution {
    /// All-zero distribution.
    pub fn zeros() -> Self {
        Self {
            amounts: vec![0.0; SEGMENT_COUNT],
        }
    }

    /// Wrap exactly one amount per segment.
    pub fn from_amounts(amounts: Vec<f64>) -> TrancheResult<Self> {
        if amounts.len() != SEGMENT_COUNT {
            return Err(TrancheError::InvalidProfile(format!(
                "expected {} amounts, got {}",
                SEGMENT_COUNT,
                amounts.len()
            )));
        }
        Ok(Self { amounts })
    }

    /// Amount assigned to `segment`.
    #[inline]
    pub fn get(&self, segment: Segment) -> f64 {
        self.amounts[segment.index()]
    }

    /// Amounts in segment order.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.amounts
    }

    /// `(segment, amount)` pairs in segment order.
    pub fn iter(&self) -> impl Iterator<Item = (Segment, f64)> + '_ {
        Segment::all().zip(self.amounts.iter().copied())
    }

    /// Sum over all segments.
    pub fn total(&self) -> f64 {
        self.amounts.iter().sum()
    }

    /// Sum per tier.
    pub fn tier_totals(&self, layout: &TierLayout) -> TierTable<f64> {
        TierTable::from_fn(|tier: Tier| {
            layout.bounds(tier).segments().map(|s| self.get(s)).sum()
        })
    }

    pub(crate) fn amounts_mut(&mut self) -> &mut [f64] {
        &mut self.amounts
    }
}

/// Outcome of [`YieldWaterfall::distribute_yield`](super::YieldWaterfall::distribute_yield).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldDistribution {
    /// Yield presented to the waterfall
    pub total_yield: f64,
    /// Highest fully paid segment
    pub coverage_level: CoverageLevel,
    /// Yield per segment
    pub allocations: SegmentDistribution,
    /// Input ticks with `available_yield` and `realized_apy` filled in
    pub ticks: Vec<LiquidityTick>,
    /// Sum of expected yield over all segments
    pub total_need: f64,
    /// Sum of allocations
    pub distributed: f64,
    /// Yield left over once every segment is fully paid
    pub surplus: f64,
}

impl YieldDistribution {
    /// Yield assigned to `segment`.
    pub fn yield_for(&self, segment: Segment) -> f64 {
        self.allocations.get(segment)
    }
}
