//! Risk segments, tiers and risk ranges.

use super::error::{TrancheError, TrancheResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of discrete risk segments on the scale.
pub const SEGMENT_COUNT: usize = 100;

/// Highest valid segment index.
pub const MAX_SEGMENT: u8 = 99;

/// One of the 100 discrete risk buckets, 0 (safest) to 99 (riskiest).
///
/// # Examples
/// ```
/// use tranche_core::types::Segment;
///
/// let seg = Segment::new(42).unwrap();
/// assert_eq!(seg.index(), 42);
/// assert!(Segment::new(100).is_err());
/// assert!(Segment::new(-1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Segment(u8);

impl Segment {
    /// Lowest-risk segment.
    pub const FIRST: Segment = Segment(0);
    /// Highest-risk segment.
    pub const LAST: Segment = Segment(MAX_SEGMENT);

    /// Construct a segment, rejecting indices outside [0, 99].
    pub fn new(index: i64) -> TrancheResult<Self> {
        if (0..=MAX_SEGMENT as i64).contains(&index) {
            Ok(Segment(index as u8))
        } else {
            Err(TrancheError::SegmentOutOfRange { segment: index })
        }
    }

    /// Construct a segment, clamping indices above 99.
    #[inline]
    pub const fn saturating(index: u8) -> Self {
        if index > MAX_SEGMENT {
            Segment(MAX_SEGMENT)
        } else {
            Segment(index)
        }
    }

    /// Segment index as `usize`, suitable for slice indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Segment index as `f64`.
    #[inline]
    pub fn position(self) -> f64 {
        self.0 as f64
    }

    /// The next higher segment, if any.
    #[inline]
    pub fn next(self) -> Option<Segment> {
        (self.0 < MAX_SEGMENT).then(|| Segment(self.0 + 1))
    }

    /// All segments in ascending order.
    pub fn all() -> impl DoubleEndedIterator<Item = Segment> + ExactSizeIterator {
        (0..=MAX_SEGMENT).map(Segment)
    }
}

impl TryFrom<i64> for Segment {
    type Error = TrancheError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Segment::new(value)
    }
}

impl From<Segment> for u8 {
    fn from(segment: Segment) -> u8 {
        segment.0
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Named risk band sharing one APY shape.
///
/// Ordered from lowest to highest risk, so `Tier::Senior < Tier::Equity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Protected tier paid a fixed floor rate.
    Senior,
    /// Linear tier.
    Mezzanine,
    /// Quadratic tier.
    Junior,
    /// Exponential first-loss tier.
    Equity,
}

impl Tier {
    /// All tiers, lowest risk first.
    pub const ALL: [Tier; 4] = [Tier::Senior, Tier::Mezzanine, Tier::Junior, Tier::Equity];

    /// Tiers in subordination order: first to absorb losses comes first.
    pub fn by_subordination() -> [Tier; 4] {
        [Tier::Equity, Tier::Junior, Tier::Mezzanine, Tier::Senior]
    }

    /// Position in [`Tier::ALL`].
    #[inline]
    pub fn rank(self) -> usize {
        match self {
            Tier::Senior => 0,
            Tier::Mezzanine => 1,
            Tier::Junior => 2,
            Tier::Equity => 3,
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Tier::Senior => "Senior",
            Tier::Mezzanine => "Mezzanine",
            Tier::Junior => "Junior",
            Tier::Equity => "Equity",
        }
    }

    /// Whether the curve interpolates between two rates inside this tier.
    #[inline]
    pub fn is_interpolated(self) -> bool {
        matches!(self, Tier::Mezzanine | Tier::Junior)
    }

    /// Whether this is the protected tier that absorbs losses last.
    #[inline]
    pub fn is_protected(self) -> bool {
        self == Tier::Senior
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Contiguous footprint of a position on the risk scale.
///
/// # Examples
/// ```
/// use tranche_core::types::RiskRange;
///
/// let range = RiskRange::new(30, 59).unwrap();
/// assert_eq!(range.width(), 30);
/// assert_eq!(range.midpoint().index(), 44);
/// assert!((range.mean_position() - 44.5).abs() < 1e-12);
///
/// assert!(RiskRange::new(59, 30).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RiskRange {
    min: Segment,
    max: Segment,
}

impl RiskRange {
    /// Construct a range from raw indices.
    pub fn new(min: i64, max: i64) -> TrancheResult<Self> {
        let lo = Segment::new(min)?;
        let hi = Segment::new(max)?;
        Self::from_segments(lo, hi)
    }

    /// Construct a range from validated segments.
    pub fn from_segments(min: Segment, max: Segment) -> TrancheResult<Self> {
        if min > max {
            return Err(TrancheError::InvertedRange {
                min: min.index() as i64,
                max: max.index() as i64,
            });
        }
        Ok(Self { min, max })
    }

    /// Range covering exactly one segment.
    pub fn single(segment: Segment) -> Self {
        Self {
            min: segment,
            max: segment,
        }
    }

    /// Lower bound.
    #[inline]
    pub fn min(&self) -> Segment {
        self.min
    }

    /// Upper bound.
    #[inline]
    pub fn max(&self) -> Segment {
        self.max
    }

    /// Number of segments covered.
    #[inline]
    pub fn width(&self) -> usize {
        self.max.index() - self.min.index() + 1
    }

    /// Arithmetic mean position, possibly fractional.
    #[inline]
    pub fn mean_position(&self) -> f64 {
        (self.min.position() + self.max.position()) / 2.0
    }

    /// Integer midpoint segment (rounded down).
    #[inline]
    pub fn midpoint(&self) -> Segment {
        Segment(((self.min.0 as u16 + self.max.0 as u16) / 2) as u8)
    }

    /// Whether the range covers `segment`.
    #[inline]
    pub fn contains(&self, segment: Segment) -> bool {
        self.min <= segment && segment <= self.max
    }

    /// Covered segments in ascending order.
    pub fn segments(&self) -> impl Iterator<Item = Segment> {
        (self.min.0..=self.max.0).map(Segment)
    }
}

impl fmt::Display for RiskRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}-{}]", self.min, self.max)
    }
}
