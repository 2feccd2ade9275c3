//! Tier boundaries on the segment scale.

use crate::types::{Segment, Tier, TierTable, TrancheError, TrancheResult, SEGMENT_COUNT};
use serde::{Deserialize, Serialize};

/// Inclusive span of segments owned by one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentSpan {
    /// First segment of the tier
    pub start: Segment,
    /// Last segment of the tier
    pub end: Segment,
}

impl SegmentSpan {
    /// Span from raw indices.
    pub fn new(start: i64, end: i64) -> TrancheResult<Self> {
        let span = Self {
            start: Segment::new(start)?,
            end: Segment::new(end)?,
        };
        if span.start > span.end {
            return Err(TrancheError::InvertedRange {
                min: start,
                max: end,
            });
        }
        Ok(span)
    }

    /// Number of segments in the span.
    #[inline]
    pub fn width(&self) -> usize {
        self.end.index() - self.start.index() + 1
    }

    /// Whether the span covers `segment`.
    #[inline]
    pub fn contains(&self, segment: Segment) -> bool {
        self.start <= segment && segment <= self.end
    }

    /// Normalised position `(x - start) / (end - start)` clamped to [0, 1].
    ///
    /// A single-segment span has no interior and always returns 0.
    pub fn normalized(&self, position: f64) -> f64 {
        let length = self.end.position() - self.start.position();
        if length <= 0.0 {
            return 0.0;
        }
        ((position - self.start.position()) / length).clamp(0.0, 1.0)
    }

    /// Covered segments in ascending order.
    pub fn segments(&self) -> impl Iterator<Item = Segment> {
        Segment::all().skip(self.start.index()).take(self.width())
    }
}

/// Narrowest span a tier interpolating between two rates may have.
///
/// A single segment cannot hold both the start and the end rate, so the
/// curve would jump at one of the tier's boundaries.
pub const MIN_INTERPOLATED_WIDTH: usize = 2;

/// Partition of the 0-99 scale into the four tiers.
///
/// # Examples
/// ```
/// use tranche_core::config::TierLayout;
/// use tranche_core::types::{Segment, Tier};
///
/// let layout = TierLayout::default();
/// assert_eq!(layout.tier_of(Segment::new(9).unwrap()), Tier::Senior);
/// assert_eq!(layout.tier_of(Segment::new(10).unwrap()), Tier::Mezzanine);
/// assert_eq!(layout.tier_of(Segment::new(99).unwrap()), Tier::Equity);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierLayout {
    spans: TierTable<SegmentSpan>,
}

impl Default for TierLayout {
    /// Senior [0-9], Mezzanine [10-29], Junior [30-59], Equity [60-99].
    fn default() -> Self {
        let span = |start: u8, end: u8| SegmentSpan {
            start: Segment::saturating(start),
            end: Segment::saturating(end),
        };
        Self {
            spans: TierTable::new(span(0, 9), span(10, 29), span(30, 59), span(60, 99)),
        }
    }
}

impl TierLayout {
    /// Build and validate a layout.
    pub fn new(spans: TierTable<SegmentSpan>) -> TrancheResult<Self> {
        let layout = Self { spans };
        layout.validate()?;
        Ok(layout)
    }

    /// Check that the spans partition [0, 99] with no gap or overlap and that
    /// the mezzanine and junior tiers are at least two segments wide.
    pub fn validate(&self) -> TrancheResult<()> {
        let mut expected_start = 0usize;
        for (tier, span) in self.spans.iter() {
            if span.start > span.end {
                return Err(TrancheError::InvalidConfig(format!(
                    "{} tier starts at {} after it ends at {}",
                    tier, span.start, span.end
                )));
            }
            if span.start.index() != expected_start {
                return Err(TrancheError::InvalidConfig(format!(
                    "{} tier must start at segment {}, found {}",
                    tier, expected_start, span.start
                )));
            }
            if tier.is_interpolated() && span.width() < MIN_INTERPOLATED_WIDTH {
                return Err(TrancheError::InvalidConfig(format!(
                    "{} tier must span at least {} segments, found {}",
                    tier,
                    MIN_INTERPOLATED_WIDTH,
                    span.width()
                )));
            }
            expected_start = span.end.index() + 1;
        }
        if expected_start != SEGMENT_COUNT {
            return Err(TrancheError::InvalidConfig(format!(
                "tiers cover {} segments, expected {}",
                expected_start, SEGMENT_COUNT
            )));
        }
        Ok(())
    }

    /// Span of `tier`.
    #[inline]
    pub fn bounds(&self, tier: Tier) -> SegmentSpan {
        *self.spans.get(tier)
    }

    /// All spans.
    #[inline]
    pub fn spans(&self) -> &TierTable<SegmentSpan> {
        &self.spans
    }

    /// Tier owning `segment`.
    pub fn tier_of(&self, segment: Segment) -> Tier {
        Tier::ALL
            .into_iter()
            .find(|&tier| self.spans.get(tier).contains(segment))
            .unwrap_or(Tier::Equity)
    }

    /// Tier used to evaluate a possibly fractional position.
    ///
    /// The first tier whose last segment is at or above `position`; gaps
    /// between consecutive integer boundaries belong to the upper tier.
    pub fn tier_for_position(&self, position: f64) -> Tier {
        Tier::ALL
            .into_iter()
            .find(|&tier| position <= self.spans.get(tier).end.position())
            .unwrap_or(Tier::Equity)
    }
}
