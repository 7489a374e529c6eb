//! Aggregate segment generators.
//!
//! Segments are derived from the declared session totals only, never from the
//! trajectory itself:
//! - [`PaceSegment`]: distance buckets with proportional time and steps
//! - [`StepSegment`]: time buckets with proportional step counts
//! - [`StrideSegment`]: distance buckets with an even split of time and steps
//!
//! In every list the last bucket absorbs the remainder, so the per-segment
//! distance, time and step values sum to the totals exactly.

pub mod pace;
pub mod step;
pub mod stride;

pub use pace::PaceSegment;
pub use step::StepSegment;
pub use stride::StrideSegment;

use serde::{Deserialize, Serialize};

use crate::model::SessionTotals;

/// Bucket width per segment domain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentWidths {
    /// Pace bucket width in meters.
    pub pace_m: u32,
    /// Step bucket width in seconds.
    pub step_s: u32,
    /// Stride bucket width in meters.
    pub stride_m: u32,
    /// Index of the first segment in each list.
    pub index_offset: u32,
}

impl Default for SegmentWidths {
    fn default() -> Self {
        Self {
            pace_m: 50,
            step_s: 20,
            stride_m: 200,
            index_offset: 1,
        }
    }
}

/// All three segment lists for one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentSet {
    pub pace: Vec<PaceSegment>,
    pub steps: Vec<StepSegment>,
    pub strides: Vec<StrideSegment>,
}

/// Generates pace, step and stride segments from session totals.
#[derive(Debug, Clone, Default)]
pub struct SegmentDataGenerator {
    widths: SegmentWidths,
}

impl SegmentDataGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_widths(widths: SegmentWidths) -> Self {
        Self { widths }
    }

    pub fn widths(&self) -> &SegmentWidths {
        &self.widths
    }

    pub fn generate(&self, totals: &SessionTotals) -> SegmentSet {
        SegmentSet {
            pace: self.pace(totals),
            steps: self.steps(totals),
            strides: self.strides(totals),
        }
    }

    pub fn pace(&self, totals: &SessionTotals) -> Vec<PaceSegment> {
        pace::generate(totals, self.widths.pace_m, self.widths.index_offset)
    }

    pub fn steps(&self, totals: &SessionTotals) -> Vec<StepSegment> {
        step::generate(totals, self.widths.step_s, self.widths.index_offset)
    }

    pub fn strides(&self, totals: &SessionTotals) -> Vec<StrideSegment> {
        stride::generate(totals, self.widths.stride_m, self.widths.index_offset)
    }
}

/// Splits `[0, total]` into `max(1, total / width)` buckets of `width`, the
/// last one extended to `total`. A zero total yields no buckets.
pub(crate) fn buckets(total: u32, width: u32) -> Vec<(u32, u32)> {
    if total == 0 {
        return Vec::new();
    }
    let width = width.max(1);
    let count = (total / width).max(1);
    (0..count)
        .map(|i| {
            let start = i * width;
            let end = if i + 1 == count { total } else { start + width };
            (start, end)
        })
        .collect()
}

/// `value * part / whole`, floored. A zero `whole` maps to zero.
pub(crate) fn proportion(value: u32, part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    (u64::from(value) * u64::from(part) / u64::from(whole)) as u32
}
