//! Stride segments over distance buckets.

use serde::{Deserialize, Serialize};

use super::buckets;
use crate::model::SessionTotals;

/// One distance bucket with an even share of the session's time and steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrideSegment {
    pub distance: u32,
    pub index: u32,
    pub time: u32,
    /// Average stride in centimeters.
    pub stride: f64,
    pub step_count: u32,
}

pub(super) fn generate(totals: &SessionTotals, width_m: u32, index_offset: u32) -> Vec<StrideSegment> {
    let ranges = buckets(totals.distance_m, width_m);
    let count = ranges.len() as u32;
    if count == 0 {
        return Vec::new();
    }

    let stride = if totals.steps > 0 {
        f64::from(totals.distance_m) / f64::from(totals.steps) * 100.0
    } else {
        0.0
    };
    let time_share = totals.duration_s / count;
    let step_share = totals.steps / count;

    ranges
        .into_iter()
        .zip(index_offset..)
        .enumerate()
        .map(|(i, ((start, end), index))| {
            let last = i as u32 + 1 == count;
            StrideSegment {
                distance: end - start,
                index,
                time: if last {
                    totals.duration_s - time_share * (count - 1)
                } else {
                    time_share
                },
                stride,
                step_count: if last {
                    totals.steps - step_share * (count - 1)
                } else {
                    step_share
                },
            }
        })
        .collect()
}
