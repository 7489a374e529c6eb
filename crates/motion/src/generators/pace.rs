//! Pace segments over distance buckets.

use serde::{Deserialize, Serialize};

use super::{buckets, proportion};
use crate::model::SessionTotals;

/// One distance bucket with the time and steps spent covering it, assuming
/// constant velocity across the whole session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaceSegment {
    pub start_distance: u32,
    pub end_distance: u32,
    pub distance: u32,
    pub start_time: u32,
    pub end_time: u32,
    pub time: u32,
    pub start_step_count: u32,
    pub end_step_count: u32,
    pub step_count: u32,
    pub index: u32,
}

pub(super) fn generate(totals: &SessionTotals, width_m: u32, index_offset: u32) -> Vec<PaceSegment> {
    let total = totals.distance_m;
    buckets(total, width_m)
        .into_iter()
        .zip(index_offset..)
        .map(|((start, end), index)| {
            let start_time = proportion(totals.duration_s, start, total);
            let end_time = proportion(totals.duration_s, end, total);
            let start_step_count = proportion(totals.steps, start, total);
            let end_step_count = proportion(totals.steps, end, total);
            PaceSegment {
                start_distance: start,
                end_distance: end,
                distance: end - start,
                start_time,
                end_time,
                time: end_time - start_time,
                start_step_count,
                end_step_count,
                step_count: end_step_count - start_step_count,
                index,
            }
        })
        .collect()
}
