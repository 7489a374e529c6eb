//! Step segments over time buckets.

use serde::{Deserialize, Serialize};

use super::{buckets, proportion};
use crate::model::SessionTotals;

/// One time bucket with the steps taken during it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSegment {
    pub start_step: u32,
    pub end_step: u32,
    pub step: u32,
    pub start_time: u32,
    pub end_time: u32,
    pub time: u32,
    pub index: u32,
}

pub(super) fn generate(totals: &SessionTotals, width_s: u32, index_offset: u32) -> Vec<StepSegment> {
    let total = totals.duration_s;
    buckets(total, width_s)
        .into_iter()
        .zip(index_offset..)
        .map(|((start, end), index)| {
            let start_step = proportion(totals.steps, start, total);
            let end_step = proportion(totals.steps, end, total);
            StepSegment {
                start_step,
                end_step,
                step: end_step - start_step,
                start_time: start,
                end_time: end,
                time: end - start,
                index,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sums_match_totals() {
        let segments = generate(&SessionTotals::new(3000, 786, 1894), 20, 1);

        assert_eq!(segments.len(), 39);
        assert_eq!(segments.iter().map(|s| s.time).sum::<u32>(), 786);
        assert_eq!(segments.iter().map(|s| s.step).sum::<u32>(), 1894);
        assert_eq!(segments.last().unwrap().time, 26);
    }

    #[test]
    fn test_steps_follow_elapsed_time() {
        let segments = generate(&SessionTotals::new(1000, 100, 250), 20, 1);

        assert_eq!(segments.len(), 5);
        assert!(segments.iter().all(|s| s.step == 50));
        assert_eq!(segments[2].start_step, 100);
    }

    #[test]
    fn test_zero_duration() {
        assert!(generate(&SessionTotals::new(1000, 0, 250), 20, 1).is_empty());
    }
}
