// src/engine/blocks.rs

pub const MIN_BLOCK_HOURS: i32 = 4;
pub const MAX_BLOCK_HOURS: i32 = 8;
pub const DAY_END_HOUR: i32 = 24;

/// Demand for one role at one hour of the day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourDemand {
    pub hour: i32,
    pub headcount: i32,
}

/// A contiguous `[start_hour, end_hour)` window with one peak headcount.
/// score is the fraction of the window backed by positive demand; padding a
/// block up to the minimum length dilutes it below 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftBlock {
    pub start_hour: i32,
    pub end_hour: i32,
    pub headcount: i32,
    pub score: f64,
}

/// Greedy single-role packer. Scans ascending, opens a block on the first
/// positive hour and extends through strictly contiguous positive hours,
/// keeping the maximum headcount (peak concurrency, not a sum), up to
/// MAX_BLOCK_HOURS. Blocks shorter than MIN_BLOCK_HOURS are padded to the
/// minimum, capped at hour 24; padding never swallows a later positive-demand
/// hour. Not optimal, by construction reproducible.
pub fn pack_blocks(demand: &[HourDemand]) -> Vec<ShiftBlock> {
    let mut entries: Vec<&HourDemand> = demand
        .iter()
        .filter(|d| d.hour >= 0 && d.hour < DAY_END_HOUR)
        .collect();
    entries.sort_by_key(|d| d.hour);

    let mut blocks = Vec::new();
    let mut i = 0;
    while i < entries.len() {
        if entries[i].headcount <= 0 {
            i += 1;
            continue;
        }

        let start = entries[i].hour;
        let mut end = start + 1;
        let mut peak = entries[i].headcount;
        let mut demand_hours = 1;
        i += 1;
        while i < entries.len()
            && entries[i].hour == end
            && entries[i].headcount > 0
            && end - start < MAX_BLOCK_HOURS
        {
            peak = peak.max(entries[i].headcount);
            end += 1;
            demand_hours += 1;
            i += 1;
        }

        if end - start < MIN_BLOCK_HOURS {
            let padded = (start + MIN_BLOCK_HOURS).min(DAY_END_HOUR);
            let next_positive = entries[i..]
                .iter()
                .find(|d| d.headcount > 0)
                .map(|d| d.hour);
            if next_positive.map_or(true, |h| h >= padded) {
                end = padded;
            }
        }

        // the padded range is consumed; skip entries inside it
        while i < entries.len() && entries[i].hour < end {
            i += 1;
        }

        blocks.push(ShiftBlock {
            start_hour: start,
            end_hour: end,
            headcount: peak,
            score: f64::from(demand_hours) / f64::from(end - start),
        });
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demand(entries: &[(i32, i32)]) -> Vec<HourDemand> {
        entries
            .iter()
            .map(|&(hour, headcount)| HourDemand { hour, headcount })
            .collect()
    }

    #[test]
    fn splits_on_zero_and_pads_short_trailing_block() {
        let blocks = pack_blocks(&demand(&[(10, 2), (11, 3), (12, 0), (13, 1)]));
        assert_eq!(blocks.len(), 2);

        assert_eq!(blocks[0].start_hour, 10);
        assert_eq!(blocks[0].end_hour, 12);
        assert_eq!(blocks[0].headcount, 3);

        assert_eq!(blocks[1].start_hour, 13);
        assert_eq!(blocks[1].end_hour, 17);
        assert_eq!(blocks[1].headcount, 1);
        assert!((blocks[1].score - 0.25).abs() < 1e-9);
    }

    #[test]
    fn day_end_caps_padding() {
        let blocks = pack_blocks(&demand(&[(23, 2)]));
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].start_hour, 23);
        assert_eq!(blocks[0].end_hour, 24);
        assert_eq!(blocks[0].headcount, 2);
    }

    #[test]
    fn headcount_is_peak_not_sum() {
        let blocks = pack_blocks(&demand(&[(9, 1), (10, 4), (11, 2), (12, 3)]));
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].start_hour, 9);
        assert_eq!(blocks[0].end_hour, 13);
        assert_eq!(blocks[0].headcount, 4);
        assert!((blocks[0].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn max_length_splits_long_runs() {
        let entries: Vec<(i32, i32)> = (8..20).map(|h| (h, 1)).collect();
        let blocks = pack_blocks(&demand(&entries));
        assert_eq!(blocks.len(), 2);
        assert_eq!((blocks[0].start_hour, blocks[0].end_hour), (8, 16));
        assert_eq!((blocks[1].start_hour, blocks[1].end_hour), (16, 20));
    }

    #[test]
    fn gap_in_hours_splits_blocks() {
        let blocks = pack_blocks(&demand(&[(6, 1), (7, 1), (8, 1), (9, 1), (14, 2)]));
        assert_eq!(blocks.len(), 2);
        assert_eq!((blocks[0].start_hour, blocks[0].end_hour), (6, 10));
        assert_eq!((blocks[1].start_hour, blocks[1].end_hour), (14, 18));
    }

    #[test]
    fn all_zero_demand_yields_no_blocks() {
        assert!(pack_blocks(&demand(&[(9, 0), (10, 0)])).is_empty());
        assert!(pack_blocks(&[]).is_empty());
    }

    #[test]
    fn input_order_does_not_matter() {
        let sorted = pack_blocks(&demand(&[(10, 2), (11, 3), (13, 1)]));
        let shuffled = pack_blocks(&demand(&[(13, 1), (11, 3), (10, 2)]));
        assert_eq!(sorted, shuffled);
    }

    #[test]
    fn padding_stops_before_later_demand() {
        // [10,12) stays short because padding to 14 would cross hour 13
        let blocks = pack_blocks(&demand(&[(10, 1), (11, 1), (12, 0), (13, 2)]));
        assert_eq!((blocks[0].start_hour, blocks[0].end_hour), (10, 12));
        assert_eq!((blocks[1].start_hour, blocks[1].end_hour), (13, 17));
    }

    #[test]
    fn padding_crosses_trailing_zero_hours() {
        let blocks = pack_blocks(&demand(&[(13, 1), (14, 0), (15, 0)]));
        assert_eq!(blocks.len(), 1);
        assert_eq!((blocks[0].start_hour, blocks[0].end_hour), (13, 17));
    }
}
