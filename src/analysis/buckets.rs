use chrono::{NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::aggregate::{ChampionRow, LaneRow, SeasonAggregator};
use crate::api::models::PlayerSlice;

/// The pipeline's reference time zone, UTC+9. Year and split
/// boundaries are taken in this zone.
pub const REFERENCE_TZ_OFFSET_SECS: i64 = 9 * 3600;

/// Entries per derived view inside a bucketed sub-view.
pub const BUCKET_TOP_N: usize = 5;

/// Patch buckets retained by default in `patches` mode.
pub const DEFAULT_PATCH_COUNT: usize = 12;

/// Whole-year retrieval window `[start, end]` in epoch seconds.
pub fn year_range(year: i32) -> (i64, i64) {
    let start = Utc
        .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .unwrap()
        .timestamp()
        - REFERENCE_TZ_OFFSET_SECS;
    let end = Utc
        .with_ymd_and_hms(year, 12, 31, 23, 59, 59)
        .unwrap()
        .timestamp()
        - REFERENCE_TZ_OFFSET_SECS;
    (start, end)
}

/// Custom `[from, to]` window, end-of-day inclusive, epoch seconds.
pub fn custom_range(from: NaiveDate, to: NaiveDate) -> (i64, i64) {
    let start = Utc
        .from_utc_datetime(&from.and_hms_opt(0, 0, 0).unwrap())
        .timestamp()
        - REFERENCE_TZ_OFFSET_SECS;
    let end = Utc
        .from_utc_datetime(&to.and_hms_opt(23, 59, 59).unwrap())
        .timestamp()
        - REFERENCE_TZ_OFFSET_SECS;
    (start, end)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitRange {
    pub label: String,
    pub start: i64,
    pub end: i64,
}

/// The fixed tri-partition of a calendar year: Jan 1–Apr 30,
/// May 1–Aug 31, Sep 1–Dec 31.
pub fn split_ranges(year: i32) -> Vec<SplitRange> {
    let bounds = [(1, 1, 4, 30), (5, 1, 8, 31), (9, 1, 12, 31)];
    bounds
        .iter()
        .enumerate()
        .map(|(i, &(sm, sd, em, ed))| {
            let start = Utc
                .with_ymd_and_hms(year, sm, sd, 0, 0, 0)
                .unwrap()
                .timestamp()
                - REFERENCE_TZ_OFFSET_SECS;
            let end = Utc
                .with_ymd_and_hms(year, em, ed, 23, 59, 59)
                .unwrap()
                .timestamp()
                - REFERENCE_TZ_OFFSET_SECS;
            SplitRange {
                label: format!("Split {}", i + 1),
                start,
                end,
            }
        })
        .collect()
}

/// A per-bucket summary: the same aggregation, restricted to the
/// slices falling inside the bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BucketReport {
    pub key: String,
    pub total_games: u32,
    pub top_used: Vec<ChampionRow>,
    pub top_win_rate: Vec<ChampionRow>,
    pub lanes: Vec<LaneRow>,
    pub best_lane: String,
}

/// Aggregates one bucket of slices and derives the top-5 views.
pub fn bucket_report<'a>(key: String, slices: impl IntoIterator<Item = &'a PlayerSlice>) -> BucketReport {
    let mut agg = SeasonAggregator::new();
    agg.fold_all(slices);
    BucketReport {
        key,
        total_games: agg.total_games(),
        top_used: agg.top_by_usage(BUCKET_TOP_N),
        top_win_rate: agg.top_by_win_rate(BUCKET_TOP_N),
        lanes: agg.lane_rows(),
        best_lane: agg.best_lane(),
    }
}

/// Retains only slices played on `patch`.
pub fn filter_by_patch<'a>(slices: &'a [PlayerSlice], patch: &str) -> Vec<&'a PlayerSlice> {
    slices
        .iter()
        .filter(|s| s.patch.as_deref() == Some(patch))
        .collect()
}

/// Groups slices by patch and keeps the `n` most recent patches,
/// ordered descending by numeric `(major, minor)`. Patch strings that
/// do not parse sort after every numeric patch.
pub fn bucket_by_patches(slices: &[PlayerSlice], n: usize) -> Vec<BucketReport> {
    let mut groups: Vec<(String, Vec<&PlayerSlice>)> = Vec::new();
    for slice in slices {
        let Some(patch) = &slice.patch else { continue };
        match groups.iter_mut().find(|(p, _)| p == patch) {
            Some((_, members)) => members.push(slice),
            None => groups.push((patch.clone(), vec![slice])),
        }
    }

    groups.sort_by(|(a, _), (b, _)| match (patch_sort_key(a), patch_sort_key(b)) {
        (Some(ka), Some(kb)) => kb.cmp(&ka),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => b.cmp(a),
    });
    groups.truncate(n);

    groups
        .into_iter()
        .map(|(patch, members)| bucket_report(patch, members))
        .collect()
}

/// One bucket per calendar-year split, in split order.
pub fn bucket_by_splits(slices: &[PlayerSlice], year: i32) -> Vec<BucketReport> {
    split_ranges(year)
        .into_iter()
        .map(|range| {
            let members: Vec<&PlayerSlice> = slices
                .iter()
                .filter(|s| {
                    s.timestamp_ms.is_some_and(|ts| {
                        ts >= range.start * 1000 && ts <= range.end * 1000 + 999
                    })
                })
                .collect();
            bucket_report(range.label, members)
        })
        .collect()
}

fn patch_sort_key(patch: &str) -> Option<(u32, u32)> {
    let (major, minor) = patch.split_once('.')?;
    Some((major.parse().ok()?, minor.parse().ok()?))
}
