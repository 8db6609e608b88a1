//! Daily aggregation.
//!
//! Parses record dates leniently and folds per-record contributions into a
//! gapless calendar of daily buckets.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::lexicon::{BagHits, Category};

/// Parse a record date.
///
/// Accepts `YYYY-MM-DD` and `YYYY/MM/DD` with one- or two-digit month and day.
/// Surrounding whitespace and quotes are ignored, as is a time-of-day suffix
/// after `T` or whitespace.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let cleaned = raw.trim().trim_matches(|c| c == '"' || c == '\'').trim();
    let day_part = cleaned
        .split(|c: char| c == 'T' || c.is_whitespace())
        .next()
        .unwrap_or_default();

    let mut parts = day_part.split(['-', '/']);
    let year = parts.next()?;
    let month = parts.next()?;
    let day = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let digits = |s: &str, min: usize, max: usize| {
        (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
    };
    if !digits(year, 4, 4) || !digits(month, 1, 2) || !digits(day, 1, 2) {
        return None;
    }

    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Every day from `first` to `last`, inclusive.
pub fn day_range(first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    first.iter_days().take_while(|d| *d <= last).collect()
}

/// Totals for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBucket {
    pub day: NaiveDate,
    pub counts: BagHits,
    /// Primary metric in hit-count mode, record count in label mode
    pub aux: f64,
}

impl DailyBucket {
    pub fn empty(day: NaiveDate) -> Self {
        Self {
            day,
            counts: BagHits::default(),
            aux: 0.0,
        }
    }

    pub fn count(&self, category: Category) -> u64 {
        self.counts.get(category)
    }
}

/// One record's contribution to its day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    pub day: NaiveDate,
    pub counts: BagHits,
    pub aux: f64,
}

/// Fold contributions into buckets covering `[first, last]` with no gaps.
///
/// Contributions dated outside the range are ignored.
pub fn bucketize<I>(first: NaiveDate, last: NaiveDate, contributions: I) -> Vec<DailyBucket>
where
    I: IntoIterator<Item = Contribution>,
{
    let mut buckets: Vec<DailyBucket> = day_range(first, last)
        .into_iter()
        .map(DailyBucket::empty)
        .collect();

    for c in contributions {
        let offset = (c.day - first).num_days();
        if offset < 0 {
            continue;
        }
        if let Some(bucket) = buckets.get_mut(offset as usize) {
            bucket.counts += c.counts;
            bucket.aux += c.aux;
        }
    }

    buckets
}

/// Earliest and latest of a set of days.
pub fn span<I>(days: I) -> Option<(NaiveDate, NaiveDate)>
where
    I: IntoIterator<Item = NaiveDate>,
{
    days.into_iter().fold(None, |acc, d| match acc {
        None => Some((d, d)),
        Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
    })
}

/// Per-category series of raw daily counts, as `f64`.
pub fn count_series(buckets: &[DailyBucket], category: Category) -> Vec<f64> {
    buckets.iter().map(|b| b.count(category) as f64).collect()
}

/// The aux metric series.
pub fn aux_series(buckets: &[DailyBucket]) -> Vec<f64> {
    buckets.iter().map(|b| b.aux).collect()
}
